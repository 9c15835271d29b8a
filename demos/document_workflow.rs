//! Document Approval Workflow
//!
//! This example demonstrates a review workflow with hooks and rollback.
//!
//! Key concepts:
//! - Payload-carrying states and events declared with `tagged_enum!`
//! - Handlers resolved from an environment (a publishing service)
//! - Exit/entry hooks keyed by state kind
//! - Compensation when an entry hook fails
//! - Checkpoint and resume of a committed document
//!
//! Run with: cargo run --example document_workflow

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use turnstile::builder::{MachineBuilder, TransitionBuilder};
use turnstile::codec::JsonCodec;
use turnstile::core::Context;
use turnstile::effects::{BoxError, FlowError, StateHook, TransitionHandler};
use turnstile::tagged_enum;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
enum Stage {
    Editable,
    Returned,
    Review,
    Live,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum Action {
    Submit,
    Approve,
    Reject,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
struct Draft;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
struct Rejected {
    reason: String,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
struct InReview {
    reviewer: String,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
struct Published {
    url: String,
}

tagged_enum! {
    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum DocState: Stage {
        Draft(Draft) => Stage::Editable,
        Rejected(Rejected) => Stage::Returned,
        InReview(InReview) => Stage::Review,
        Published(Published) => Stage::Live,
    }
}

#[derive(Clone, Debug)]
struct Submit {
    reviewer: String,
}

#[derive(Clone, Debug)]
struct Approve;

#[derive(Clone, Debug)]
struct Reject {
    reason: String,
}

tagged_enum! {
    #[derive(Clone, Debug)]
    enum DocEvent: Action {
        Submit(Submit) => Action::Submit,
        Approve(Approve) => Action::Approve,
        Reject(Reject) => Action::Reject,
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
struct Document {
    id: u64,
    words: usize,
    state: DocState,
    audit: Vec<String>,
}

impl Context for Document {
    type State = DocState;

    fn state(&self) -> &DocState {
        &self.state
    }

    fn set_state(&mut self, state: DocState) {
        self.state = state;
    }
}

// Environment: an external publishing service
#[derive(Clone, Default)]
struct Publisher {
    live_pages: Arc<AtomicUsize>,
    index_down: Arc<AtomicBool>,
}

#[derive(Clone)]
struct PublishHandler {
    publisher: Publisher,
}

#[async_trait]
impl TransitionHandler<Document, DocEvent> for PublishHandler {
    type From = InReview;
    type Event = Approve;
    type To = Published;

    async fn validate(&self, _doc: &Document, _from: &InReview, _event: &Approve) -> bool {
        true
    }

    async fn transition(
        &self,
        doc: &Document,
        _from: &InReview,
        _event: &Approve,
    ) -> Result<Published, BoxError> {
        self.publisher.live_pages.fetch_add(1, Ordering::SeqCst);
        Ok(Published {
            url: format!("https://docs.example.com/{}", doc.id),
        })
    }

    async fn compensate(
        &self,
        _doc: &Document,
        _from: &InReview,
        to: Option<&Published>,
        _event: &Approve,
        failure: &FlowError,
    ) -> Result<(), BoxError> {
        if let Some(published) = to {
            println!("  [Compensate] Unpublishing {} ({})", published.url, failure);
            self.publisher.live_pages.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

struct AuditExit;

#[async_trait]
impl StateHook<Document, InReview> for AuditExit {
    async fn handle(&self, doc: &mut Document, review: &InReview) -> Result<(), BoxError> {
        doc.audit.push(format!("review by {} closed", review.reviewer));
        Ok(())
    }
}

struct IndexEntry {
    publisher: Publisher,
}

#[async_trait]
impl StateHook<Document, Published> for IndexEntry {
    async fn handle(&self, doc: &mut Document, published: &Published) -> Result<(), BoxError> {
        if self.publisher.index_down.load(Ordering::SeqCst) {
            return Err("search index unavailable".into());
        }
        doc.audit.push(format!("indexed {}", published.url));
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Document Approval Workflow ===\n");

    let publisher = Publisher::default();
    publisher.index_down.store(true, Ordering::SeqCst);

    let submit_draft = TransitionBuilder::<Document, Draft, Submit, InReview>::new()
        .when(|doc, _, _| doc.words >= 100)
        .to(|_, _, submit| {
            Ok(InReview {
                reviewer: submit.reviewer.clone(),
            })
        })
        .build()?;
    let resubmit = TransitionBuilder::<Document, Rejected, Submit, InReview>::new()
        .to(|_, _, submit| {
            Ok(InReview {
                reviewer: submit.reviewer.clone(),
            })
        })
        .build()?;
    let reject = TransitionBuilder::<Document, InReview, Reject, Rejected>::new()
        .to(|_, _, reject| {
            Ok(Rejected {
                reason: reject.reason.clone(),
            })
        })
        .build()?;

    let machine = MachineBuilder::<Document, DocEvent, Publisher>::new()
        .environment(publisher.clone())
        .codec(JsonCodec::new())
        .add_handler(Stage::Editable, Action::Submit, submit_draft)
        .add_handler(Stage::Returned, Action::Submit, resubmit)
        .add_handler(Stage::Review, Action::Reject, reject)
        .add_with_env(Stage::Review, Action::Approve, |publisher: &Publisher| {
            PublishHandler {
                publisher: publisher.clone(),
            }
        })
        .on_exit::<InReview, _>(AuditExit)
        .on_entry::<Published, _>(IndexEntry {
            publisher: publisher.clone(),
        })
        .build()?;

    let mut service = machine.create_service(Document {
        id: 7,
        words: 1200,
        state: DocState::Draft(Draft),
        audit: Vec::new(),
    });

    let steps = vec![
        DocEvent::Submit(Submit {
            reviewer: "ana".to_string(),
        }),
        DocEvent::Reject(Reject {
            reason: "missing summary".to_string(),
        }),
        DocEvent::Submit(Submit {
            reviewer: "ana".to_string(),
        }),
        DocEvent::Approve(Approve),
    ];

    for event in steps {
        let kind = turnstile::core::Tagged::kind(&event);
        match service.send_event(event).await {
            Ok(()) => println!("{kind:>8}: now {:?}", service.current_state()),
            Err(err) => println!("{kind:>8}: failed [{}] {err}", err.error_code()),
        }
    }

    println!("\nLive pages after rollback: {}", publisher.live_pages.load(Ordering::SeqCst));
    println!("Audit trail: {:?}", service.context().audit);

    // Save the committed document, bring the index back, resume and retry
    let saved = service.checkpoint()?.to_json()?;
    publisher.index_down.store(false, Ordering::SeqCst);

    let mut resumed = machine.restore(turnstile::checkpoint::Checkpoint::from_json(&saved)?)?;
    resumed.send_event(DocEvent::Approve(Approve)).await?;

    println!("\nResumed and approved: {:?}", resumed.current_state());
    println!("Live pages: {}", publisher.live_pages.load(Ordering::SeqCst));
    println!("Path: {:?}", resumed.history().get_path());

    println!("\n=== Example Complete ===");
    Ok(())
}
