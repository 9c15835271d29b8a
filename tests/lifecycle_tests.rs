//! End-to-end lifecycle tests through the public API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use turnstile::builder::MachineBuilder;
use turnstile::checkpoint::Checkpoint;
use turnstile::codec::{BincodeCodec, JsonCodec};
use turnstile::core::Context;
use turnstile::effects::{BoxError, FlowError, HookPhase, StateHook, StateMachine, TransitionHandler};
use turnstile::tagged_enum;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
enum StateTag {
    StateA,
    StateB,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum EventTag {
    EventA,
    EventC,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
struct StateA;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
struct StateB;

tagged_enum! {
    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState: StateTag {
        A(StateA) => StateTag::StateA,
        B(StateB) => StateTag::StateB,
    }
}

#[derive(Clone, Debug)]
struct EventA {
    id: String,
}

#[derive(Clone, Debug)]
struct EventC;

tagged_enum! {
    #[derive(Clone, Debug)]
    enum TestEvent: EventTag {
        A(EventA) => EventTag::EventA,
        C(EventC) => EventTag::EventC,
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
struct TestContext {
    state: TestState,
    notes: Vec<String>,
}

impl TestContext {
    fn at_a() -> Self {
        Self {
            state: TestState::A(StateA),
            notes: Vec::new(),
        }
    }
}

impl Context for TestContext {
    type State = TestState;

    fn state(&self) -> &TestState {
        &self.state
    }

    fn set_state(&mut self, state: TestState) {
        self.state = state;
    }
}

fn event_a() -> TestEvent {
    TestEvent::A(EventA {
        id: "123".to_string(),
    })
}

/// Counts calls per method name.
#[derive(Clone, Default)]
struct Calls(Arc<Mutex<Vec<&'static str>>>);

impl Calls {
    fn push(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    fn count(&self, call: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    fn all(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct MoveToB {
    accept: bool,
    calls: Calls,
}

impl MoveToB {
    fn new(calls: &Calls) -> Self {
        Self {
            accept: true,
            calls: calls.clone(),
        }
    }
}

#[async_trait]
impl TransitionHandler<TestContext, TestEvent> for MoveToB {
    type From = StateA;
    type Event = EventA;
    type To = StateB;

    async fn validate(&self, _context: &TestContext, _from: &StateA, _event: &EventA) -> bool {
        self.calls.push("validate");
        self.accept
    }

    async fn transition(
        &self,
        _context: &TestContext,
        _from: &StateA,
        event: &EventA,
    ) -> Result<StateB, BoxError> {
        self.calls.push("transition");
        assert_eq!(event.id, "123");
        Ok(StateB)
    }

    async fn compensate(
        &self,
        _context: &TestContext,
        _from: &StateA,
        to: Option<&StateB>,
        _event: &EventA,
        failure: &FlowError,
    ) -> Result<(), BoxError> {
        self.calls.push("compensate");
        assert_eq!(to, Some(&StateB));
        assert!(matches!(
            failure,
            FlowError::Hook {
                phase: HookPhase::Entry,
                ..
            }
        ));
        Ok(())
    }
}

/// Never accepts; registered for a different event.
#[derive(Clone)]
struct Refuse;

#[async_trait]
impl TransitionHandler<TestContext, TestEvent> for Refuse {
    type From = StateA;
    type Event = EventC;
    type To = StateB;

    async fn validate(&self, _context: &TestContext, _from: &StateA, _event: &EventC) -> bool {
        false
    }

    async fn transition(
        &self,
        _context: &TestContext,
        _from: &StateA,
        _event: &EventC,
    ) -> Result<StateB, BoxError> {
        Err("never selected".into())
    }
}

struct Leave(Calls);

#[async_trait]
impl StateHook<TestContext, StateA> for Leave {
    async fn handle(&self, context: &mut TestContext, state: &StateA) -> Result<(), BoxError> {
        assert_eq!(context.state, TestState::A(state.clone()));
        self.0.push("exit");
        context.notes.push(format!("left {state:?}"));
        Ok(())
    }
}

struct Arrive {
    calls: Calls,
    fail: bool,
}

#[async_trait]
impl StateHook<TestContext, StateB> for Arrive {
    async fn handle(&self, context: &mut TestContext, state: &StateB) -> Result<(), BoxError> {
        assert_eq!(context.state, TestState::B(state.clone()));
        self.calls.push("entry");
        if self.fail {
            return Err("argument rejected".into());
        }
        context.notes.push(format!("entered {state:?}"));
        Ok(())
    }
}

fn machine(calls: &Calls, entry_fails: bool) -> StateMachine<TestContext, TestEvent, ()> {
    MachineBuilder::<TestContext, TestEvent, ()>::new()
        .environment(())
        .codec(JsonCodec::new())
        .add_handler(StateTag::StateA, EventTag::EventA, MoveToB::new(calls))
        .on_exit::<StateA, _>(Leave(calls.clone()))
        .on_entry::<StateB, _>(Arrive {
            calls: calls.clone(),
            fail: entry_fails,
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn state_changes_on_accepted_event() {
    let calls = Calls::default();
    let mut service = machine(&calls, false).create_service(TestContext::at_a());

    service.send_event(event_a()).await.unwrap();

    assert_eq!(service.context().state, TestState::B(StateB));
    assert_eq!(service.context().notes, vec!["left StateA", "entered StateB"]);
}

#[tokio::test]
async fn entry_and_exit_hooks_run_once() {
    let calls = Calls::default();
    let mut service = machine(&calls, false).create_service(TestContext::at_a());

    service.send_event(event_a()).await.unwrap();

    assert_eq!(calls.count("exit"), 1);
    assert_eq!(calls.count("entry"), 1);
    assert_eq!(calls.all(), vec!["validate", "exit", "transition", "entry"]);
}

#[tokio::test]
async fn handler_transition_runs_once() {
    let calls = Calls::default();
    let mut service = machine(&calls, false).create_service(TestContext::at_a());

    service.send_event(event_a()).await.unwrap();

    assert_eq!(calls.count("transition"), 1);
    assert_eq!(calls.count("compensate"), 0);
}

#[tokio::test]
async fn rule_for_other_event_is_ignored() {
    let calls = Calls::default();
    let machine = MachineBuilder::<TestContext, TestEvent, ()>::new()
        .environment(())
        .codec(JsonCodec::new())
        .add_handler(StateTag::StateA, EventTag::EventC, Refuse)
        .add_handler(StateTag::StateA, EventTag::EventA, MoveToB::new(&calls))
        .build()
        .unwrap();
    let mut service = machine.create_service(TestContext::at_a());

    service.send_event(event_a()).await.unwrap();
    assert_eq!(service.current_state(), &TestState::B(StateB));

    let err = service.send_event(TestEvent::C(EventC)).await.unwrap_err();
    assert!(matches!(err, FlowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn rejecting_candidate_falls_through_to_next() {
    let rejected = Calls::default();
    let accepted = Calls::default();
    let machine = MachineBuilder::<TestContext, TestEvent, ()>::new()
        .environment(())
        .codec(JsonCodec::new())
        .add_handler(
            StateTag::StateA,
            EventTag::EventA,
            MoveToB {
                accept: false,
                calls: rejected.clone(),
            },
        )
        .add_handler(StateTag::StateA, EventTag::EventA, MoveToB::new(&accepted))
        .build()
        .unwrap();
    let mut service = machine.create_service(TestContext::at_a());

    service.send_event(event_a()).await.unwrap();

    assert_eq!(service.current_state(), &TestState::B(StateB));
    assert_eq!(rejected.all(), vec!["validate"]);
    assert_eq!(accepted.count("transition"), 1);
}

#[tokio::test]
async fn failing_entry_hook_compensates_and_rolls_back() {
    let calls = Calls::default();
    let mut service = machine(&calls, true).create_service(TestContext::at_a());

    let err = service.send_event(event_a()).await.unwrap_err();

    assert!(err.is_rollback());
    assert_eq!(err.cause().map(|cause| cause.to_string()).as_deref(), Some("argument rejected"));
    assert_eq!(calls.count("compensate"), 1);
    assert_eq!(service.context(), TestContext::at_a());
    assert!(service.history().is_empty());
}

/// Environment shared by every handler the machine resolves.
#[derive(Clone, Default)]
struct Ledger {
    postings: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct Post {
    ledger: Ledger,
}

#[async_trait]
impl TransitionHandler<TestContext, TestEvent> for Post {
    type From = StateA;
    type Event = EventA;
    type To = StateB;

    async fn validate(&self, _context: &TestContext, _from: &StateA, _event: &EventA) -> bool {
        true
    }

    async fn transition(
        &self,
        _context: &TestContext,
        _from: &StateA,
        _event: &EventA,
    ) -> Result<StateB, BoxError> {
        self.ledger.postings.fetch_add(1, Ordering::SeqCst);
        Ok(StateB)
    }

    async fn compensate(
        &self,
        _context: &TestContext,
        _from: &StateA,
        _to: Option<&StateB>,
        _event: &EventA,
        _failure: &FlowError,
    ) -> Result<(), BoxError> {
        self.ledger.postings.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn handlers_take_collaborators_from_environment() {
    let ledger = Ledger::default();
    let calls = Calls::default();
    let machine = MachineBuilder::<TestContext, TestEvent, Ledger>::new()
        .environment(ledger.clone())
        .codec(BincodeCodec::new())
        .add_with_env(StateTag::StateA, EventTag::EventA, |ledger: &Ledger| Post {
            ledger: ledger.clone(),
        })
        .on_entry::<StateB, _>(Arrive {
            calls: calls.clone(),
            fail: true,
        })
        .build()
        .unwrap();

    let mut failing = machine.create_service(TestContext::at_a());
    failing.send_event(event_a()).await.unwrap_err();

    assert_eq!(ledger.postings.load(Ordering::SeqCst), 0);
    assert_eq!(calls.count("entry"), 1);
}

#[tokio::test]
async fn service_resumes_from_binary_checkpoint() {
    let calls = Calls::default();
    let machine = machine(&calls, false);
    let mut service = machine.create_service(TestContext::at_a());
    service.send_event(event_a()).await.unwrap();

    let bytes = service.checkpoint().unwrap().to_binary().unwrap();
    let checkpoint = Checkpoint::from_binary(&bytes).unwrap();
    let resumed = machine.restore(checkpoint).unwrap();

    assert_eq!(resumed.context(), service.context());
    assert_eq!(
        resumed.history().get_path(),
        vec![&TestState::A(StateA), &TestState::B(StateB)]
    );
}
