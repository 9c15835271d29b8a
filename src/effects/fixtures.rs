//! Test doubles shared by the engine's unit tests.

use crate::core::Context;
use crate::effects::error::{BoxError, FlowError};
use crate::effects::handler::{erase, resolved, HandlerFactory, TransitionHandler};
use crate::tagged_enum;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum StateTag {
    StateA,
    StateB,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EventTag {
    EventA,
    EventC,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct StateA;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct StateB;

tagged_enum! {
    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    pub enum TestState: StateTag {
        A(StateA) => StateTag::StateA,
        B(StateB) => StateTag::StateB,
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct TestEventA {
    pub id: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TestEventC {
    pub id: String,
}

tagged_enum! {
    #[derive(Clone, Debug)]
    pub enum TestEvent: EventTag {
        A(TestEventA) => EventTag::EventA,
        C(TestEventC) => EventTag::EventC,
    }
}

pub fn event_a() -> TestEvent {
    TestEvent::A(TestEventA {
        id: "123".to_string(),
    })
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TestContext {
    pub state: TestState,
    pub visits: u32,
}

impl TestContext {
    pub fn new(state: TestState) -> Self {
        Self { state, visits: 0 }
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

/// Shared call log.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }
}

/// A → B handler with scripted answers that logs every call.
#[derive(Clone)]
pub struct ScriptedHandler {
    pub label: &'static str,
    pub accept: bool,
    pub fail_transition: bool,
    pub fail_compensation: bool,
    pub recorder: Recorder,
}

impl ScriptedHandler {
    pub fn accepting() -> Self {
        Self {
            label: "handler",
            accept: true,
            fail_transition: false,
            fail_compensation: false,
            recorder: Recorder::default(),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            accept: false,
            ..Self::accepting()
        }
    }

    pub fn labelled(mut self, label: &'static str, recorder: &Recorder) -> Self {
        self.label = label;
        self.recorder = recorder.clone();
        self
    }
}

#[async_trait]
impl TransitionHandler<TestContext, TestEvent> for ScriptedHandler {
    type From = StateA;
    type Event = TestEventA;
    type To = StateB;

    async fn validate(&self, _context: &TestContext, _from: &StateA, _event: &TestEventA) -> bool {
        self.recorder.push(format!("validate:{}", self.label));
        self.accept
    }

    async fn transition(
        &self,
        _context: &TestContext,
        _from: &StateA,
        _event: &TestEventA,
    ) -> Result<StateB, BoxError> {
        self.recorder.push(format!("transition:{}", self.label));
        if self.fail_transition {
            return Err("transition refused".into());
        }
        Ok(StateB)
    }

    async fn compensate(
        &self,
        _context: &TestContext,
        _from: &StateA,
        to: Option<&StateB>,
        _event: &TestEventA,
        _failure: &FlowError,
    ) -> Result<(), BoxError> {
        let produced = if to.is_some() { "some" } else { "none" };
        self.recorder
            .push(format!("compensate:{}:{}", self.label, produced));
        if self.fail_compensation {
            return Err("refund rejected".into());
        }
        Ok(())
    }
}

/// Erased factory cloning `handler` on every dispatch.
pub fn factory<H>(handler: H) -> HandlerFactory<TestContext, TestEvent, ()>
where
    H: TransitionHandler<TestContext, TestEvent> + Clone,
{
    erase(resolved::<TestContext, (), H>(handler))
}
