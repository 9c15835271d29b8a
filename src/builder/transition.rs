//! Closure-backed transition handlers.

use crate::builder::error::BuildError;
use crate::core::{Context, Event, Variant};
use crate::effects::{BoxError, FlowError, TransitionHandler};
use async_trait::async_trait;
use std::sync::Arc;

type Guard<C, F, Ev> = Arc<dyn Fn(&C, &F, &Ev) -> bool + Send + Sync>;
type Step<C, F, Ev, To> = Arc<dyn Fn(&C, &F, &Ev) -> Result<To, BoxError> + Send + Sync>;
type Undo<C, F, Ev, To> =
    Arc<dyn Fn(&C, &F, Option<&To>, &Ev, &FlowError) -> Result<(), BoxError> + Send + Sync>;

/// A [`TransitionHandler`] made of plain closures.
///
/// Built with [`TransitionBuilder`]. Cloning shares the closures.
pub struct FnTransition<C, F, Ev, To> {
    guard: Option<Guard<C, F, Ev>>,
    step: Step<C, F, Ev, To>,
    undo: Option<Undo<C, F, Ev, To>>,
}

impl<C, F, Ev, To> Clone for FnTransition<C, F, Ev, To> {
    fn clone(&self) -> Self {
        Self {
            guard: self.guard.clone(),
            step: Arc::clone(&self.step),
            undo: self.undo.clone(),
        }
    }
}

#[async_trait]
impl<C, E, F, Ev, To> TransitionHandler<C, E> for FnTransition<C, F, Ev, To>
where
    C: Context,
    E: Event,
    F: Variant<C::State>,
    Ev: Variant<E>,
    To: Variant<C::State>,
{
    type From = F;
    type Event = Ev;
    type To = To;

    async fn validate(&self, context: &C, from: &F, event: &Ev) -> bool {
        self.guard
            .as_ref()
            .map_or(true, |guard| guard(context, from, event))
    }

    async fn transition(&self, context: &C, from: &F, event: &Ev) -> Result<To, BoxError> {
        (self.step)(context, from, event)
    }

    async fn compensate(
        &self,
        context: &C,
        from: &F,
        to: Option<&To>,
        event: &Ev,
        failure: &FlowError,
    ) -> Result<(), BoxError> {
        match &self.undo {
            Some(undo) => undo(context, from, to, event, failure),
            None => Ok(()),
        }
    }
}

/// Builder for closure-backed transitions with a fluent API.
///
/// # Example
///
/// ```
/// use turnstile::builder::TransitionBuilder;
/// use turnstile::core::Context;
/// use turnstile::tagged_enum;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// pub enum Tag { Idle, Busy, Go }
///
/// #[derive(Clone, PartialEq, Debug)]
/// pub struct Idle;
/// #[derive(Clone, PartialEq, Debug)]
/// pub struct Busy { pub job: u32 }
/// #[derive(Clone, Debug)]
/// pub struct Start { pub job: u32 }
///
/// tagged_enum! {
///     #[derive(Clone, PartialEq, Debug)]
///     pub enum Worker: Tag {
///         Idle(Idle) => Tag::Idle,
///         Busy(Busy) => Tag::Busy,
///     }
/// }
///
/// tagged_enum! {
///     #[derive(Clone, Debug)]
///     pub enum Command: Tag {
///         Start(Start) => Tag::Go,
///     }
/// }
///
/// #[derive(Clone)]
/// pub struct Job { state: Worker }
///
/// impl Context for Job {
///     type State = Worker;
///     fn state(&self) -> &Worker { &self.state }
///     fn set_state(&mut self, state: Worker) { self.state = state; }
/// }
///
/// let start = TransitionBuilder::<Job, Idle, Start, Busy>::new()
///     .when(|_job, _idle, start| start.job > 0)
///     .to(|_job, _idle, start| Ok(Busy { job: start.job }))
///     .build()
///     .unwrap();
/// # let _ = start;
/// ```
pub struct TransitionBuilder<C, F, Ev, To> {
    guard: Option<Guard<C, F, Ev>>,
    step: Option<Step<C, F, Ev, To>>,
    undo: Option<Undo<C, F, Ev, To>>,
}

impl<C, F, Ev, To> TransitionBuilder<C, F, Ev, To> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            guard: None,
            step: None,
            undo: None,
        }
    }

    /// Accept the event only when `predicate` holds (optional; the
    /// default accepts every event).
    pub fn when<G>(mut self, predicate: G) -> Self
    where
        G: Fn(&C, &F, &Ev) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(predicate));
        self
    }

    /// Set the transition function (required).
    pub fn to<S>(mut self, step: S) -> Self
    where
        S: Fn(&C, &F, &Ev) -> Result<To, BoxError> + Send + Sync + 'static,
    {
        self.step = Some(Arc::new(step));
        self
    }

    /// Undo external effects when the attempt is rolled back (optional).
    pub fn compensate<U>(mut self, undo: U) -> Self
    where
        U: Fn(&C, &F, Option<&To>, &Ev, &FlowError) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.undo = Some(Arc::new(undo));
        self
    }

    /// Build the handler.
    pub fn build(self) -> Result<FnTransition<C, F, Ev, To>, BuildError> {
        let step = self.step.ok_or(BuildError::MissingTransition)?;

        Ok(FnTransition {
            guard: self.guard,
            step,
            undo: self.undo,
        })
    }
}

impl<C, F, Ev, To> Default for TransitionBuilder<C, F, Ev, To> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::fixtures::{StateA, StateB, TestContext, TestEvent, TestEventA, TestState};

    type Builder = TransitionBuilder<TestContext, StateA, TestEventA, StateB>;
    type Handler = FnTransition<TestContext, StateA, TestEventA, StateB>;

    fn context() -> TestContext {
        TestContext::new(TestState::A(StateA))
    }

    fn event(id: &str) -> TestEventA {
        TestEventA { id: id.to_string() }
    }

    async fn validate(handler: &Handler, id: &str) -> bool {
        TransitionHandler::<TestContext, TestEvent>::validate(handler, &context(), &StateA, &event(id))
            .await
    }

    #[test]
    fn builder_requires_transition() {
        let result = Builder::new().when(|_, _, _| true).build();

        assert!(matches!(result, Err(BuildError::MissingTransition)));
    }

    #[tokio::test]
    async fn missing_guard_accepts() {
        let handler = Builder::new().to(|_, _, _| Ok(StateB)).build().unwrap();

        assert!(validate(&handler, "any").await);
    }

    #[tokio::test]
    async fn guard_sees_event_payload() {
        let handler = Builder::new()
            .when(|_, _, event| event.id.starts_with("ok"))
            .to(|_, _, _| Ok(StateB))
            .build()
            .unwrap();

        assert!(validate(&handler, "ok-1").await);
        assert!(!validate(&handler, "nope").await);
    }

    #[tokio::test]
    async fn compensate_defaults_to_success() {
        let handler = Builder::new()
            .to(|_, _, _| Err("disk full".into()))
            .build()
            .unwrap();
        let failure = FlowError::resolve("boom");

        let ctx = context();
        let result = TransitionHandler::<TestContext, TestEvent>::transition(
            &handler,
            &ctx,
            &StateA,
            &event("1"),
        )
        .await;
        assert_eq!(result.unwrap_err().to_string(), "disk full");

        let undone = TransitionHandler::<TestContext, TestEvent>::compensate(
            &handler,
            &ctx,
            &StateA,
            None,
            &event("1"),
            &failure,
        )
        .await;
        assert!(undone.is_ok());
    }

    #[tokio::test]
    async fn compensate_receives_new_state() {
        let handler = Builder::new()
            .to(|_, _, _| Ok(StateB))
            .compensate(|_, _, to, _, _| match to {
                Some(_) => Err("cannot undo publish".into()),
                None => Ok(()),
            })
            .build()
            .unwrap();
        let failure = FlowError::resolve("boom");
        let ctx = context();

        let with_state = TransitionHandler::<TestContext, TestEvent>::compensate(
            &handler,
            &ctx,
            &StateA,
            Some(&StateB),
            &event("1"),
            &failure,
        )
        .await;
        assert!(with_state.is_err());
    }
}
