//! Statically-typed transition handlers and the factories that resolve them.

use crate::core::{Context, Event, Variant};
use crate::effects::adapter::{ErasedTransition, TransitionAdapter};
use crate::effects::error::{BoxError, FlowError};
use async_trait::async_trait;
use std::sync::Arc;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;

/// A transition bound to one source payload, one event payload and one
/// result payload.
///
/// Handlers are produced by a [`HandlerFactory`] once per dispatch
/// attempt. `validate` should be read-only: it runs against the live
/// context, and candidates after the first acceptance are never asked.
#[async_trait]
pub trait TransitionHandler<C: Context, E: Event>: Send + Sync + 'static {
    type From: Variant<C::State>;
    type Event: Variant<E>;
    type To: Variant<C::State>;

    /// Decide whether this handler takes the event.
    async fn validate(&self, context: &C, from: &Self::From, event: &Self::Event) -> bool;

    /// Produce the next state. Runs on the working copy, after exit hooks.
    async fn transition(
        &self,
        context: &C,
        from: &Self::From,
        event: &Self::Event,
    ) -> Result<Self::To, BoxError>;

    /// Undo external effects of a failed attempt.
    ///
    /// Called exactly once when an exit hook, `transition` or an entry hook
    /// fails. `to` is `None` when no new state was produced. `context` is
    /// the working copy as it stood at the failure; it is discarded
    /// afterwards.
    async fn compensate(
        &self,
        _context: &C,
        _from: &Self::From,
        _to: Option<&Self::To>,
        _event: &Self::Event,
        _failure: &FlowError,
    ) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Type-erased handler, as stored behind every rule.
pub type BoxedTransition<C, E> = Box<dyn ErasedTransition<C, E>>;

/// Resolves a handler for one dispatch attempt against the machine
/// environment. A fresh effect is created on every call.
pub type HandlerFactory<C, E, Env> =
    Arc<dyn Fn(&C) -> BoxedEffect<BoxedTransition<C, E>, FlowError, Env> + Send + Sync>;

/// Turn a typed factory into the erased form stored in the rule table.
pub(crate) fn erase<C, E, Env, H, F>(factory: F) -> HandlerFactory<C, E, Env>
where
    C: Context,
    E: Event,
    Env: Clone + Send + Sync + 'static,
    H: TransitionHandler<C, E>,
    F: Fn(&C) -> BoxedEffect<H, FlowError, Env> + Send + Sync + 'static,
{
    Arc::new(
        move |context: &C| -> BoxedEffect<BoxedTransition<C, E>, FlowError, Env> {
            factory(context)
                .map(|handler| Box::new(TransitionAdapter::new(handler)) as BoxedTransition<C, E>)
                .boxed()
        },
    )
}

/// Factory handing out a clone of an already-built handler.
///
/// # Example
///
/// ```ignore
/// builder.add_transition(Tag::Draft, Tag::Submit, resolved(SubmitHandler));
/// ```
pub fn resolved<C, Env, H>(
    handler: H,
) -> impl Fn(&C) -> BoxedEffect<H, FlowError, Env> + Send + Sync + 'static
where
    C: Context,
    Env: Clone + Send + Sync + 'static,
    H: Clone + Send + Sync + 'static,
{
    move |_context: &C| -> BoxedEffect<H, FlowError, Env> { pure(handler.clone()).boxed() }
}

/// Factory building a handler from the machine environment.
///
/// This is how handlers get their collaborators (clients, repositories,
/// clocks) without a service locator.
pub fn with_env<C, Env, H, F>(
    build: F,
) -> impl Fn(&C) -> BoxedEffect<H, FlowError, Env> + Send + Sync + 'static
where
    C: Context,
    Env: Clone + Send + Sync + 'static,
    H: Send + Sync + 'static,
    F: Fn(&Env) -> H + Send + Sync + 'static,
{
    let build = Arc::new(build);
    move |_context: &C| -> BoxedEffect<H, FlowError, Env> {
        let build = Arc::clone(&build);
        from_fn(move |env: &Env| Ok(build(env))).boxed()
    }
}
