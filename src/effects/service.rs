//! Per-entity runtime executing events against a machine definition.

use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::core::{Context, Event, StateHistory, StateTransition, Tagged};
use crate::effects::adapter::ErasedTransition;
use crate::effects::error::{FlowError, HookPhase};
use crate::effects::handler::{BoxedTransition, HandlerFactory};
use crate::effects::machine::{Definition, StateMachine};
use chrono::Utc;
use std::sync::Arc;
use stillwater::effect::Effect;

/// Drives one context through a [`StateMachine`].
///
/// `send_event` takes `&mut self`: one event at a time per service. Run
/// one service per entity; the machine itself is shared.
pub struct StateMachineService<C: Context, E: Event, Env> {
    machine: StateMachine<C, E, Env>,
    context: C,
    history: StateHistory<C::State>,
}

impl<C, E, Env> StateMachineService<C, E, Env>
where
    C: Context,
    E: Event,
    Env: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        machine: StateMachine<C, E, Env>,
        context: C,
        history: StateHistory<C::State>,
    ) -> Self {
        Self {
            machine,
            context,
            history,
        }
    }

    /// A copy of the live context, made through the machine's codec.
    pub fn context(&self) -> C {
        self.machine.inner.codec.copy(&self.context)
    }

    /// The current state (pure)
    pub fn current_state(&self) -> &C::State {
        self.context.state()
    }

    /// Committed transitions, oldest first (pure)
    pub fn history(&self) -> &StateHistory<C::State> {
        &self.history
    }

    pub fn machine(&self) -> &StateMachine<C, E, Env> {
        &self.machine
    }

    /// Consume the service, returning the live context.
    pub fn into_context(self) -> C {
        self.context
    }

    /// Snapshot the committed context and history.
    ///
    /// The context is encoded with the machine's codec.
    pub fn checkpoint(&self) -> Result<Checkpoint<C::State>, CheckpointError> {
        let bytes = self.machine.inner.codec.encode(&self.context)?;
        let checkpoint = Checkpoint::new(bytes, self.history.clone());
        tracing::debug!(id = %checkpoint.id, state = self.context.state().kind(), "checkpoint taken");
        Ok(checkpoint)
    }

    /// Apply one event.
    ///
    /// Candidates registered for the current state tag and the event tag
    /// are validated in registration order; the first one that accepts is
    /// committed on a working copy of the context: exit hooks of the
    /// current state, the transition itself, then entry hooks of the new
    /// state. The working copy replaces the live context only if all three
    /// succeed. Otherwise the handler's `compensate` runs once and the
    /// failure is returned, with the live context untouched.
    pub async fn send_event(&mut self, event: E) -> Result<(), FlowError> {
        let definition = Arc::clone(&self.machine.inner);
        let state_tag = self.context.state().tag();
        let event_tag = event.tag();

        let Some(factories) = definition.rules.candidates(state_tag, event_tag) else {
            tracing::debug!(state = ?state_tag, event = ?event_tag, "no rule for event");
            return Err(FlowError::InvalidTransition {
                state: format!("{state_tag:?}"),
                event: format!("{event_tag:?}"),
            });
        };

        let (index, handler) = select(&definition, factories, &self.context, &event).await?;
        self.commit(&definition, index, handler, &event).await
    }

    async fn commit(
        &mut self,
        definition: &Definition<C, E, Env>,
        index: usize,
        handler: BoxedTransition<C, E>,
        event: &E,
    ) -> Result<(), FlowError> {
        let mut working = definition.codec.copy(&self.context);
        let from = working.state().clone();

        match attempt(definition, &*handler, &mut working, &from, event).await {
            Ok(to) => {
                tracing::debug!(
                    from = from.kind(),
                    to = to.kind(),
                    event = event.kind(),
                    "transition committed"
                );
                self.record(definition.config.history_limit, from, to, event, index);
                self.context = working;
                Ok(())
            }
            Err((failure, to)) => {
                tracing::warn!(
                    from = from.kind(),
                    event = event.kind(),
                    error = %failure,
                    "transition failed, compensating"
                );
                if let Err(source) = handler
                    .compensate(&working, &from, to.as_ref(), event, &failure)
                    .await
                {
                    tracing::error!(from = from.kind(), error = %source, "compensation failed");
                    return Err(FlowError::Compensation {
                        source,
                        original: Box::new(failure),
                    });
                }
                Err(failure)
            }
        }
    }

    fn record(
        &mut self,
        limit: Option<usize>,
        from: C::State,
        to: C::State,
        event: &E,
        handler: usize,
    ) {
        if limit == Some(0) {
            return;
        }
        let transition = StateTransition {
            from,
            to,
            event: event.kind().to_string(),
            handler,
            timestamp: Utc::now(),
        };
        self.history.push_bounded(transition, limit);
    }
}

/// Resolve candidates in order and return the first that validates.
async fn select<C, E, Env>(
    definition: &Definition<C, E, Env>,
    factories: &[HandlerFactory<C, E, Env>],
    context: &C,
    event: &E,
) -> Result<(usize, BoxedTransition<C, E>), FlowError>
where
    C: Context,
    E: Event,
    Env: Clone + Send + Sync + 'static,
{
    let state = context.state();
    for (index, factory) in factories.iter().enumerate() {
        let handler = factory(context).run(&definition.env).await?;
        if handler.validate(context, state, event).await? {
            tracing::debug!(state = state.kind(), event = event.kind(), index, "handler selected");
            return Ok((index, handler));
        }
        tracing::trace!(state = state.kind(), event = event.kind(), index, "candidate rejected event");
    }
    Err(FlowError::NoMatchingHandler {
        state: format!("{:?}", state.tag()),
        event: format!("{:?}", event.tag()),
        candidates: factories.len(),
    })
}

/// Exit hooks, transition, entry hooks, all on the working copy.
///
/// On failure, returns the new state alongside the error if one was
/// produced before the failure.
async fn attempt<C, E, Env>(
    definition: &Definition<C, E, Env>,
    handler: &dyn ErasedTransition<C, E>,
    working: &mut C,
    from: &C::State,
    event: &E,
) -> Result<C::State, (FlowError, Option<C::State>)>
where
    C: Context,
    E: Event,
{
    if let Err(failure) = definition.hooks.run(HookPhase::Exit, working, from).await {
        return Err((failure, None));
    }

    let to = handler
        .transition(working, from, event)
        .await
        .map_err(|failure| (failure, None))?;
    working.set_state(to.clone());

    match definition.hooks.run(HookPhase::Entry, working, &to).await {
        Ok(()) => Ok(to),
        Err(failure) => Err((failure, Some(to))),
    }
}
