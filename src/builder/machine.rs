//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::codec::Codec;
use crate::core::{Context, Event, Tagged, Variant};
use crate::effects::{
    erase, resolved, with_env, Definition, FlowError, HookRegistry, MachineConfig, RuleTable,
    StateHook, StateMachine, TransitionHandler,
};
use std::sync::Arc;
use stillwater::effect::BoxedEffect;

type StateTag<C> = <<C as Context>::State as Tagged>::Tag;
type EventTag<E> = <E as Tagged>::Tag;

/// Builder for constructing state machines with a fluent API.
///
/// Rules and hooks may be added in any order; the environment and the
/// codec are required.
pub struct MachineBuilder<C: Context, E: Event, Env> {
    rules: RuleTable<C, E, Env>,
    hooks: HookRegistry<C>,
    codec: Option<Arc<dyn Codec<C>>>,
    env: Option<Env>,
    config: MachineConfig,
}

impl<C, E, Env> MachineBuilder<C, E, Env>
where
    C: Context,
    E: Event,
    Env: Clone + Send + Sync + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            rules: RuleTable::new(),
            hooks: HookRegistry::new(),
            codec: None,
            env: None,
            config: MachineConfig::default(),
        }
    }

    /// Set the environment handler factories resolve against (required).
    pub fn environment(mut self, env: Env) -> Self {
        self.env = Some(env);
        self
    }

    /// Set the codec used to copy and encode contexts (required).
    pub fn codec(mut self, codec: impl Codec<C>) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Bound the per-service history; `None` keeps everything.
    ///
    /// An unbounded history grows with every committed event and is copied
    /// whole by `checkpoint`.
    pub fn history_limit(mut self, limit: Option<usize>) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Register a handler factory for `(state, event)`.
    ///
    /// Factories for the same pair are tried in registration order.
    pub fn add_transition<H, F>(mut self, state: StateTag<C>, event: EventTag<E>, factory: F) -> Self
    where
        H: TransitionHandler<C, E>,
        F: Fn(&C) -> BoxedEffect<H, FlowError, Env> + Send + Sync + 'static,
    {
        self.rules.add(state, event, erase(factory));
        self
    }

    /// Register a ready-made handler, cloned for every dispatch attempt.
    pub fn add_handler<H>(self, state: StateTag<C>, event: EventTag<E>, handler: H) -> Self
    where
        H: TransitionHandler<C, E> + Clone,
    {
        self.add_transition(state, event, resolved::<C, Env, H>(handler))
    }

    /// Register a handler built from the environment on every attempt.
    pub fn add_with_env<H, F>(self, state: StateTag<C>, event: EventTag<E>, build: F) -> Self
    where
        H: TransitionHandler<C, E>,
        F: Fn(&Env) -> H + Send + Sync + 'static,
    {
        self.add_transition(state, event, with_env::<C, Env, H, F>(build))
    }

    /// Run `hook` whenever a context leaves a `V` state.
    pub fn on_exit<V, H>(mut self, hook: H) -> Self
    where
        V: Variant<C::State>,
        H: StateHook<C, V>,
    {
        self.hooks.on_exit::<V, H>(hook);
        self
    }

    /// Run `hook` whenever a context enters a `V` state.
    pub fn on_entry<V, H>(mut self, hook: H) -> Self
    where
        V: Variant<C::State>,
        H: StateHook<C, V>,
    {
        self.hooks.on_entry::<V, H>(hook);
        self
    }

    /// Build the state machine.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<StateMachine<C, E, Env>, BuildError> {
        let env = self.env.ok_or(BuildError::MissingEnvironment)?;
        let codec = self.codec.ok_or(BuildError::MissingCodec)?;

        tracing::debug!(
            rules = self.rules.len(),
            history_limit = ?self.config.history_limit,
            "state machine built"
        );

        Ok(StateMachine::from_definition(Definition {
            rules: self.rules,
            hooks: self.hooks,
            codec,
            env,
            config: self.config,
        }))
    }
}

impl<C, E, Env> Default for MachineBuilder<C, E, Env>
where
    C: Context,
    E: Event,
    Env: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
