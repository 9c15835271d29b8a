//! Immutable machine definition shared by every service built from it.

use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::codec::Codec;
use crate::core::{Context, Event, StateHistory, Tagged};
use crate::effects::hooks::HookRegistry;
use crate::effects::rules::RuleTable;
use crate::effects::service::StateMachineService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of committed transitions a service remembers.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Tunables carried by a machine definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Maximum transitions kept per service. `None` keeps everything,
    /// `Some(0)` disables recording.
    pub history_limit: Option<usize>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
        }
    }
}

pub(crate) struct Definition<C: Context, E: Event, Env> {
    pub(crate) rules: RuleTable<C, E, Env>,
    pub(crate) hooks: HookRegistry<C>,
    pub(crate) codec: Arc<dyn Codec<C>>,
    pub(crate) env: Env,
    pub(crate) config: MachineConfig,
}

/// A built state machine: rules, hooks, codec and environment.
///
/// Cloning is cheap and every clone shares the same definition, so one
/// machine can serve many entities across threads. Build one with
/// [`MachineBuilder`](crate::builder::MachineBuilder).
pub struct StateMachine<C: Context, E: Event, Env> {
    pub(crate) inner: Arc<Definition<C, E, Env>>,
}

impl<C: Context, E: Event, Env> Clone for StateMachine<C, E, Env> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, E, Env> StateMachine<C, E, Env>
where
    C: Context,
    E: Event,
    Env: Clone + Send + Sync + 'static,
{
    pub(crate) fn from_definition(definition: Definition<C, E, Env>) -> Self {
        Self {
            inner: Arc::new(definition),
        }
    }

    /// Create a service driving `context`.
    ///
    /// The service takes ownership; nothing outside it can mutate the
    /// context afterwards.
    pub fn create_service(&self, context: C) -> StateMachineService<C, E, Env> {
        StateMachineService::new(self.clone(), context, StateHistory::new())
    }

    /// Resume a service from a checkpoint taken with
    /// [`StateMachineService::checkpoint`].
    ///
    /// Fails if the format version is unknown, the context cannot be
    /// decoded, or the decoded state disagrees with the last recorded
    /// transition.
    pub fn restore(
        &self,
        checkpoint: Checkpoint<C::State>,
    ) -> Result<StateMachineService<C, E, Env>, CheckpointError> {
        checkpoint.check_version()?;
        let context = self.inner.codec.decode(&checkpoint.context)?;

        if let Some(last) = checkpoint.history.transitions().last() {
            if &last.to != context.state() {
                return Err(CheckpointError::ValidationFailed(format!(
                    "context is in '{}' but history ends in '{}'",
                    context.state().kind(),
                    last.to.kind()
                )));
            }
        }

        let history = match self.inner.config.history_limit {
            Some(limit) => checkpoint.history.keep_last(limit),
            None => checkpoint.history,
        };
        tracing::debug!(id = %checkpoint.id, state = context.state().kind(), "service restored");
        Ok(StateMachineService::new(self.clone(), context, history))
    }

    /// The environment handler factories resolve against.
    pub fn environment(&self) -> &Env {
        &self.inner.env
    }

    pub fn config(&self) -> &MachineConfig {
        &self.inner.config
    }

    pub fn codec(&self) -> &dyn Codec<C> {
        self.inner.codec.as_ref()
    }

    /// Number of `(state tag, event tag)` pairs with at least one rule.
    pub fn rule_count(&self) -> usize {
        self.inner.rules.len()
    }
}
