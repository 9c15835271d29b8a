//! The transition engine, built on Stillwater 0.11.0 effects.
//!
//! This module is the "imperative shell" around the pure core: it resolves
//! handlers, runs lifecycle hooks and commits or rolls back transitions.
//!
//! # Key Concepts
//!
//! - **Rules**: `(state tag, event tag)` keys mapped to ordered handler factories
//! - **Handlers**: typed validate / transition / compensate capabilities
//! - **Hooks**: exit and entry callbacks keyed by exact state kind
//! - **Service**: one per entity, commits on a working copy of the context
//!
//! # Effects
//!
//! Handler factories return a `BoxedEffect` run against the machine
//! environment, so handlers obtain their collaborators the same way
//! Stillwater actions do: `pure()` for ready values, `from_fn()` to read
//! the environment.

mod adapter;
mod error;
mod handler;
mod hooks;
mod machine;
mod rules;
mod service;

#[cfg(test)]
pub(crate) mod fixtures;

pub use adapter::{ErasedTransition, TransitionAdapter};
pub use error::{BoxError, FlowError, HookPhase};
pub use handler::{resolved, with_env, BoxedTransition, HandlerFactory, TransitionHandler};
pub use hooks::{ErasedHook, HookRegistry, StateHook};
pub use machine::{MachineConfig, StateMachine, DEFAULT_HISTORY_LIMIT};
pub use rules::RuleTable;
pub use service::StateMachineService;

pub(crate) use handler::erase;
pub(crate) use machine::Definition;
