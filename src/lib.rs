//! Turnstile: an event-driven state machine engine with rollback.
//!
//! Turnstile keeps Stillwater's "pure core, imperative shell" split. The core
//! (states, events, contexts, history) is plain data; the engine resolves
//! handlers as effects against an environment and commits each transition
//! on a working copy of the context, so a failure anywhere in the lifecycle
//! leaves the caller's context untouched.
//!
//! # Core Concepts
//!
//! - **State / Event**: enums whose variants wrap payload types, declared with
//!   [`tagged_enum!`]. Tags select rules; payload kinds select hooks.
//! - **Context**: the entity a machine drives; it carries its current state.
//! - **Handlers**: typed `validate` / `transition` / `compensate` per rule.
//! - **Hooks**: exit and entry callbacks for a state kind.
//! - **Service**: one per context; `send_event` commits or rolls back.
//!
//! # Example
//!
//! ```rust
//! use turnstile::builder::{MachineBuilder, TransitionBuilder};
//! use turnstile::codec::JsonCodec;
//! use turnstile::core::Context;
//! use turnstile::tagged_enum;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
//! enum Door { Closed, Open }
//!
//! #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
//! enum Action { Push }
//!
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! struct Locked;
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! struct Unlocked;
//! #[derive(Clone, Debug)]
//! struct Push;
//!
//! tagged_enum! {
//!     #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//!     enum Gate: Door {
//!         Locked(Locked) => Door::Closed,
//!         Unlocked(Unlocked) => Door::Open,
//!     }
//! }
//!
//! tagged_enum! {
//!     #[derive(Clone, Debug)]
//!     enum Input: Action {
//!         Push(Push) => Action::Push,
//!     }
//! }
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct Turnstile { gate: Gate, passes: u32 }
//!
//! impl Context for Turnstile {
//!     type State = Gate;
//!     fn state(&self) -> &Gate { &self.gate }
//!     fn set_state(&mut self, state: Gate) { self.gate = state; }
//! }
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let unlock = TransitionBuilder::<Turnstile, Locked, Push, Unlocked>::new()
//!     .to(|_, _, _| Ok(Unlocked))
//!     .build()
//!     .unwrap();
//!
//! let machine = MachineBuilder::<Turnstile, Input, ()>::new()
//!     .environment(())
//!     .codec(JsonCodec::new())
//!     .add_handler(Door::Closed, Action::Push, unlock)
//!     .build()
//!     .unwrap();
//!
//! let mut service = machine.create_service(Turnstile { gate: Gate::Locked(Locked), passes: 0 });
//! service.send_event(Input::Push(Push)).await.unwrap();
//! assert_eq!(service.current_state(), &Gate::Unlocked(Unlocked));
//! # });
//! # }
//! ```

pub mod builder;
pub mod checkpoint;
pub mod codec;
pub mod core;
pub mod effects;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder, TransitionBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use codec::{BincodeCodec, Codec, JsonCodec};
pub use core::{Context, Event, State, StateHistory, StateTransition, Tagged, Variant};
pub use effects::{
    FlowError, HookPhase, MachineConfig, StateHook, StateMachine, StateMachineService,
    TransitionHandler,
};
