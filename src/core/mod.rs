//! Core state machine types.
//!
//! This module contains the vocabulary every other module builds on:
//! - States and events via the `Tagged`, `Variant`, `State` and `Event` traits
//! - The `Context` entity a machine drives
//! - Immutable history of committed transitions

mod context;
mod history;
mod state;

pub use context::Context;
pub use history::{StateHistory, StateTransition};
pub use state::{Event, State, Tagged, Variant};
