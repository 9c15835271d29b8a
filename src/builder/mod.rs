//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders and macros for declaring states,
//! events, transitions and machines with minimal boilerplate while keeping
//! every handler statically typed.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::MachineBuilder;
pub use transition::{FnTransition, TransitionBuilder};
