//! The entity driven through a state machine.

use super::state::State;

/// Mutable entity holding exactly one current state plus application data.
///
/// A service owns its context exclusively between calls and only mutates
/// it by swapping in a fully committed working copy.
pub trait Context: Send + Sync + 'static {
    type State: State;

    /// The current state.
    fn state(&self) -> &Self::State;

    /// Replace the current state.
    fn set_state(&mut self, state: Self::State);
}
