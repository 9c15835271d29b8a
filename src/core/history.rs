//! State transition history tracking.
//!
//! Services record every committed transition. Rolled-back attempts never
//! reach the history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use turnstile::core::StateTransition;
///
/// let transition = StateTransition {
///     from: "pending",
///     to: "running",
///     event: "Start".to_string(),
///     handler: 0,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.handler, 0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition<S> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Kind of the event that triggered the transition
    pub event: String,
    /// Registration index of the handler that accepted the event
    pub handler: usize,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of state transitions.
///
/// History is immutable - `record` returns a new history with the
/// transition added.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use turnstile::core::{StateHistory, StateTransition};
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: 1u8,
///         to: 2u8,
///         event: "Advance".to_string(),
///         handler: 0,
///         timestamp: Utc::now(),
///     })
///     .record(StateTransition {
///         from: 2u8,
///         to: 3u8,
///         event: "Advance".to_string(),
///         handler: 1,
///         timestamp: Utc::now(),
///     });
///
/// assert_eq!(history.get_path(), vec![&1, &2, &3]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateHistory<S> {
    transitions: Vec<StateTransition<S>>,
}

impl<S> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the first transition, then the `to`
    /// state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Calculate total duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all transitions, oldest first.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    /// Number of recorded transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Keep only the `limit` most recent transitions.
    pub fn keep_last(mut self, limit: usize) -> Self {
        let excess = self.transitions.len().saturating_sub(limit);
        self.transitions.drain(..excess);
        self
    }

    /// Append in place, then drop the oldest records beyond `limit`.
    ///
    /// `None` keeps everything. Unlike [`record`](Self::record) this never
    /// copies the existing records.
    pub fn push_bounded(&mut self, transition: StateTransition<S>, limit: Option<usize>) {
        self.transitions.push(transition);
        if let Some(limit) = limit {
            let excess = self.transitions.len().saturating_sub(limit);
            self.transitions.drain(..excess);
        }
    }
}

impl<S: Clone> StateHistory<S> {
    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }
}
