//! Errors returned by `send_event` and handler resolution.

use std::fmt;
use thiserror::Error;

/// Error type application handlers and hooks return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which lifecycle hook set was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    Exit,
    Entry,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Exit => f.write_str("exit"),
            HookPhase::Entry => f.write_str("entry"),
        }
    }
}

/// Errors from executing a transition.
///
/// Every variant leaves the service's live context exactly as it was
/// before the failed call.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid transition: no rule for event '{event}' in state '{state}'")]
    InvalidTransition { state: String, event: String },

    #[error("no handler accepted event '{event}' in state '{state}' ({candidates} candidates)")]
    NoMatchingHandler {
        state: String,
        event: String,
        candidates: usize,
    },

    #[error("{phase} hook for '{kind}' failed: {source}")]
    Hook {
        phase: HookPhase,
        kind: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("transition out of '{kind}' failed: {source}")]
    Transition {
        kind: &'static str,
        #[source]
        source: BoxError,
    },

    /// Compensation failed; `original` is the failure that triggered it.
    #[error("compensation failed: {source} (while rolling back: {original})")]
    Compensation {
        #[source]
        source: BoxError,
        original: Box<FlowError>,
    },

    #[error("handler resolution failed: {source}")]
    Resolve {
        #[source]
        source: BoxError,
    },

    #[error("variant mismatch: handler expects '{expected}', got '{found}'")]
    VariantMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl FlowError {
    /// Wrap an arbitrary resolution failure raised inside a handler factory.
    pub fn resolve(source: impl Into<BoxError>) -> Self {
        FlowError::Resolve {
            source: source.into(),
        }
    }

    /// The application error behind a hook, transition or resolution
    /// failure, unwrapped.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            FlowError::Hook { source, .. }
            | FlowError::Transition { source, .. }
            | FlowError::Compensation { source, .. }
            | FlowError::Resolve { source } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Whether the attempt reached the commit phase and was rolled back.
    pub fn is_rollback(&self) -> bool {
        matches!(
            self,
            FlowError::Hook { .. } | FlowError::Transition { .. } | FlowError::Compensation { .. }
        )
    }

    /// Returns whether resending the same event to an unchanged context may
    /// succeed.
    ///
    /// Rejections depend only on the context and the event and are never
    /// retryable; commit-phase failures come from application code and may be.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FlowError::Hook { .. } | FlowError::Transition { .. } | FlowError::Resolve { .. }
        )
    }

    /// Returns a stable error code suitable for host protocols and metrics.
    pub fn error_code(&self) -> &'static str {
        match self {
            FlowError::InvalidTransition { .. } => "INVALID_TRANSITION",
            FlowError::NoMatchingHandler { .. } => "NO_MATCHING_HANDLER",
            FlowError::Hook { .. } => "HOOK_FAILED",
            FlowError::Transition { .. } => "TRANSITION_FAILED",
            FlowError::Compensation { .. } => "COMPENSATION_FAILED",
            FlowError::Resolve { .. } => "RESOLVE_FAILED",
            FlowError::VariantMismatch { .. } => "VARIANT_MISMATCH",
        }
    }
}
