//! Build errors for machine and transition builders.

use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Environment not specified. Call .environment(env) before .build()")]
    MissingEnvironment,

    #[error("Codec not specified. Call .codec(codec) before .build()")]
    MissingCodec,

    #[error("Transition function not specified. Call .to(f) before .build()")]
    MissingTransition,
}
