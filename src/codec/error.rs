//! Codec error types.

use thiserror::Error;

/// Errors raised while encoding or decoding a context
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON codec failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary codec failed: {0}")]
    Binary(#[from] bincode::Error),
}
