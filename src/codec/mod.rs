//! Copying and serializing contexts.
//!
//! The engine only ever calls [`Codec::copy`], once per commit attempt and
//! once per [`context()`](crate::effects::StateMachineService::context) call.
//! `encode`/`decode` back [checkpoints](crate::checkpoint).

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

pub mod error;

pub use error::CodecError;

/// Produces deep copies of a context and converts it to and from bytes.
pub trait Codec<C>: Send + Sync + 'static {
    /// Deep copy; the result shares no mutable state with `context`.
    fn copy(&self, context: &C) -> C;

    fn encode(&self, context: &C) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<C, CodecError>;
}

/// Codec encoding contexts as JSON.
pub struct JsonCodec<C> {
    _phantom: PhantomData<fn() -> C>,
}

impl<C> JsonCodec<C> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<C> Default for JsonCodec<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Codec<C> for JsonCodec<C>
where
    C: Clone + Serialize + DeserializeOwned + 'static,
{
    fn copy(&self, context: &C) -> C {
        context.clone()
    }

    fn encode(&self, context: &C) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(context)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<C, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Codec encoding contexts with bincode.
///
/// Contexts must not rely on self-describing formats
/// (`#[serde(untagged)]`, `flatten`, ...).
pub struct BincodeCodec<C> {
    _phantom: PhantomData<fn() -> C>,
}

impl<C> BincodeCodec<C> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<C> Default for BincodeCodec<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Codec<C> for BincodeCodec<C>
where
    C: Clone + Serialize + DeserializeOwned + 'static,
{
    fn copy(&self, context: &C) -> C {
        context.clone()
    }

    fn encode(&self, context: &C) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(context)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<C, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
