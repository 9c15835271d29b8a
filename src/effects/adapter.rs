//! Type erasure for transition handlers.
//!
//! Rules store handlers over the machine's state and event enums. The
//! adapter narrows the enums to the payload types a handler was written
//! for, and refuses loudly when they do not match.

use crate::core::{Context, Event, Tagged, Variant};
use crate::effects::error::{BoxError, FlowError};
use crate::effects::handler::TransitionHandler;
use async_trait::async_trait;

/// Handler interface over the common state and event enums.
#[async_trait]
pub trait ErasedTransition<C: Context, E: Event>: Send + Sync {
    async fn validate(&self, context: &C, from: &C::State, event: &E) -> Result<bool, FlowError>;

    async fn transition(
        &self,
        context: &C,
        from: &C::State,
        event: &E,
    ) -> Result<C::State, FlowError>;

    async fn compensate(
        &self,
        context: &C,
        from: &C::State,
        to: Option<&C::State>,
        event: &E,
        failure: &FlowError,
    ) -> Result<(), BoxError>;
}

/// Wraps a [`TransitionHandler`] as an [`ErasedTransition`].
pub struct TransitionAdapter<H> {
    handler: H,
}

impl<H> TransitionAdapter<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }
}

/// Checked downcast from an enum to one of its payload types.
pub(crate) fn narrow<V, P>(value: &P) -> Result<&V, FlowError>
where
    P: Tagged,
    V: Variant<P>,
{
    V::narrow(value).ok_or(FlowError::VariantMismatch {
        expected: V::KIND,
        found: value.kind(),
    })
}

#[async_trait]
impl<C, E, H> ErasedTransition<C, E> for TransitionAdapter<H>
where
    C: Context,
    E: Event,
    H: TransitionHandler<C, E>,
{
    async fn validate(&self, context: &C, from: &C::State, event: &E) -> Result<bool, FlowError> {
        let from = narrow::<H::From, _>(from)?;
        let event = narrow::<H::Event, _>(event)?;
        Ok(self.handler.validate(context, from, event).await)
    }

    async fn transition(
        &self,
        context: &C,
        from: &C::State,
        event: &E,
    ) -> Result<C::State, FlowError> {
        let from = narrow::<H::From, _>(from)?;
        let event = narrow::<H::Event, _>(event)?;
        let to = self
            .handler
            .transition(context, from, event)
            .await
            .map_err(|source| FlowError::Transition {
                kind: <H::From as Variant<C::State>>::KIND,
                source,
            })?;
        Ok(to.widen())
    }

    async fn compensate(
        &self,
        context: &C,
        from: &C::State,
        to: Option<&C::State>,
        event: &E,
        failure: &FlowError,
    ) -> Result<(), BoxError> {
        let from = narrow::<H::From, _>(from)?;
        let to = to.map(narrow::<H::To, _>).transpose()?;
        let event = narrow::<H::Event, _>(event)?;
        self.handler
            .compensate(context, from, to, event, failure)
            .await
    }
}
