//! Lifecycle hooks run when a context leaves or enters a state.
//!
//! Hooks are keyed by the exact payload kind of a state, not by its tag,
//! and are registered independently of transition rules. Dispatch is a map
//! lookup on [`Tagged::kind`]; no runtime type inspection is involved.

use crate::core::{Context, Tagged, Variant};
use crate::effects::adapter::narrow;
use crate::effects::error::{BoxError, FlowError, HookPhase};
use async_trait::async_trait;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// A cross-cutting hook for one concrete state payload `V`.
///
/// Hooks receive the working copy of the context; changes they make are
/// committed only if the whole transition succeeds.
#[async_trait]
pub trait StateHook<C: Context, V>: Send + Sync + 'static {
    async fn handle(&self, context: &mut C, state: &V) -> Result<(), BoxError>;
}

/// Hook over the machine's state enum.
#[async_trait]
pub trait ErasedHook<C: Context>: Send + Sync {
    async fn invoke(
        &self,
        phase: HookPhase,
        context: &mut C,
        state: &C::State,
    ) -> Result<(), FlowError>;
}

struct HookAdapter<V, H> {
    hook: H,
    _phantom: PhantomData<fn() -> V>,
}

#[async_trait]
impl<C, V, H> ErasedHook<C> for HookAdapter<V, H>
where
    C: Context,
    V: Variant<C::State>,
    H: StateHook<C, V>,
{
    async fn invoke(
        &self,
        phase: HookPhase,
        context: &mut C,
        state: &C::State,
    ) -> Result<(), FlowError> {
        let payload = narrow::<V, _>(state)?;
        self.hook
            .handle(context, payload)
            .await
            .map_err(|source| FlowError::Hook {
                phase,
                kind: V::KIND,
                source,
            })
    }
}

type HookList<C> = Vec<Arc<dyn ErasedHook<C>>>;

/// Exit and entry hooks indexed by state kind, in registration order.
pub struct HookRegistry<C: Context> {
    exit: HashMap<&'static str, HookList<C>>,
    entry: HashMap<&'static str, HookList<C>>,
}

impl<C: Context> HookRegistry<C> {
    pub fn new() -> Self {
        Self {
            exit: HashMap::new(),
            entry: HashMap::new(),
        }
    }

    /// Register a hook run when a context leaves a `V` state.
    pub fn on_exit<V, H>(&mut self, hook: H)
    where
        V: Variant<C::State>,
        H: StateHook<C, V>,
    {
        Self::insert::<V, H>(&mut self.exit, hook);
    }

    /// Register a hook run after a context enters a `V` state.
    pub fn on_entry<V, H>(&mut self, hook: H)
    where
        V: Variant<C::State>,
        H: StateHook<C, V>,
    {
        Self::insert::<V, H>(&mut self.entry, hook);
    }

    fn insert<V, H>(table: &mut HashMap<&'static str, HookList<C>>, hook: H)
    where
        V: Variant<C::State>,
        H: StateHook<C, V>,
    {
        let adapter: Arc<dyn ErasedHook<C>> = Arc::new(HookAdapter {
            hook,
            _phantom: PhantomData::<fn() -> V>,
        });
        table.entry(V::KIND).or_default().push(adapter);
    }

    /// Hooks for leaving a state of the given kind.
    pub fn exit_hooks(&self, kind: &str) -> &[Arc<dyn ErasedHook<C>>] {
        self.exit.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Hooks for entering a state of the given kind.
    pub fn entry_hooks(&self, kind: &str) -> &[Arc<dyn ErasedHook<C>>] {
        self.entry.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Run every hook registered for `phase` and the kind of `state`.
    ///
    /// Hooks run one after another; the first failure stops the phase.
    pub async fn run(
        &self,
        phase: HookPhase,
        context: &mut C,
        state: &C::State,
    ) -> Result<(), FlowError> {
        let hooks = match phase {
            HookPhase::Exit => self.exit_hooks(state.kind()),
            HookPhase::Entry => self.entry_hooks(state.kind()),
        };
        for (index, hook) in hooks.iter().enumerate() {
            tracing::trace!(%phase, kind = state.kind(), index, "running hook");
            hook.invoke(phase, context, state).await?;
        }
        Ok(())
    }
}

impl<C: Context> Default for HookRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}
