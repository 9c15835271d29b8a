//! Transition rule table.

use crate::core::{Context, Event, Tagged};
use crate::effects::handler::HandlerFactory;
use std::collections::HashMap;

type StateTag<C> = <<C as Context>::State as Tagged>::Tag;
type EventTag<E> = <E as Tagged>::Tag;

/// Ordered handler factories keyed by `(state tag, event tag)`.
///
/// Filled during registration, read-only once a machine is built.
/// Registration performs no reachability checks.
pub struct RuleTable<C: Context, E: Event, Env> {
    rules: HashMap<(StateTag<C>, EventTag<E>), Vec<HandlerFactory<C, E, Env>>>,
}

impl<C: Context, E: Event, Env> RuleTable<C, E, Env> {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Append a factory; earlier registrations are tried first.
    pub fn add(&mut self, state: StateTag<C>, event: EventTag<E>, factory: HandlerFactory<C, E, Env>) {
        self.rules.entry((state, event)).or_default().push(factory);
    }

    /// Candidate factories in registration order, or `None` if no rule
    /// covers the pair.
    pub fn candidates(
        &self,
        state: StateTag<C>,
        event: EventTag<E>,
    ) -> Option<&[HandlerFactory<C, E, Env>]> {
        self.rules
            .get(&(state, event))
            .map(Vec::as_slice)
            .filter(|factories| !factories.is_empty())
    }

    /// Number of distinct `(state tag, event tag)` keys.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<C: Context, E: Event, Env> Default for RuleTable<C, E, Env> {
    fn default() -> Self {
        Self::new()
    }
}
