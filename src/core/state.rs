//! State and event traits.
//!
//! States and events are closed enums whose variants wrap payload types.
//! Every value exposes two discriminators:
//!
//! - a **tag**, a small hashable value used as the rule-table key, and
//! - a **kind**, the name of the exact payload type, used to dispatch
//!   lifecycle hooks.
//!
//! Several variants may share a tag; each payload type has exactly one kind.

use std::fmt::Debug;
use std::hash::Hash;

/// A value carrying a tag and a kind.
///
/// Usually implemented through [`tagged_enum!`](crate::tagged_enum).
pub trait Tagged: Debug + Send + Sync + 'static {
    /// Finite discriminator used to key transition rules.
    type Tag: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// The rule-table key of this value.
    fn tag(&self) -> Self::Tag;

    /// Name of the payload type held by this value.
    fn kind(&self) -> &'static str;
}

/// A payload type wrapped by one variant of the enum `P`.
///
/// Narrowing is checked: it returns `None` instead of reinterpreting
/// a value of another variant.
pub trait Variant<P>: Sized + Debug + Send + Sync + 'static {
    /// Kind name; equal to `P::kind()` for every value holding `Self`.
    const KIND: &'static str;

    /// Borrow the payload if `value` holds this variant.
    fn narrow(value: &P) -> Option<&Self>;

    /// Wrap the payload into its enum.
    fn widen(self) -> P;
}

/// Trait for state machine states.
///
/// # Required Traits
///
/// - `Clone`: working copies and history records clone states
/// - `PartialEq`: rollback is observable by comparing contexts
/// - `Debug`: states show up in errors and logs
pub trait State: Tagged + Clone + PartialEq {}

impl<T: Tagged + Clone + PartialEq> State for T {}

/// Trait for the events fed to a state machine.
pub trait Event: Tagged {}

impl<T: Tagged> Event for T {}
