//! Macros for ergonomic state and event declaration.

/// Declare a state or event enum whose variants wrap payload types.
///
/// Generates the enum, its [`Tagged`](crate::core::Tagged) implementation
/// and one [`Variant`](crate::core::Variant) implementation per payload.
/// Each variant maps to a tag; several variants may share one.
///
/// A variant's kind is its payload type name without any leading module
/// path, so `docs::Draft` and `Draft` both have the kind `"Draft"`.
///
/// # Example
///
/// ```
/// use turnstile::core::{Tagged, Variant};
/// use turnstile::tagged_enum;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// pub enum Phase {
///     Open,
///     Closed,
/// }
///
/// #[derive(Clone, PartialEq, Debug)]
/// pub struct Draft;
///
/// #[derive(Clone, PartialEq, Debug)]
/// pub struct InReview {
///     pub reviewer: String,
/// }
///
/// #[derive(Clone, PartialEq, Debug)]
/// pub struct Published;
///
/// tagged_enum! {
///     #[derive(Clone, PartialEq, Debug)]
///     pub enum DocState: Phase {
///         Draft(Draft) => Phase::Open,
///         InReview(InReview) => Phase::Open,
///         Published(Published) => Phase::Closed,
///     }
/// }
///
/// let state = InReview { reviewer: "kim".to_string() }.widen();
/// assert_eq!(state.tag(), Phase::Open);
/// assert_eq!(state.kind(), "InReview");
/// assert!(Draft::narrow(&state).is_none());
/// ```
#[macro_export]
macro_rules! tagged_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $tag:ty {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident($payload:ty) => $tag_value:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant($payload)
            ),*
        }

        impl $crate::core::Tagged for $name {
            type Tag = $tag;

            fn tag(&self) -> $tag {
                match self {
                    $(Self::$variant(_) => $tag_value),*
                }
            }

            fn kind(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$payload as $crate::core::Variant<$name>>::KIND),*
                }
            }
        }

        $(
            impl $crate::core::Variant<$name> for $payload {
                const KIND: &'static str = $crate::builder::macros::payload_kind(stringify!($payload));

                #[allow(unreachable_patterns)]
                fn narrow(value: &$name) -> ::std::option::Option<&Self> {
                    match value {
                        $name::$variant(inner) => ::std::option::Option::Some(inner),
                        _ => ::std::option::Option::None,
                    }
                }

                fn widen(self) -> $name {
                    $name::$variant(self)
                }
            }
        )*
    };
}

/// Strip the module path from a stringified payload type.
///
/// Only `::` outside generic brackets counts, so `a::Wrapper<b::X>` keeps its
/// argument path.
#[doc(hidden)]
pub const fn payload_kind(written: &'static str) -> &'static str {
    let bytes = written.as_bytes();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && i + 1 < bytes.len() && bytes[i + 1] == b':' => {
                start = i + 2;
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    while start < bytes.len() && bytes[start] == b' ' {
        start += 1;
    }
    let (_, tail) = bytes.split_at(start);
    match std::str::from_utf8(tail) {
        Ok(kind) => kind,
        Err(_) => written,
    }
}
