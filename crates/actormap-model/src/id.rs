//! Typed identifiers
//!
//! Every identifier is a string newtype so ids loaded from persisted
//! documents round-trip untouched. Generated ids take the form
//! `<prefix>_<ULID>`, which keeps them sortable by creation time.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use ulid::Ulid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix used for generated ids
            pub const PREFIX: &'static str = $prefix;

            /// Wrap an existing id
            #[inline]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh, time-sortable id
            #[inline]
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}_{}", $prefix, Ulid::new()))
            }

            /// Borrow the raw id
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the raw id
            #[inline]
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of one analysis document
    DocumentId,
    "doc"
);
string_id!(
    /// Identifier of a timeline state
    StateId,
    "state"
);
string_id!(
    /// Identifier of an actor (graph node)
    NodeId,
    "node"
);
string_id!(
    /// Identifier of a relation (graph edge)
    EdgeId,
    "edge"
);
string_id!(
    /// Identifier of a visual group of actors
    GroupId,
    "group"
);
string_id!(
    /// Identifier of a node or edge type definition
    TypeId,
    "type"
);
string_id!(
    /// Identifier of a label definition
    LabelId,
    "label"
);
