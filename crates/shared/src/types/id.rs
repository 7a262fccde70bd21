//! Typed IDs for type-safe entity references.
//!
//! Every record in the registry is keyed by a database-generated integer.
//! Wrapping those integers prevents passing a `ContactId` where a `UserId`
//! is expected, which matters because signers and executors live in
//! different directories.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers over an integer key.
macro_rules! typed_id {
    ($name:ident, $inner:ty, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Creates an ID from a raw database key.
            #[must_use]
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Returns the raw database key.
            #[must_use]
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

typed_id!(DocumentId, i64, "Identifier of a document within its kind's store.");
typed_id!(StatusId, i32, "Identifier of a row in the document status lookup table.");
typed_id!(UserId, i64, "Identifier of a system user (the acting signer).");
typed_id!(ContactId, i64, "Identifier of a contact (executor or responsible party).");
typed_id!(OrganizationId, i64, "Identifier of an organization.");
typed_id!(DocumentTypeId, i64, "Identifier of a kind-specific document type.");
typed_id!(SignatureId, i64, "Identifier of an audit trail entry.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
