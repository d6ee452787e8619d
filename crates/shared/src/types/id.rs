//! Typed IDs for type-safe entity references.
//!
//! A source `LineGroupId` cannot be confused with a `BudgetId` when an aggregate
//! is copied and both old and new identifiers are in flight.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(ProjectId, "Unique identifier for a construction project.");
typed_id!(ClientId, "Unique identifier for a client.");
typed_id!(BudgetId, "Unique identifier for a budget.");
typed_id!(LineGroupId, "Unique identifier for a budget line group (partida).");
typed_id!(LineItemId, "Unique identifier for a budget line item (concepto).");
typed_id!(
    MayorId,
    "Unique identifier for a cost classification group (mayor)."
);
typed_id!(
    ClassificationPartidaId,
    "Unique identifier for a partida inside the cost classification taxonomy."
);
typed_id!(ActivityId, "Unique identifier for a schedule activity.");
