//! Month-indexed numeric matrix with manual overrides.
//!
//! The computed values come from outside (the financial projection of a
//! budget). Users may replace any `(month, concept)` cell with a literal value
//! and later restore the computed one. Overrides never feed totals.

pub mod error;
pub mod resolve;
pub mod store;
pub mod types;


pub use error::MatrixError;
pub use resolve::{ResolvedCell, ResolvedMatrix, ResolvedRow, resolve};
pub use store::{OverrideRecord, OverrideStore};
pub use types::{CellValue, ComputedMatrix, MatrixConcept, OverrideKey, ValueKind};
