//! Matrix error types.

use obra_shared::AppError;
use thiserror::Error;

/// Errors raised by the override matrix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    /// Months are numbered from 1.
    #[error("Invalid month: {0} (months start at 1)")]
    InvalidMonth(i64),

    /// Concept name is not one of the six matrix rows.
    #[error("Unknown matrix concept: {0}")]
    UnknownConcept(String),
}

impl From<MatrixError> for AppError {
    fn from(err: MatrixError) -> Self {
        Self::Validation(err.to_string())
    }
}
