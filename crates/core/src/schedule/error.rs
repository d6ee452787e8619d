//! Schedule error types.

use obra_shared::AppError;
use obra_shared::types::ActivityId;
use thiserror::Error;

/// Schedule-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// Month outside 1..=12.
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(i64),

    /// Week outside 1..=4.
    #[error("Invalid week: {0} (expected 1-4)")]
    InvalidWeek(i64),

    /// Duration outside 1..=`MAX_DURATION_WEEKS`.
    #[error("Invalid duration: {0} weeks (expected 1-480)")]
    InvalidDuration(i64),

    /// Activity name is blank.
    #[error("Activity name must not be empty")]
    EmptyName,

    /// Activity not found.
    #[error("Schedule activity not found: {0}")]
    NotFound(ActivityId),
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        let message = err.to_string();
        match err {
            ScheduleError::NotFound(_) => Self::NotFound(message),
            _ => Self::Validation(message),
        }
    }
}
