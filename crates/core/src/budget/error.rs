//! Budget error types.

use obra_shared::AppError;
use obra_shared::types::{BudgetId, LineGroupId};
use thiserror::Error;

/// Budget-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    /// Budget name is blank.
    #[error("Budget name must not be empty")]
    EmptyName,

    /// Line group name is blank.
    #[error("Line group name must not be empty")]
    EmptyGroupName,

    /// Line item description is blank.
    #[error("Line item description must not be empty")]
    EmptyDescription,

    /// Budget not found.
    #[error("Budget not found: {0}")]
    NotFound(BudgetId),

    /// Line group not found.
    #[error("Line group not found: {0}")]
    LineGroupNotFound(LineGroupId),

    /// Another group of the budget already uses this order index.
    #[error("Order index {order_index} is already used in budget {budget_id}")]
    DuplicateOrderIndex {
        /// Budget ID.
        budget_id: BudgetId,
        /// Conflicting order index.
        order_index: i32,
    },

    /// A quantity or price is negative.
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(String),

    /// Unknown status name.
    #[error("Invalid budget status: {0}")]
    InvalidStatus(String),
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        let message = err.to_string();
        match err {
            BudgetError::EmptyName
            | BudgetError::EmptyGroupName
            | BudgetError::EmptyDescription
            | BudgetError::NegativeAmount(_)
            | BudgetError::InvalidStatus(_) => Self::Validation(message),
            BudgetError::NotFound(_) | BudgetError::LineGroupNotFound(_) => {
                Self::NotFound(message)
            }
            BudgetError::DuplicateOrderIndex { .. } => Self::Conflict(message),
        }
    }
}
