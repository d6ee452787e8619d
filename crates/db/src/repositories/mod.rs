//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod budget;
pub mod matrix_override;
pub mod schedule;

pub use budget::{BudgetRepository, BudgetRepositoryError};
pub use matrix_override::{MatrixOverrideRepository, OverrideRepositoryError};
pub use schedule::{ScheduleRepository, ScheduleRepositoryError};
