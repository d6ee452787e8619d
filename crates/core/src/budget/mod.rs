//! Budget aggregate (presupuesto, partidas, conceptos) and duplication.

pub mod duplication;
pub mod error;
pub mod types;


pub use duplication::{DuplicationPlan, DuplicationPlanner};
pub use error::BudgetError;
pub use types::{
    Budget, BudgetAggregate, BudgetStatus, ClassificationMapping, CreateBudgetInput,
    CreateLineGroupInput, CreateLineItemInput, DuplicateBudgetOptions, LineGroup, LineItem,
    validate_name,
};
