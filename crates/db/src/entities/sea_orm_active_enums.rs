//! `SeaORM` active enums mapped to Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "budget_status")]
pub enum BudgetStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "archived")]
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "matrix_concept")]
pub enum MatrixConcept {
    #[sea_orm(string_value = "monthly_expense")]
    MonthlyExpense,
    #[sea_orm(string_value = "partial_progress")]
    PartialProgress,
    #[sea_orm(string_value = "cumulative_progress")]
    CumulativeProgress,
    #[sea_orm(string_value = "disbursement")]
    Disbursement,
    #[sea_orm(string_value = "cumulative_investment")]
    CumulativeInvestment,
    #[sea_orm(string_value = "payment_date")]
    PaymentDate,
}
