//! Matrix override repository.
//!
//! One row per overridden `(budget, month, concept)` cell. Writes are upserts;
//! concurrent edits of the same cell resolve to the last write.

use chrono::Utc;
use obra_core::matrix::{MatrixConcept, MatrixError, OverrideKey, OverrideRecord, OverrideStore};
use obra_shared::AppError;
use obra_shared::types::{BudgetId, UserId};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{
    budgets, matrix_overrides, sea_orm_active_enums::MatrixConcept as DbMatrixConcept,
};

/// Error types for override repository operations.
#[derive(Debug, thiserror::Error)]
pub enum OverrideRepositoryError {
    /// Invalid cell key.
    #[error(transparent)]
    Domain(#[from] MatrixError),

    /// Budget not found.
    #[error("Budget not found: {0}")]
    BudgetNotFound(BudgetId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<OverrideRepositoryError> for AppError {
    fn from(err: OverrideRepositoryError) -> Self {
        let message = err.to_string();
        match err {
            OverrideRepositoryError::Domain(e) => e.into(),
            OverrideRepositoryError::BudgetNotFound(_) => Self::NotFound(message),
            OverrideRepositoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<MatrixConcept> for DbMatrixConcept {
    fn from(concept: MatrixConcept) -> Self {
        match concept {
            MatrixConcept::MonthlyExpense => Self::MonthlyExpense,
            MatrixConcept::PartialProgress => Self::PartialProgress,
            MatrixConcept::CumulativeProgress => Self::CumulativeProgress,
            MatrixConcept::Disbursement => Self::Disbursement,
            MatrixConcept::CumulativeInvestment => Self::CumulativeInvestment,
            MatrixConcept::PaymentDate => Self::PaymentDate,
        }
    }
}

impl From<DbMatrixConcept> for MatrixConcept {
    fn from(concept: DbMatrixConcept) -> Self {
        match concept {
            DbMatrixConcept::MonthlyExpense => Self::MonthlyExpense,
            DbMatrixConcept::PartialProgress => Self::PartialProgress,
            DbMatrixConcept::CumulativeProgress => Self::CumulativeProgress,
            DbMatrixConcept::Disbursement => Self::Disbursement,
            DbMatrixConcept::CumulativeInvestment => Self::CumulativeInvestment,
            DbMatrixConcept::PaymentDate => Self::PaymentDate,
        }
    }
}

/// Matrix override repository.
#[derive(Debug, Clone)]
pub struct MatrixOverrideRepository {
    db: DatabaseConnection,
}

impl MatrixOverrideRepository {
    /// Creates a new override repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Saves the literal `value` as the override of a cell, replacing any
    /// previous override of the same cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the month is invalid, the budget does not exist, or
    /// the upsert fails.
    pub async fn upsert_override(
        &self,
        budget_id: BudgetId,
        month: u32,
        concept: MatrixConcept,
        value: &str,
        updated_by: UserId,
    ) -> Result<OverrideRecord, OverrideRepositoryError> {
        let key = OverrideKey::new(month, concept)?;
        let month_column = month_to_db(key.month)?;
        self.ensure_budget(budget_id).await?;

        let now = Utc::now();
        let model = matrix_overrides::ActiveModel {
            id: Set(Uuid::now_v7()),
            budget_id: Set(budget_id.into_inner()),
            month: Set(month_column),
            concept: Set(key.concept.into()),
            value: Set(value.to_string()),
            updated_by: Set(updated_by.into_inner()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        matrix_overrides::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    matrix_overrides::Column::BudgetId,
                    matrix_overrides::Column::Month,
                    matrix_overrides::Column::Concept,
                ])
                .update_columns([
                    matrix_overrides::Column::Value,
                    matrix_overrides::Column::UpdatedBy,
                    matrix_overrides::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        debug!(budget_id = %budget_id, month, concept = %concept, "Override saved");

        Ok(OverrideRecord {
            month: key.month,
            concept: key.concept,
            value: value.to_string(),
        })
    }

    /// Removes the override of a cell. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the month is invalid or the delete fails.
    pub async fn delete_override(
        &self,
        budget_id: BudgetId,
        month: u32,
        concept: MatrixConcept,
    ) -> Result<bool, OverrideRepositoryError> {
        let key = OverrideKey::new(month, concept)?;
        let month_column = month_to_db(key.month)?;

        let result = matrix_overrides::Entity::delete_many()
            .filter(matrix_overrides::Column::BudgetId.eq(budget_id.into_inner()))
            .filter(matrix_overrides::Column::Month.eq(month_column))
            .filter(matrix_overrides::Column::Concept.eq(DbMatrixConcept::from(concept)))
            .exec(&self.db)
            .await?;

        debug!(
            budget_id = %budget_id,
            month,
            concept = %concept,
            deleted = result.rows_affected,
            "Override removed"
        );
        Ok(result.rows_affected > 0)
    }

    /// Lists the overrides of a budget ordered by month.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_overrides(
        &self,
        budget_id: BudgetId,
    ) -> Result<Vec<OverrideRecord>, OverrideRepositoryError> {
        let models = matrix_overrides::Entity::find()
            .filter(matrix_overrides::Column::BudgetId.eq(budget_id.into_inner()))
            .order_by_asc(matrix_overrides::Column::Month)
            .order_by_asc(matrix_overrides::Column::Concept)
            .all(&self.db)
            .await?;

        models
            .into_iter()
            .map(|model| record_from_model(model).map_err(Into::into))
            .collect()
    }

    /// Loads the overrides of a budget into an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn load_store(
        &self,
        budget_id: BudgetId,
    ) -> Result<OverrideStore, OverrideRepositoryError> {
        let records = self.list_overrides(budget_id).await?;
        Ok(OverrideStore::from_records(records)?)
    }

    async fn ensure_budget(&self, budget_id: BudgetId) -> Result<(), OverrideRepositoryError> {
        budgets::Entity::find_by_id(budget_id.into_inner())
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(OverrideRepositoryError::BudgetNotFound(budget_id))
    }
}

fn month_to_db(month: u32) -> Result<i32, MatrixError> {
    i32::try_from(month).map_err(|_| MatrixError::InvalidMonth(i64::from(month)))
}

fn record_from_model(model: matrix_overrides::Model) -> Result<OverrideRecord, MatrixError> {
    let month =
        u32::try_from(model.month).map_err(|_| MatrixError::InvalidMonth(i64::from(model.month)))?;
    Ok(OverrideRecord {
        month,
        concept: model.concept.into(),
        value: model.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concept_round_trips_through_db_enum() {
        for concept in MatrixConcept::ALL {
            let db: DbMatrixConcept = concept.into();
            assert_eq!(MatrixConcept::from(db), concept);
        }
    }

    #[test]
    fn test_record_from_model() {
        let now = Utc::now();
        let model = matrix_overrides::Model {
            id: Uuid::now_v7(),
            budget_id: Uuid::now_v7(),
            month: 7,
            concept: DbMatrixConcept::Disbursement,
            value: "$ 25,000".to_string(),
            updated_by: Uuid::now_v7(),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let record = record_from_model(model).unwrap();
        assert_eq!(record.month, 7);
        assert_eq!(record.concept, MatrixConcept::Disbursement);
        assert_eq!(record.value, "$ 25,000");
    }

    #[test]
    fn test_negative_stored_month_is_rejected() {
        let now = Utc::now();
        let model = matrix_overrides::Model {
            id: Uuid::now_v7(),
            budget_id: Uuid::now_v7(),
            month: -1,
            concept: DbMatrixConcept::MonthlyExpense,
            value: "1".to_string(),
            updated_by: Uuid::now_v7(),
            created_at: now.into(),
            updated_at: now.into(),
        };

        assert_eq!(
            record_from_model(model).unwrap_err(),
            MatrixError::InvalidMonth(-1)
        );
    }

    #[test]
    fn test_month_beyond_column_range_is_rejected() {
        assert_eq!(
            month_to_db(u32::MAX).unwrap_err(),
            MatrixError::InvalidMonth(i64::from(u32::MAX))
        );
        assert_eq!(month_to_db(12).unwrap(), 12);
    }

    #[test]
    fn test_budget_not_found_maps_to_404() {
        let err: AppError = OverrideRepositoryError::BudgetNotFound(BudgetId::new()).into();
        assert_eq!(err.status_code(), 404);
    }
}
