//! Budget repository for the budget aggregate and its duplication.

use chrono::{DateTime, Utc};
use obra_core::budget::{
    Budget, BudgetAggregate, BudgetError, BudgetStatus, ClassificationMapping, CreateBudgetInput,
    CreateLineGroupInput, CreateLineItemInput, DuplicateBudgetOptions, DuplicationPlan,
    DuplicationPlanner, LineGroup, LineItem, validate_name,
};
use obra_shared::AppError;
use obra_shared::types::{
    BudgetId, ClassificationPartidaId, ClientId, LineGroupId, LineItemId, MayorId, ProjectId,
    UserId,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{
    budgets, classification_mappings, line_groups, line_items,
    sea_orm_active_enums::BudgetStatus as DbBudgetStatus,
};

/// Error types for budget repository operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetRepositoryError {
    /// Domain rule violated.
    #[error(transparent)]
    Domain(#[from] BudgetError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BudgetRepositoryError> for AppError {
    fn from(err: BudgetRepositoryError) -> Self {
        match err {
            BudgetRepositoryError::Domain(e) => e.into(),
            BudgetRepositoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<BudgetStatus> for DbBudgetStatus {
    fn from(status: BudgetStatus) -> Self {
        match status {
            BudgetStatus::Draft => Self::Draft,
            BudgetStatus::Active => Self::Active,
            BudgetStatus::Archived => Self::Archived,
        }
    }
}

impl From<DbBudgetStatus> for BudgetStatus {
    fn from(status: DbBudgetStatus) -> Self {
        match status {
            DbBudgetStatus::Draft => Self::Draft,
            DbBudgetStatus::Active => Self::Active,
            DbBudgetStatus::Archived => Self::Archived,
        }
    }
}

/// Budget repository.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Budget CRUD
    // ========================================================================

    /// Creates a draft budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the database operation fails.
    pub async fn create_budget(
        &self,
        input: CreateBudgetInput,
    ) -> Result<Budget, BudgetRepositoryError> {
        validate_name(&input.name)?;

        let now = Utc::now();
        let budget = Budget {
            id: BudgetId::new(),
            project_id: input.project_id,
            client_id: input.client_id,
            name: input.name.trim().to_string(),
            status: BudgetStatus::Draft,
            settings: input.settings,
            created_by: input.created_by,
            created_at: now,
            updated_at: now,
        };

        let model = budget_active_model(&budget).insert(&self.db).await?;
        Ok(budget_from_model(model))
    }

    /// Gets a budget by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the budget is not found or the query fails.
    pub async fn get_budget(&self, budget_id: BudgetId) -> Result<Budget, BudgetRepositoryError> {
        find_budget(&self.db, budget_id).await.map(budget_from_model)
    }

    /// Lists budgets, newest first, optionally limited to one project.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_budgets(
        &self,
        project_id: Option<ProjectId>,
    ) -> Result<Vec<Budget>, BudgetRepositoryError> {
        let mut query = budgets::Entity::find();
        if let Some(project_id) = project_id {
            query = query.filter(budgets::Column::ProjectId.eq(project_id.into_inner()));
        }

        let models = query
            .order_by_desc(budgets::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(budget_from_model).collect())
    }

    /// Loads a budget with all of its groups, items and mappings.
    ///
    /// Inactive rows are included; callers filter as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the budget is not found or a query fails.
    pub async fn get_aggregate(
        &self,
        budget_id: BudgetId,
    ) -> Result<BudgetAggregate, BudgetRepositoryError> {
        load_aggregate(&self.db, budget_id, false).await
    }

    /// Changes the status of a budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the budget is not found or the update fails.
    pub async fn set_budget_status(
        &self,
        budget_id: BudgetId,
        status: BudgetStatus,
    ) -> Result<Budget, BudgetRepositoryError> {
        let model = find_budget(&self.db, budget_id).await?;

        let mut active: budgets::ActiveModel = model.into();
        active.status = Set(status.into());
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        debug!(budget_id = %budget_id, status = %status, "Budget status changed");
        Ok(budget_from_model(updated))
    }

    /// Deletes a budget. Groups, items, mappings and overrides go with it
    /// through cascading foreign keys. Returns whether a budget was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_budget(&self, budget_id: BudgetId) -> Result<bool, BudgetRepositoryError> {
        let result = budgets::Entity::delete_by_id(budget_id.into_inner())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Line groups and items
    // ========================================================================

    /// Creates a line group, and its classification mapping when one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input is invalid
    /// - The budget does not exist
    /// - Another group of the budget already uses `order_index`
    /// - Database operation fails
    pub async fn create_line_group(
        &self,
        budget_id: BudgetId,
        input: CreateLineGroupInput,
    ) -> Result<(LineGroup, Option<ClassificationMapping>), BudgetRepositoryError> {
        input.validate()?;
        find_budget(&self.db, budget_id).await?;

        let order_taken = line_groups::Entity::find()
            .filter(line_groups::Column::BudgetId.eq(budget_id.into_inner()))
            .filter(line_groups::Column::OrderIndex.eq(input.order_index))
            .one(&self.db)
            .await?
            .is_some();
        if order_taken {
            return Err(BudgetError::DuplicateOrderIndex {
                budget_id,
                order_index: input.order_index,
            }
            .into());
        }

        let group = LineGroup {
            id: LineGroupId::new(),
            budget_id,
            name: input.name.trim().to_string(),
            order_index: input.order_index,
            is_active: true,
            notes: input.notes,
            fee_pct_override: input.fee_pct_override,
            waste_pct_override: input.waste_pct_override,
        };
        let mapping = input
            .classification
            .map(|(mayor_id, partida_id)| ClassificationMapping {
                budget_id,
                line_group_id: group.id,
                mayor_id,
                partida_id,
            });

        let now = Utc::now();
        let txn = self.db.begin().await?;
        line_group_active_model(&group, now)
            .insert(&txn)
            .await
            .map_err(|e| order_conflict(e, budget_id, group.order_index))?;
        if let Some(mapping) = &mapping {
            mapping_active_model(mapping, now).insert(&txn).await?;
        }
        txn.commit().await?;

        Ok((group, mapping))
    }

    /// Creates a line item with totals computed from quantities and prices.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid, the group does not exist, or
    /// the insert fails.
    pub async fn create_line_item(
        &self,
        line_group_id: LineGroupId,
        input: CreateLineItemInput,
    ) -> Result<LineItem, BudgetRepositoryError> {
        let item = input.into_line_item(LineItemId::new(), line_group_id)?;

        line_groups::Entity::find_by_id(line_group_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(BudgetError::LineGroupNotFound(line_group_id))?;

        line_item_active_model(&item, Utc::now())
            .insert(&self.db)
            .await?;
        Ok(item)
    }

    // ========================================================================
    // Duplication
    // ========================================================================

    /// Duplicates a budget with its active groups, their mappings and their
    /// active items. Returns the ID of the new draft budget.
    ///
    /// All rows are written in one transaction; on any failure nothing of the
    /// copy remains.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `options.new_name` is blank (checked before any query)
    /// - The source budget does not exist
    /// - Database operation fails
    pub async fn duplicate_budget(
        &self,
        source_budget_id: BudgetId,
        options: &DuplicateBudgetOptions,
        created_by: UserId,
    ) -> Result<BudgetId, BudgetRepositoryError> {
        options.validate()?;

        let source = load_aggregate(&self.db, source_budget_id, true).await?;
        let plan = DuplicationPlanner::plan(&source, options, created_by, Utc::now())?;

        self.apply_plan(&plan).await?;

        info!(
            source_budget_id = %source_budget_id,
            new_budget_id = %plan.new_budget_id(),
            groups = plan.groups.len(),
            mappings = plan.mappings.len(),
            items = plan.items.len(),
            skipped_items = plan.skipped_items,
            "Budget duplicated"
        );

        Ok(plan.new_budget_id())
    }

    /// Writes every row of a duplication plan in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; the transaction is then rolled
    /// back and none of the plan's rows exist.
    pub async fn apply_plan(&self, plan: &DuplicationPlan) -> Result<(), BudgetRepositoryError> {
        let txn = self.db.begin().await?;
        insert_plan(&txn, plan).await?;
        txn.commit().await?;
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_budget<C: ConnectionTrait>(
    db: &C,
    budget_id: BudgetId,
) -> Result<budgets::Model, BudgetRepositoryError> {
    budgets::Entity::find_by_id(budget_id.into_inner())
        .one(db)
        .await?
        .ok_or_else(|| BudgetError::NotFound(budget_id).into())
}

/// Reads a budget aggregate. With `active_only` the inactive groups and items
/// are left out, which is the snapshot duplication works on.
async fn load_aggregate<C: ConnectionTrait>(
    db: &C,
    budget_id: BudgetId,
    active_only: bool,
) -> Result<BudgetAggregate, BudgetRepositoryError> {
    let budget = find_budget(db, budget_id).await?;

    let mut group_query =
        line_groups::Entity::find().filter(line_groups::Column::BudgetId.eq(budget.id));
    if active_only {
        group_query = group_query.filter(line_groups::Column::IsActive.eq(true));
    }
    let groups = group_query
        .order_by_asc(line_groups::Column::OrderIndex)
        .all(db)
        .await?;

    let group_ids: Vec<Uuid> = groups.iter().map(|g| g.id).collect();

    let (items, mappings) = if group_ids.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let mut item_query = line_items::Entity::find()
            .filter(line_items::Column::LineGroupId.is_in(group_ids.clone()));
        if active_only {
            item_query = item_query.filter(line_items::Column::IsActive.eq(true));
        }
        let items = item_query
            .order_by_asc(line_items::Column::OrderIndex)
            .all(db)
            .await?;

        let mappings = classification_mappings::Entity::find()
            .filter(classification_mappings::Column::LineGroupId.is_in(group_ids))
            .all(db)
            .await?;

        (items, mappings)
    };

    Ok(BudgetAggregate {
        budget: budget_from_model(budget),
        groups: groups.into_iter().map(line_group_from_model).collect(),
        items: items.into_iter().map(line_item_from_model).collect(),
        mappings: mappings.into_iter().map(mapping_from_model).collect(),
    })
}

/// Writes a duplication plan. Groups go in before the rows that reference them.
async fn insert_plan<C: ConnectionTrait>(txn: &C, plan: &DuplicationPlan) -> Result<(), DbErr> {
    let now = plan.budget.created_at;

    budget_active_model(&plan.budget).insert(txn).await?;

    if !plan.groups.is_empty() {
        line_groups::Entity::insert_many(
            plan.groups
                .iter()
                .map(|group| line_group_active_model(group, now)),
        )
        .exec(txn)
        .await?;
    }

    if !plan.mappings.is_empty() {
        classification_mappings::Entity::insert_many(
            plan.mappings
                .iter()
                .map(|mapping| mapping_active_model(mapping, now)),
        )
        .exec(txn)
        .await?;
    }

    if !plan.items.is_empty() {
        line_items::Entity::insert_many(
            plan.items
                .iter()
                .map(|item| line_item_active_model(item, now)),
        )
        .exec(txn)
        .await?;
    }

    Ok(())
}

fn order_conflict(err: DbErr, budget_id: BudgetId, order_index: i32) -> BudgetRepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => BudgetError::DuplicateOrderIndex {
            budget_id,
            order_index,
        }
        .into(),
        _ => err.into(),
    }
}

// ============================================================================
// Model conversions
// ============================================================================

fn utc(at: sea_orm::prelude::DateTimeWithTimeZone) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

pub(crate) fn budget_from_model(model: budgets::Model) -> Budget {
    Budget {
        id: BudgetId::from_uuid(model.id),
        project_id: ProjectId::from_uuid(model.project_id),
        client_id: ClientId::from_uuid(model.client_id),
        name: model.name,
        status: model.status.into(),
        settings: model.settings,
        created_by: UserId::from_uuid(model.created_by),
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    }
}

pub(crate) fn line_group_from_model(model: line_groups::Model) -> LineGroup {
    LineGroup {
        id: LineGroupId::from_uuid(model.id),
        budget_id: BudgetId::from_uuid(model.budget_id),
        name: model.name,
        order_index: model.order_index,
        is_active: model.is_active,
        notes: model.notes,
        fee_pct_override: model.fee_pct_override,
        waste_pct_override: model.waste_pct_override,
    }
}

pub(crate) fn line_item_from_model(model: line_items::Model) -> LineItem {
    LineItem {
        id: LineItemId::from_uuid(model.id),
        line_group_id: LineGroupId::from_uuid(model.line_group_id),
        code: model.code,
        short_description: model.short_description,
        long_description: model.long_description,
        unit: model.unit,
        provider: model.provider,
        real_quantity: model.real_quantity,
        waste_pct: model.waste_pct,
        quantity: model.quantity,
        real_price: model.real_price,
        fee_pct: model.fee_pct,
        unit_price: model.unit_price,
        real_total: model.real_total,
        total: model.total,
        order_index: model.order_index,
        is_active: model.is_active,
    }
}

pub(crate) fn mapping_from_model(model: classification_mappings::Model) -> ClassificationMapping {
    ClassificationMapping {
        budget_id: BudgetId::from_uuid(model.budget_id),
        line_group_id: LineGroupId::from_uuid(model.line_group_id),
        mayor_id: MayorId::from_uuid(model.mayor_id),
        partida_id: ClassificationPartidaId::from_uuid(model.partida_id),
    }
}

fn budget_active_model(budget: &Budget) -> budgets::ActiveModel {
    budgets::ActiveModel {
        id: Set(budget.id.into_inner()),
        project_id: Set(budget.project_id.into_inner()),
        client_id: Set(budget.client_id.into_inner()),
        name: Set(budget.name.clone()),
        status: Set(budget.status.into()),
        settings: Set(budget.settings.clone()),
        created_by: Set(budget.created_by.into_inner()),
        created_at: Set(budget.created_at.into()),
        updated_at: Set(budget.updated_at.into()),
    }
}

fn line_group_active_model(group: &LineGroup, now: DateTime<Utc>) -> line_groups::ActiveModel {
    line_groups::ActiveModel {
        id: Set(group.id.into_inner()),
        budget_id: Set(group.budget_id.into_inner()),
        name: Set(group.name.clone()),
        order_index: Set(group.order_index),
        is_active: Set(group.is_active),
        notes: Set(group.notes.clone()),
        fee_pct_override: Set(group.fee_pct_override),
        waste_pct_override: Set(group.waste_pct_override),
        created_at: Set(now.into()),
    }
}

fn line_item_active_model(item: &LineItem, now: DateTime<Utc>) -> line_items::ActiveModel {
    line_items::ActiveModel {
        id: Set(item.id.into_inner()),
        line_group_id: Set(item.line_group_id.into_inner()),
        code: Set(item.code.clone()),
        short_description: Set(item.short_description.clone()),
        long_description: Set(item.long_description.clone()),
        unit: Set(item.unit.clone()),
        provider: Set(item.provider.clone()),
        real_quantity: Set(item.real_quantity),
        waste_pct: Set(item.waste_pct),
        quantity: Set(item.quantity),
        real_price: Set(item.real_price),
        fee_pct: Set(item.fee_pct),
        unit_price: Set(item.unit_price),
        real_total: Set(item.real_total),
        total: Set(item.total),
        order_index: Set(item.order_index),
        is_active: Set(item.is_active),
        created_at: Set(now.into()),
    }
}

fn mapping_active_model(
    mapping: &ClassificationMapping,
    now: DateTime<Utc>,
) -> classification_mappings::ActiveModel {
    classification_mappings::ActiveModel {
        id: Set(Uuid::now_v7()),
        budget_id: Set(mapping.budget_id.into_inner()),
        line_group_id: Set(mapping.line_group_id.into_inner()),
        mayor_id: Set(mapping.mayor_id.into_inner()),
        partida_id: Set(mapping.partida_id.into_inner()),
        created_at: Set(now.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_round_trips_through_db_enum() {
        for status in [
            BudgetStatus::Draft,
            BudgetStatus::Active,
            BudgetStatus::Archived,
        ] {
            let db: DbBudgetStatus = status.into();
            assert_eq!(BudgetStatus::from(db), status);
        }
    }

    #[test]
    fn test_line_item_model_conversion_keeps_amounts() {
        let now = Utc::now();
        let model = line_items::Model {
            id: Uuid::now_v7(),
            line_group_id: Uuid::now_v7(),
            code: Some("ALB-001".to_string()),
            short_description: "Muro de block".to_string(),
            long_description: None,
            unit: Some("m2".to_string()),
            provider: None,
            real_quantity: dec!(12.5),
            waste_pct: dec!(3),
            quantity: dec!(12),
            real_price: dec!(410),
            fee_pct: dec!(8),
            unit_price: dec!(400),
            real_total: dec!(5125),
            total: dec!(4800),
            order_index: 2,
            is_active: true,
            created_at: now.into(),
        };

        let item = line_item_from_model(model.clone());
        assert_eq!(item.id.into_inner(), model.id);
        assert_eq!(item.total, dec!(4800));
        assert_eq!(item.real_total, dec!(5125));
        assert_eq!(item.order_index, 2);

        let active = line_item_active_model(&item, now);
        assert_eq!(active.unit_price, Set(dec!(400)));
        assert_eq!(active.line_group_id, Set(model.line_group_id));
    }

    #[test]
    fn test_budget_model_conversion() {
        let now = Utc::now();
        let model = budgets::Model {
            id: Uuid::now_v7(),
            project_id: Uuid::now_v7(),
            client_id: Uuid::now_v7(),
            name: "Casa A".to_string(),
            status: DbBudgetStatus::Active,
            settings: serde_json::json!({ "iva": "16" }),
            created_by: Uuid::now_v7(),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let budget = budget_from_model(model.clone());
        assert_eq!(budget.status, BudgetStatus::Active);
        assert_eq!(budget.settings["iva"], "16");
        assert_eq!(budget.created_at, now);

        let active = budget_active_model(&budget);
        assert_eq!(active.status, Set(DbBudgetStatus::Active));
        assert_eq!(active.project_id, Set(model.project_id));
    }

    #[test]
    fn test_domain_error_maps_to_app_error() {
        let err: AppError = BudgetRepositoryError::Domain(BudgetError::EmptyName).into();
        assert_eq!(err.status_code(), 400);

        let err: AppError =
            BudgetRepositoryError::Domain(BudgetError::NotFound(BudgetId::new())).into();
        assert_eq!(err.status_code(), 404);

        let err: AppError =
            BudgetRepositoryError::Database(DbErr::Custom("boom".to_string())).into();
        assert_eq!(err.status_code(), 500);
    }
}
