//! Budget routes: CRUD, line groups, line items and duplication.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use obra_core::budget::{
    BudgetAggregate, BudgetStatus, CreateBudgetInput, CreateLineGroupInput, CreateLineItemInput,
    DuplicateBudgetOptions, LineGroup,
};
use obra_db::BudgetRepository;
use obra_shared::types::{
    BudgetId, ClassificationPartidaId, ClientId, LineGroupId, MayorId, ProjectId,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{
    AppState,
    error::{error_response, validation_response},
    middleware::AuthUser,
};

/// Creates the budget routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route("/budgets/{budget_id}", get(get_budget))
        .route("/budgets/{budget_id}/status", put(set_status))
        .route("/budgets/{budget_id}/line-groups", post(create_line_group))
        .route("/budgets/{budget_id}/duplicate", post(duplicate_budget))
        .route("/line-groups/{group_id}/line-items", post(create_line_item))
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing budgets.
#[derive(Debug, Deserialize)]
pub struct ListBudgetsQuery {
    /// Only budgets of this project.
    pub project_id: Option<ProjectId>,
}

/// Request body for creating a budget.
#[derive(Debug, Deserialize)]
pub struct CreateBudgetRequest {
    /// Owning project.
    pub project_id: ProjectId,
    /// Owning client.
    pub client_id: ClientId,
    /// Budget name.
    pub name: String,
    /// Free-form settings; an empty object when omitted.
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

/// Request body for changing the status of a budget.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// `draft`, `active` or `archived`.
    pub status: String,
}

/// Request body for creating a line group.
#[derive(Debug, Deserialize)]
pub struct CreateLineGroupRequest {
    /// Display name.
    pub name: String,
    /// Position within the budget.
    pub order_index: i32,
    /// Notes.
    pub notes: Option<String>,
    /// Fee percentage override.
    pub fee_pct_override: Option<Decimal>,
    /// Waste percentage override.
    pub waste_pct_override: Option<Decimal>,
    /// Classification group; requires `partida_id`.
    pub mayor_id: Option<MayorId>,
    /// Classification subgroup; requires `mayor_id`.
    pub partida_id: Option<ClassificationPartidaId>,
}

/// Request body for creating a line item.
#[derive(Debug, Deserialize)]
pub struct CreateLineItemRequest {
    /// Catalog code.
    pub code: Option<String>,
    /// Short description.
    pub short_description: String,
    /// Long description.
    pub long_description: Option<String>,
    /// Unit of measure.
    pub unit: Option<String>,
    /// Provider name.
    pub provider: Option<String>,
    /// Real quantity.
    #[serde(default)]
    pub real_quantity: Decimal,
    /// Waste percentage.
    #[serde(default)]
    pub waste_pct: Decimal,
    /// Provisioned quantity.
    #[serde(default)]
    pub quantity: Decimal,
    /// Real unit price.
    #[serde(default)]
    pub real_price: Decimal,
    /// Fee percentage.
    #[serde(default)]
    pub fee_pct: Decimal,
    /// Provisioned unit price.
    #[serde(default)]
    pub unit_price: Decimal,
    /// Position within the group.
    #[serde(default)]
    pub order_index: i32,
}

/// Request body for duplicating a budget.
#[derive(Debug, Deserialize)]
pub struct DuplicateBudgetRequest {
    /// Name of the copy.
    pub new_name: String,
    /// Keep quantities and waste percentages.
    #[serde(default)]
    pub preserve_quantities: bool,
    /// Keep prices and fee percentages.
    #[serde(default)]
    pub preserve_prices: bool,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_budgets(
    State(state): State<AppState>,
    Query(query): Query<ListBudgetsQuery>,
) -> Response {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.list_budgets(query.project_id).await {
        Ok(budgets) => (StatusCode::OK, Json(json!({ "budgets": budgets }))).into_response(),
        Err(e) => error_response(e, "Failed to list budgets"),
    }
}

async fn create_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateBudgetRequest>,
) -> Response {
    let repo = BudgetRepository::new((*state.db).clone());

    let input = CreateBudgetInput {
        project_id: payload.project_id,
        client_id: payload.client_id,
        name: payload.name,
        settings: payload.settings.unwrap_or_else(|| json!({})),
        created_by: auth.user_id(),
    };

    match repo.create_budget(input).await {
        Ok(budget) => {
            info!(budget_id = %budget.id, project_id = %budget.project_id, "Budget created");
            (StatusCode::CREATED, Json(budget)).into_response()
        }
        Err(e) => error_response(e, "Failed to create budget"),
    }
}

async fn get_budget(State(state): State<AppState>, Path(budget_id): Path<BudgetId>) -> Response {
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.get_aggregate(budget_id).await {
        Ok(aggregate) => (StatusCode::OK, Json(aggregate_json(&aggregate))).into_response(),
        Err(e) => error_response(e, "Failed to load budget"),
    }
}

async fn set_status(
    State(state): State<AppState>,
    Path(budget_id): Path<BudgetId>,
    Json(payload): Json<SetStatusRequest>,
) -> Response {
    let status: BudgetStatus = match payload.status.parse() {
        Ok(status) => status,
        Err(e) => return error_response(e, "Rejected budget status"),
    };

    let repo = BudgetRepository::new((*state.db).clone());
    match repo.set_budget_status(budget_id, status).await {
        Ok(budget) => (StatusCode::OK, Json(budget)).into_response(),
        Err(e) => error_response(e, "Failed to change budget status"),
    }
}

async fn create_line_group(
    State(state): State<AppState>,
    Path(budget_id): Path<BudgetId>,
    Json(payload): Json<CreateLineGroupRequest>,
) -> Response {
    let classification = match (payload.mayor_id, payload.partida_id) {
        (Some(mayor_id), Some(partida_id)) => Some((mayor_id, partida_id)),
        (None, None) => None,
        _ => {
            return validation_response("mayor_id and partida_id must be given together");
        }
    };

    let input = CreateLineGroupInput {
        name: payload.name,
        order_index: payload.order_index,
        notes: payload.notes,
        fee_pct_override: payload.fee_pct_override,
        waste_pct_override: payload.waste_pct_override,
        classification,
    };

    let repo = BudgetRepository::new((*state.db).clone());
    match repo.create_line_group(budget_id, input).await {
        Ok((group, mapping)) => (
            StatusCode::CREATED,
            Json(json!({ "group": group, "classification": mapping })),
        )
            .into_response(),
        Err(e) => error_response(e, "Failed to create line group"),
    }
}

async fn create_line_item(
    State(state): State<AppState>,
    Path(group_id): Path<LineGroupId>,
    Json(payload): Json<CreateLineItemRequest>,
) -> Response {
    let input = CreateLineItemInput {
        code: payload.code,
        short_description: payload.short_description,
        long_description: payload.long_description,
        unit: payload.unit,
        provider: payload.provider,
        real_quantity: payload.real_quantity,
        waste_pct: payload.waste_pct,
        quantity: payload.quantity,
        real_price: payload.real_price,
        fee_pct: payload.fee_pct,
        unit_price: payload.unit_price,
        order_index: payload.order_index,
    };

    let repo = BudgetRepository::new((*state.db).clone());
    match repo.create_line_item(group_id, input).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => error_response(e, "Failed to create line item"),
    }
}

async fn duplicate_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
    Json(payload): Json<DuplicateBudgetRequest>,
) -> Response {
    let options = DuplicateBudgetOptions {
        new_name: payload.new_name,
        preserve_quantities: payload.preserve_quantities,
        preserve_prices: payload.preserve_prices,
    };

    let repo = BudgetRepository::new((*state.db).clone());
    match repo
        .duplicate_budget(budget_id, &options, auth.user_id())
        .await
    {
        Ok(new_id) => (StatusCode::CREATED, Json(json!({ "id": new_id }))).into_response(),
        Err(e) => error_response(e, "Failed to duplicate budget"),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn group_json(aggregate: &BudgetAggregate, group: &LineGroup) -> serde_json::Value {
    let classification = aggregate
        .mappings
        .iter()
        .find(|mapping| mapping.line_group_id == group.id);

    json!({
        "id": group.id,
        "name": group.name,
        "order_index": group.order_index,
        "is_active": group.is_active,
        "notes": group.notes,
        "fee_pct_override": group.fee_pct_override,
        "waste_pct_override": group.waste_pct_override,
        "classification": classification,
        "items": aggregate.items_of(group.id),
    })
}

fn aggregate_json(aggregate: &BudgetAggregate) -> serde_json::Value {
    let mut groups: Vec<&LineGroup> = aggregate.groups.iter().collect();
    groups.sort_by_key(|group| group.order_index);

    json!({
        "budget": aggregate.budget,
        "groups": groups
            .into_iter()
            .map(|group| group_json(aggregate, group))
            .collect::<Vec<_>>(),
        "total": aggregate.grand_total(),
    })
}
