//! Financial matrix routes: manual overrides and the resolved matrix.
//!
//! Wire fields keep the names used by the projection screens (`mes`,
//! `concepto`, `valor`); `concepto` accepts the projection key
//! (`gastoPorMes`) or the concept name (`monthly_expense`).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use obra_core::matrix::{ComputedMatrix, MatrixConcept, OverrideRecord, resolve};
use obra_db::MatrixOverrideRepository;
use obra_shared::types::BudgetId;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, error::error_response, middleware::AuthUser};

/// Creates the matrix routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/budgets/{budget_id}/overrides",
            get(list_overrides).put(save_override),
        )
        .route(
            "/budgets/{budget_id}/overrides/{mes}/{concepto}",
            delete(delete_override),
        )
        .route("/budgets/{budget_id}/matrix", post(resolve_matrix))
}

/// Request body for saving an override.
#[derive(Debug, Deserialize)]
pub struct SaveOverrideRequest {
    /// Month, starting at 1.
    pub mes: u32,
    /// Concept name or projection key.
    pub concepto: String,
    /// Literal value. Non-string JSON values are stored as their JSON text.
    pub valor: serde_json::Value,
}

/// One override as returned by the API.
#[derive(Debug, Serialize)]
pub struct OverrideResponse {
    /// Month, starting at 1.
    pub mes: u32,
    /// Projection key of the concept.
    pub concepto: &'static str,
    /// Literal value as saved.
    pub valor: String,
}

impl From<OverrideRecord> for OverrideResponse {
    fn from(record: OverrideRecord) -> Self {
        Self {
            mes: record.month,
            concepto: record.concept.projection_key(),
            valor: record.value,
        }
    }
}

fn literal(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}

async fn list_overrides(
    State(state): State<AppState>,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    let repo = MatrixOverrideRepository::new((*state.db).clone());

    match repo.list_overrides(budget_id).await {
        Ok(records) => {
            let overrides: Vec<OverrideResponse> = records.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "overrides": overrides }))).into_response()
        }
        Err(e) => error_response(e, "Failed to list overrides"),
    }
}

async fn save_override(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(budget_id): Path<BudgetId>,
    Json(payload): Json<SaveOverrideRequest>,
) -> Response {
    let concept: MatrixConcept = match payload.concepto.parse() {
        Ok(concept) => concept,
        Err(e) => return error_response(e, "Rejected override concept"),
    };

    let repo = MatrixOverrideRepository::new((*state.db).clone());
    let value = literal(payload.valor);
    match repo
        .upsert_override(budget_id, payload.mes, concept, &value, auth.user_id())
        .await
    {
        Ok(record) => (StatusCode::OK, Json(OverrideResponse::from(record))).into_response(),
        Err(e) => error_response(e, "Failed to save override"),
    }
}

async fn delete_override(
    State(state): State<AppState>,
    Path((budget_id, mes, concepto)): Path<(BudgetId, u32, String)>,
) -> Response {
    let concept: MatrixConcept = match concepto.parse() {
        Ok(concept) => concept,
        Err(e) => return error_response(e, "Rejected override concept"),
    };

    let repo = MatrixOverrideRepository::new((*state.db).clone());
    match repo.delete_override(budget_id, mes, concept).await {
        Ok(deleted) => (StatusCode::OK, Json(json!({ "deleted": deleted }))).into_response(),
        Err(e) => error_response(e, "Failed to delete override"),
    }
}

async fn resolve_matrix(
    State(state): State<AppState>,
    Path(budget_id): Path<BudgetId>,
    Json(computed): Json<ComputedMatrix>,
) -> Response {
    let repo = MatrixOverrideRepository::new((*state.db).clone());

    match repo.load_store(budget_id).await {
        Ok(store) => (StatusCode::OK, Json(resolve(&computed, &store))).into_response(),
        Err(e) => error_response(e, "Failed to resolve matrix"),
    }
}
