//! Health check endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the database does not answer.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// `up` or `unavailable`.
    pub database: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database) = match state.db.ping().await {
        Ok(()) => ("healthy", "up"),
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            ("degraded", "unavailable")
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
