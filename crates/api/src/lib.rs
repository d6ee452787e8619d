//! HTTP surface of Obra.
//!
//! Every route lives under `/api/v1`. Only `/health` is public; the budget,
//! matrix and schedule routes sit behind [`middleware::auth_middleware`].
//! Failures are answered as `{ "error": <code>, "message": <text> }` by
//! [`error::error_response`].

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use obra_shared::JwtService;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Connection pool; repositories clone it per request.
    pub db: Arc<DatabaseConnection>,
    /// Validates bearer tokens.
    pub jwt_service: Arc<JwtService>,
}

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
