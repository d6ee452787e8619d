//! Conversion of application errors into HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use obra_shared::AppError;
use serde_json::json;
use tracing::{debug, error};

/// Builds the `{ "error", "message" }` response for an error.
///
/// Database and internal errors are logged with `context` and answered with a
/// generic message.
pub fn error_response(err: impl Into<AppError>, context: &str) -> Response {
    let err = err.into();
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if err.is_client_facing() {
        debug!(error = %err, "{context}");
        err.to_string()
    } else {
        error!(error = %err, "{context}");
        "An error occurred".to_string()
    };

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": message
        })),
    )
        .into_response()
}

/// Response for a request body or path that failed validation.
pub fn validation_response(message: impl Into<String>) -> Response {
    error_response(AppError::Validation(message.into()), "Rejected request")
}
