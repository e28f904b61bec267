use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use roadpulse_core::error::CoreError;
use roadpulse_db::store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for persistence
/// failures. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `roadpulse_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A persistence error from the incident store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Store errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - `NotFound` maps to 404.
/// - Rejected lifecycle transitions map to 409.
/// - Backend unavailability and write timeouts map to 503 -- the direct
///   channel's callers own their retry policy and need to see the failure.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Incident {id} not found"),
        ),
        StoreError::InvalidTransition { from, to } => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Cannot move incident status from {from} to {to}"),
        ),
        StoreError::Unavailable(detail) => {
            tracing::error!(error = %detail, "Incident store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_UNAVAILABLE",
                "Incident storage is unavailable".to_string(),
            )
        }
        StoreError::Timeout => {
            tracing::error!("Incident store write timed out");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_TIMEOUT",
                "Incident storage timed out".to_string(),
            )
        }
    }
}
