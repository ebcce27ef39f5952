use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gatehouse_core::error::CoreError;
use gatehouse_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for persistence
/// failures. Implements [`IntoResponse`] so only a coarse category ever reaches
/// the client; internal causes go to the log.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `gatehouse_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A credential store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// The single response used for every failed login or missing session.
    pub fn unauthorized() -> Self {
        AppError::Core(CoreError::Unauthorized("Authentication required".into()))
    }

    pub fn forbidden() -> Self {
        AppError::Core(CoreError::Forbidden("Access denied".into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            AppError::Store(err) => classify_store_error(err),

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - Uniqueness conflicts map to 409 (the constraint name is not echoed).
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Conflict(detail) => {
            tracing::debug!(detail = %detail, "Store conflict");
            (
                StatusCode::CONFLICT,
                "CONFLICT",
                "Resource already exists".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Credential store failure");
            internal()
        }
    }
}
