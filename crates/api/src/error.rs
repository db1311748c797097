use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use uuid::Uuid;

use docgen_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the uniform error envelope
/// `{"error": {"code", "message", "details", "error_id"}}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `docgen_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message (malformed multipart etc.).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Core(core) => match core {
                CoreError::NotFound { resource, id } => (
                    StatusCode::NOT_FOUND,
                    "RESOURCE_NOT_FOUND",
                    format!("{resource} with ID '{id}' not found"),
                    json!({"resource_type": resource, "resource_id": id}),
                ),
                CoreError::Validation { message, details } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_FAILED",
                    message,
                    details,
                ),
                CoreError::FileValidation { message, details } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "FILE_VALIDATION_FAILED",
                    message,
                    details,
                ),
                CoreError::Unauthorized(message) => (
                    StatusCode::UNAUTHORIZED,
                    "AUTH_FAILED",
                    message,
                    Value::Object(Default::default()),
                ),
                CoreError::Forbidden(message) => (
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    message,
                    Value::Object(Default::default()),
                ),
                CoreError::Processing { message, details } => {
                    tracing::error!(error = %message, "Processing error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "PROCESSING_FAILED",
                        message,
                        details,
                    )
                }
                CoreError::ExternalService { service, message } => {
                    tracing::error!(service = %service, error = %message, "External service error");
                    (
                        StatusCode::BAD_GATEWAY,
                        "EXTERNAL_SERVICE_ERROR",
                        format!("External service '{service}' error"),
                        json!({"service": service}),
                    )
                }
                CoreError::Internal(message) => {
                    tracing::error!(error = %message, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                        Value::Object(Default::default()),
                    )
                }
            },

            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                message,
                Value::Object(Default::default()),
            ),
            AppError::InternalError(message) => {
                tracing::error!(error = %message, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    Value::Object(Default::default()),
                )
            }
        };

        // Fresh correlation identifier, attached to the body, the response
        // headers, and the log line so a client report can be matched to
        // server logs.
        let error_id = Uuid::new_v4().to_string();
        tracing::debug!(error_id = %error_id, code, status = %status, "Returning error response");

        let body = json!({
            "error": {
                "code": code,
                "message": message,
                "details": details,
                "error_id": error_id.clone(),
            }
        });

        (status, [("x-error-id", error_id)], axum::Json(body)).into_response()
    }
}
