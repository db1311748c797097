//! Domain error taxonomy.
//!
//! Every variant maps to exactly one HTTP status and machine-readable code
//! in the API crate's `IntoResponse` impl. Validation and processing
//! variants carry a JSON `details` object that is surfaced verbatim in the
//! error envelope.

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A requested resource does not exist (maps to 404).
    #[error("{resource} with ID '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    /// Request-level validation failure (maps to 422).
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Uploaded-file validation failure (maps to 422).
    #[error("{message}")]
    FileValidation { message: String, details: Value },

    /// Credentials were presented but do not match (maps to 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credentials were missing or malformed (maps to 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unexpected failure while creating or running a request (maps to 500).
    #[error("{message}")]
    Processing { message: String, details: Value },

    /// A downstream dependency failed (maps to 502).
    #[error("External service '{service}' error: {message}")]
    ExternalService { service: String, message: String },

    /// Catch-all internal error (maps to 500, message sanitized).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Validation error with no extra details.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Value::Object(Default::default()),
        }
    }

    /// Validation error carrying a details object for the error envelope.
    pub fn validation_with(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    /// File validation error with no extra details.
    pub fn file_validation(message: impl Into<String>) -> Self {
        Self::FileValidation {
            message: message.into(),
            details: Value::Object(Default::default()),
        }
    }

    /// File validation error carrying a details object.
    pub fn file_validation_with(message: impl Into<String>, details: Value) -> Self {
        Self::FileValidation {
            message: message.into(),
            details,
        }
    }

    /// Processing error carrying a details object.
    pub fn processing(message: impl Into<String>, details: Value) -> Self {
        Self::Processing {
            message: message.into(),
            details,
        }
    }
}
