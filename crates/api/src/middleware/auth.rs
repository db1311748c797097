//! Shared-secret bearer authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};

use docgen_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Proof that the request carried the configured access password.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(_auth: RequireAuth) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
///
/// A missing or malformed `Authorization` header rejects with 403; a
/// well-formed bearer token that does not match the secret rejects with 401.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth;

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Forbidden("Missing Authorization header".into()))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        if !secrets_match(token, &state.config.access_password) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid authentication credentials".into(),
            )));
        }

        Ok(RequireAuth)
    }
}

/// Constant-time secret comparison.
///
/// Both sides are hashed and the fixed-length digests compared, so the time
/// taken does not depend on how many leading bytes of the guess match the
/// secret, nor on the secret's length.
fn secrets_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided == expected
}
