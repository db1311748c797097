pub mod generate;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /generate                        accept upload (POST, auth)
/// /generate/{request_id}/status    status poll (GET, auth)
/// /generate/{request_id}/stream    SSE progress stream (GET, auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(generate::router())
}
