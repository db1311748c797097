use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use docgen_core::validation::MAX_TOTAL_SIZE_BYTES;

use crate::handlers;
use crate::state::AppState;

/// Headroom above the aggregate upload cap for multipart framing and the
/// non-file form fields.
const BODY_LIMIT_SLACK_BYTES: usize = 1024 * 1024;

/// Mount the generation routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::generate::generate_document))
        .route(
            "/generate/{request_id}/status",
            get(handlers::generate::get_generation_status),
        )
        .route(
            "/generate/{request_id}/stream",
            get(handlers::stream::stream_generation_progress),
        )
        // The aggregate size cap is enforced in the handler; this layer only
        // keeps axum's default 2MB body limit from rejecting legal uploads.
        .layer(DefaultBodyLimit::max(
            MAX_TOTAL_SIZE_BYTES as usize + BODY_LIMIT_SLACK_BYTES,
        ))
}
