//! Server-Sent Events endpoint for live generation progress.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use futures::{Stream, StreamExt};

use docgen_core::error::CoreError;
use docgen_core::types::RequestId;
use docgen_events::StreamEvent;

use crate::error::AppResult;
use crate::middleware::auth::RequireAuth;
use crate::state::AppState;

/// GET /api/v1/generate/{request_id}/stream
///
/// Persistent `text/event-stream` response pushing the request's lifecycle
/// events: `connected` handshake, `status` snapshot, `progress` per step,
/// `heartbeat` during silence, and a terminal `complete` or `error` that
/// closes the stream. Unknown IDs are rejected with 404 before any stream
/// bytes are sent.
pub async fn stream_generation_progress(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(request_id): Path<RequestId>,
) -> AppResult<impl IntoResponse> {
    let events = state.engine.subscribe(request_id).ok_or_else(|| {
        CoreError::NotFound {
            resource: "Generation request",
            id: request_id.to_string(),
        }
    })?;

    tracing::info!(request_id = %request_id, "Client connected to SSE stream");

    Ok((
        [
            ("cache-control", "no-cache, no-transform"),
            // Disable proxy (e.g. Nginx) buffering so events flush promptly.
            ("x-accel-buffering", "no"),
        ],
        Sse::new(into_sse(events)),
    ))
}

/// Map the engine's event stream onto the SSE wire format:
/// `event: <kind>\ndata: <JSON>\n\n`.
fn into_sse(
    events: impl Stream<Item = StreamEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    events.map(|event| {
        let kind = event.kind();
        let sse_event = match Event::default().event(kind).json_data(&event) {
            Ok(ev) => ev,
            Err(e) => {
                tracing::error!(kind, error = %e, "Failed to serialize stream event");
                Event::default().event(kind).data("{}")
            }
        };
        Ok(sse_event)
    })
}
