//! Handlers for document generation: upload acceptance and status polling.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use validator::Validate;

use docgen_core::error::CoreError;
use docgen_core::generation::{
    FileInfo, GenerateRequest, GenerationStatus, OutputFormat, UploadedFile,
};
use docgen_core::types::{RequestId, Timestamp};
use docgen_core::validation::{
    validate_file_count, validate_file_size, validate_total_size, validate_upload,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAuth;
use crate::state::AppState;

/// Response payload for an accepted generation request.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub request_id: RequestId,
    pub status: &'static str,
    pub stream_url: String,
    pub files_received: Vec<FileInfo>,
    pub created_at: Timestamp,
}

// ── Accept upload ────────────────────────────────────────────────────

/// POST /api/v1/generate
///
/// Accept a multipart upload (`description`, optional `output_format`, and
/// 1-10 `files` parts), validate everything, and schedule processing. The
/// response returns immediately with the request ID and the SSE stream URL;
/// the pipeline runs in the background.
pub async fn generate_document(
    State(state): State<AppState>,
    _auth: RequireAuth,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<GenerateResponse>)> {
    let mut description: Option<String> = None;
    let mut output_format = OutputFormat::default();
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("description") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                description = Some(text.trim().to_string());
            }
            Some("output_format") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                output_format = OutputFormat::parse(text.trim()).ok_or_else(|| {
                    CoreError::validation_with(
                        format!("Unsupported output format '{}'", text.trim()),
                        serde_json::json!({
                            "field": "output_format",
                            "allowed": ["markdown", "pdf", "docx"],
                        }),
                    )
                })?;
            }
            Some("files") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;

                validate_upload(&filename, content_type.as_deref(), &bytes)?;
                validate_file_size(bytes.len() as u64)?;

                files.push(UploadedFile {
                    filename,
                    content_type: content_type
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                    bytes: bytes.to_vec(),
                });
            }
            // Unknown fields are ignored rather than rejected.
            _ => {}
        }
    }

    let description = description.ok_or_else(|| {
        CoreError::validation_with(
            "A description of what to generate is required",
            serde_json::json!({"field": "description"}),
        )
    })?;

    let request = GenerateRequest {
        description,
        output_format,
    };
    request.validate().map_err(|e| {
        CoreError::validation_with(
            "Request validation failed",
            serde_json::json!({"validation_errors": e.to_string()}),
        )
    })?;

    validate_file_count(files.len())?;
    let total_size: u64 = files.iter().map(|f| f.bytes.len() as u64).sum();
    validate_total_size(total_size)?;

    tracing::info!(
        file_count = files.len(),
        total_size,
        description_length = request.description.len(),
        "Received generation request",
    );

    let (request_id, files_received) = state
        .engine
        .create_request(files, request.description, request.output_format)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateResponse {
            request_id,
            status: "accepted",
            stream_url: format!("/api/v1/generate/{request_id}/stream"),
            files_received,
            created_at: Utc::now(),
        }),
    ))
}

// ── Status poll ──────────────────────────────────────────────────────

/// GET /api/v1/generate/{request_id}/status
///
/// Synchronous read of the work item record, for clients that poll instead
/// of (or in addition to) consuming the event stream.
pub async fn get_generation_status(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(request_id): Path<RequestId>,
) -> AppResult<Json<GenerationStatus>> {
    let status = state.engine.status(&request_id).ok_or_else(|| {
        CoreError::NotFound {
            resource: "Generation request",
            id: request_id.to_string(),
        }
    })?;

    Ok(Json(status))
}
