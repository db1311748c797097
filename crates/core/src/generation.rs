//! Generation request and status models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{RequestId, Timestamp};

/// Lifecycle state of a generation request.
///
/// There is no `pending` state: a request is `Processing` from the moment it
/// is accepted. Once a terminal state (`Completed` or `Failed`) is reached
/// it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Processing,
    Completed,
    Failed,
}

impl RequestStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Output format for the generated document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Pdf,
    Docx,
}

impl OutputFormat {
    /// Parse a form value. Returns `None` for anything outside the allowed set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "markdown" => Some(Self::Markdown),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

/// Metadata about one uploaded file, echoed back in the accept response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub content_type: String,
    /// File size in bytes.
    pub size: u64,
}

/// One multipart file part captured in memory by the boundary layer.
///
/// The staging area copies these bytes to disk; the original value stays
/// readable so the boundary layer can still compute sizes afterwards.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Build the response-facing metadata for this file.
    pub fn info(&self) -> FileInfo {
        FileInfo {
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
            size: self.bytes.len() as u64,
        }
    }
}

/// The non-file fields of a generation request.
#[derive(Debug, Clone, Validate)]
pub struct GenerateRequest {
    /// What to generate from the uploaded documents.
    #[validate(length(min = 1, max = 2000, message = "description must be 1-2000 characters"))]
    pub description: String,
    pub output_format: OutputFormat,
}

/// Authoritative progress record for one generation request (the work item).
///
/// `current_step` is monotonically non-decreasing and never exceeds
/// `total_steps`; `error` is set only when `status` is `failed`;
/// `completed_at` is set exactly when the status becomes terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStatus {
    pub request_id: RequestId,
    pub status: RequestStatus,
    pub current_step: u32,
    pub total_steps: u32,
    pub message: String,
    pub error: Option<String>,
    pub completed_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
