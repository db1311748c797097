//! Upload validation: extension allow-list, MIME agreement, magic-byte
//! sniffing, and size caps.
//!
//! All functions here are pure over `(filename, content_type, bytes)` so the
//! HTTP layer can validate parts as it reads them, before any state is
//! created for the request.

use serde_json::json;

use crate::error::CoreError;

/// Maximum number of files per generation request.
pub const MAX_FILES_PER_REQUEST: usize = 10;

/// Maximum size of a single uploaded file (50 MB).
pub const MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Maximum aggregate upload size per request (200 MB).
pub const MAX_TOTAL_SIZE_BYTES: u64 = 200 * 1024 * 1024;

/// Allowed extensions with the MIME types accepted for each.
const ALLOWED_TYPES: [(&str, &[&str]); 4] = [
    (".pdf", &["application/pdf"]),
    (
        ".docx",
        &[
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "application/msword",
        ],
    ),
    (".csv", &["text/csv", "application/csv"]),
    (
        ".xlsx",
        &[
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "application/vnd.ms-excel",
        ],
    ),
];

/// Browsers that cannot classify a file fall back to this; it is accepted
/// whenever the extension itself is allowed.
const GENERIC_CONTENT_TYPE: &str = "application/octet-stream";

/// Lowercased extension of `filename`, including the leading dot.
pub fn file_extension(filename: &str) -> Option<String> {
    let idx = filename.rfind('.')?;
    if idx == 0 || idx == filename.len() - 1 {
        return None;
    }
    Some(filename[idx..].to_lowercase())
}

/// MIME types accepted for an allowed extension, `None` if disallowed.
fn allowed_content_types(extension: &str) -> Option<&'static [&'static str]> {
    ALLOWED_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, types)| *types)
}

fn allowed_extensions_list() -> String {
    ALLOWED_TYPES
        .iter()
        .map(|(ext, _)| *ext)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sniff the file type from leading magic bytes.
///
/// PDF files start with `%PDF`. ZIP containers (`PK\x03\x04`) are ambiguous
/// between docx and xlsx, so the filename breaks the tie; other ZIP payloads
/// stay unidentified.
pub fn detect_file_type(bytes: &[u8], filename: &str) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF") {
        return Some(".pdf");
    }
    if bytes.starts_with(b"PK\x03\x04") {
        let lower = filename.to_lowercase();
        if lower.ends_with(".docx") {
            return Some(".docx");
        }
        if lower.ends_with(".xlsx") {
            return Some(".xlsx");
        }
    }
    None
}

/// Validate one uploaded file: extension, content type, and magic bytes.
pub fn validate_upload(
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<(), CoreError> {
    if filename.is_empty() {
        return Err(CoreError::file_validation_with(
            "No file provided",
            json!({"field": "file"}),
        ));
    }

    let extension = file_extension(filename).ok_or_else(|| {
        CoreError::file_validation_with(
            "File must have an extension",
            json!({"filename": filename, "field": "file"}),
        )
    })?;

    let expected_types = allowed_content_types(&extension).ok_or_else(|| {
        CoreError::file_validation_with(
            format!(
                "File type '{extension}' not allowed. Allowed types: {}",
                allowed_extensions_list()
            ),
            json!({"filename": filename, "extension": extension, "field": "file"}),
        )
    })?;

    // Content-type agreement. A missing or generic type is tolerated when
    // the extension is already allowed.
    if let Some(content_type) = content_type.filter(|ct| !ct.is_empty()) {
        if content_type != GENERIC_CONTENT_TYPE && !expected_types.contains(&content_type) {
            return Err(CoreError::file_validation_with(
                format!("Content type '{content_type}' does not match expected types for {extension}"),
                json!({
                    "filename": filename,
                    "content_type": content_type,
                    "field": "file",
                }),
            ));
        }
    }

    if let Some(detected) = detect_file_type(bytes, filename) {
        if detected != extension {
            return Err(CoreError::file_validation_with(
                format!(
                    "File content does not match extension. Expected {extension}, detected {detected}"
                ),
                json!({
                    "filename": filename,
                    "expected_type": extension,
                    "detected_type": detected,
                    "field": "file",
                }),
            ));
        }
    }

    Ok(())
}

/// Validate one file's size against the per-file cap.
pub fn validate_file_size(size: u64) -> Result<(), CoreError> {
    if size > MAX_FILE_SIZE_BYTES {
        let size_mb = size as f64 / (1024.0 * 1024.0);
        let max_mb = MAX_FILE_SIZE_BYTES as f64 / (1024.0 * 1024.0);
        return Err(CoreError::file_validation_with(
            format!("File size {size_mb:.1}MB exceeds maximum allowed size of {max_mb:.1}MB"),
            json!({
                "size_bytes": size,
                "max_size_bytes": MAX_FILE_SIZE_BYTES,
            }),
        ));
    }
    Ok(())
}

/// Validate the aggregate size of all files in a request.
pub fn validate_total_size(total: u64) -> Result<(), CoreError> {
    if total > MAX_TOTAL_SIZE_BYTES {
        let total_mb = total as f64 / (1024.0 * 1024.0);
        let max_mb = MAX_TOTAL_SIZE_BYTES as f64 / (1024.0 * 1024.0);
        return Err(CoreError::validation_with(
            format!("Total file size {total_mb:.1}MB exceeds maximum allowed {max_mb:.1}MB"),
            json!({
                "total_size_bytes": total,
                "max_size_bytes": MAX_TOTAL_SIZE_BYTES,
            }),
        ));
    }
    Ok(())
}

/// Validate the number of files in a request.
pub fn validate_file_count(count: usize) -> Result<(), CoreError> {
    if count == 0 {
        return Err(CoreError::validation_with(
            "At least one file must be uploaded",
            json!({"field": "files"}),
        ));
    }
    if count > MAX_FILES_PER_REQUEST {
        return Err(CoreError::validation_with(
            format!("Maximum {MAX_FILES_PER_REQUEST} files can be uploaded at once"),
            json!({
                "field": "files",
                "file_count": count,
                "max_allowed": MAX_FILES_PER_REQUEST,
            }),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
