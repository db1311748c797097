//! Per-request scratch storage for uploaded payloads.
//!
//! Files are staged under `<root>/<request-id>/` at request acceptance and
//! reclaimed when the executor run finishes, whichever way it exits.
//! Cleanup is advisory: deletion failures are logged, never escalated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use docgen_core::error::CoreError;
use docgen_core::generation::UploadedFile;
use docgen_core::types::RequestId;

/// Owns the staging root and the request-to-paths mapping.
pub struct StagingArea {
    root: PathBuf,
    entries: RwLock<HashMap<RequestId, Vec<PathBuf>>>,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn request_dir(&self, request_id: &RequestId) -> PathBuf {
        self.root.join(request_id.to_string())
    }

    /// Copy upload bytes into the request's scratch directory.
    ///
    /// Returns stable paths for the executor to read during processing. The
    /// caller's `UploadedFile` values are untouched (this is a copy, not a
    /// move). Client-supplied filenames are reduced to their final path
    /// component before writing, so `../` segments cannot escape the
    /// scratch directory.
    pub async fn stage(
        &self,
        request_id: RequestId,
        files: &[UploadedFile],
    ) -> Result<Vec<PathBuf>, CoreError> {
        let dir = self.request_dir(&request_id);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            CoreError::Internal(format!("Failed to create staging dir: {e}"))
        })?;

        let mut paths = Vec::with_capacity(files.len());
        for file in files {
            let basename = Path::new(&file.filename)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "upload".to_string());
            let dest = dir.join(basename);
            tokio::fs::write(&dest, &file.bytes).await.map_err(|e| {
                CoreError::Internal(format!("Failed to stage upload: {e}"))
            })?;
            paths.push(dest);
        }

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(request_id, paths.clone());

        tracing::debug!(
            request_id = %request_id,
            file_count = paths.len(),
            "Staged uploads",
        );
        Ok(paths)
    }

    /// Best-effort deletion of all staged files and the scratch directory.
    pub async fn release(&self, request_id: RequestId) {
        let paths = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&request_id);

        let Some(paths) = paths else {
            return;
        };

        for path in &paths {
            if let Err(e) = tokio::fs::remove_file(path).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to delete staged file");
            }
        }

        let dir = self.request_dir(&request_id);
        if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
            tracing::warn!(dir = %dir.display(), error = %e, "Failed to delete staging dir");
        }

        tracing::debug!(request_id = %request_id, "Released staging area");
    }

    /// Whether a staging entry currently exists for `request_id`.
    pub fn contains(&self, request_id: &RequestId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(request_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
