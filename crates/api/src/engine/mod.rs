//! Request lifecycle engine.
//!
//! [`GenerationService`] owns the work item store, the artifact staging
//! area, the progress broadcaster, and the generator implementation, and
//! supervises one executor task per accepted request. It is constructed
//! once at process start and injected through `AppState`.

pub mod executor;
pub mod staging;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;

use futures::Stream;
use tokio_util::task::TaskTracker;

use docgen_core::error::CoreError;
use docgen_core::generation::{FileInfo, GenerationStatus, OutputFormat, UploadedFile};
use docgen_core::steps::{DocumentGenerator, GenerationContext};
use docgen_core::types::RequestId;
use docgen_events::{event_stream, ProgressBroadcaster, StreamEvent};

use executor::StepExecutor;
use staging::StagingArea;
use store::RequestStore;

/// Facade over the lifecycle engine components.
pub struct GenerationService {
    store: Arc<RequestStore>,
    broadcaster: Arc<ProgressBroadcaster>,
    staging: Arc<StagingArea>,
    generator: Arc<dyn DocumentGenerator>,
    /// Tracks spawned executor runs so shutdown can drain in-flight work.
    tasks: TaskTracker,
}

impl GenerationService {
    pub fn new(staging_root: impl Into<PathBuf>, generator: Arc<dyn DocumentGenerator>) -> Self {
        Self {
            store: Arc::new(RequestStore::new()),
            broadcaster: Arc::new(ProgressBroadcaster::new()),
            staging: Arc::new(StagingArea::new(staging_root)),
            generator,
            tasks: TaskTracker::new(),
        }
    }

    /// Accept a new generation request.
    ///
    /// Creates the work item, stages the uploads, and spawns the executor
    /// run. Returns as soon as the run is scheduled; processing continues
    /// independently of the HTTP response cycle.
    pub async fn create_request(
        &self,
        files: Vec<UploadedFile>,
        description: String,
        output_format: OutputFormat,
    ) -> Result<(RequestId, Vec<FileInfo>), CoreError> {
        let file_infos: Vec<FileInfo> = files.iter().map(UploadedFile::info).collect();
        let total_size: u64 = file_infos.iter().map(|f| f.size).sum();

        let request_id = self.store.create();

        let staged_files = match self.staging.stage(request_id, &files).await {
            Ok(paths) => paths,
            Err(e) => {
                // The work item exists but can never run; record the failure
                // so pollers see a terminal state instead of a hang.
                let error_text = e.to_string();
                self.store.update(&request_id, |record| {
                    record.status = docgen_core::generation::RequestStatus::Failed;
                    record.message = docgen_core::steps::FAILED_MESSAGE.to_string();
                    record.error = Some(error_text.clone());
                    record.completed_at = Some(chrono::Utc::now());
                });
                return Err(CoreError::processing(
                    "Failed to process generation request",
                    serde_json::json!({"error_message": error_text}),
                ));
            }
        };

        let executor = StepExecutor::new(
            Arc::clone(&self.store),
            Arc::clone(&self.broadcaster),
            Arc::clone(&self.staging),
            Arc::clone(&self.generator),
        );
        let ctx = GenerationContext {
            request_id,
            description,
            output_format,
            staged_files,
        };
        self.tasks.spawn(async move { executor.run(ctx).await });

        tracing::info!(
            request_id = %request_id,
            file_count = file_infos.len(),
            total_size,
            "Created generation request",
        );

        Ok((request_id, file_infos))
    }

    /// Current status of a request; `None` for unknown IDs.
    pub fn status(&self, request_id: &RequestId) -> Option<GenerationStatus> {
        self.store.get(request_id)
    }

    /// Open a live event stream for a request.
    ///
    /// Returns `None` for unknown IDs so the transport can reject before
    /// any stream bytes are sent. The stream starts with a `connected`
    /// handshake and a `status` snapshot of the item at attach time, then
    /// relays subsequent events.
    pub fn subscribe(&self, request_id: RequestId) -> Option<impl Stream<Item = StreamEvent>> {
        let snapshot = self.store.get(&request_id)?;
        let initial = vec![
            StreamEvent::connected(request_id),
            StreamEvent::snapshot(&snapshot),
        ];
        Some(event_stream(
            Arc::clone(&self.broadcaster),
            request_id,
            initial,
        ))
    }

    /// Stop accepting new executor runs and wait for in-flight ones.
    pub async fn shutdown(&self) {
        self.tasks.close();
        self.tasks.wait().await;
    }

    /// Number of executor runs currently in flight.
    pub fn active_runs(&self) -> usize {
        self.tasks.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
