//! Step executor: drives one work item through the fixed pipeline.
//!
//! For every step the executor writes the new state to the store, then
//! publishes the matching event. Publishing never blocks the run; with no
//! subscribers the event is simply dropped and the store remains the source
//! of truth. A step error is terminal for the item (no per-step retry) and
//! is recorded verbatim. The staging area entry is released on every exit
//! path.

use std::sync::Arc;

use chrono::Utc;

use docgen_core::error::CoreError;
use docgen_core::generation::RequestStatus;
use docgen_core::steps::{
    DocumentGenerator, GenerationContext, COMPLETED_MESSAGE, FAILED_MESSAGE, PIPELINE_STEPS,
    TOTAL_STEPS,
};
use docgen_events::{ProgressBroadcaster, StreamEvent};

use super::staging::StagingArea;
use super::store::RequestStore;

/// Executes one generation run end to end.
pub struct StepExecutor {
    store: Arc<RequestStore>,
    broadcaster: Arc<ProgressBroadcaster>,
    staging: Arc<StagingArea>,
    generator: Arc<dyn DocumentGenerator>,
}

impl StepExecutor {
    pub fn new(
        store: Arc<RequestStore>,
        broadcaster: Arc<ProgressBroadcaster>,
        staging: Arc<StagingArea>,
        generator: Arc<dyn DocumentGenerator>,
    ) -> Self {
        Self {
            store,
            broadcaster,
            staging,
            generator,
        }
    }

    /// Run the pipeline for one request to its terminal state.
    ///
    /// Runs detached from the originating HTTP request: progress continues
    /// whether or not anyone is watching.
    pub async fn run(&self, ctx: GenerationContext) {
        let request_id = ctx.request_id;

        match self.process(&ctx).await {
            Ok(()) => {
                self.store.update(&request_id, |record| {
                    record.status = RequestStatus::Completed;
                    record.current_step = record.total_steps;
                    record.message = COMPLETED_MESSAGE.to_string();
                    record.completed_at = Some(Utc::now());
                });
                self.broadcaster.publish(request_id, StreamEvent::complete());
                tracing::info!(request_id = %request_id, "Generation completed");
            }
            Err(e) => {
                let error_text = e.to_string();
                self.store.update(&request_id, |record| {
                    record.status = RequestStatus::Failed;
                    record.message = FAILED_MESSAGE.to_string();
                    record.error = Some(error_text.clone());
                    record.completed_at = Some(Utc::now());
                });
                self.broadcaster
                    .publish(request_id, StreamEvent::error(error_text.clone()));
                tracing::error!(request_id = %request_id, error = %error_text, "Generation failed");
            }
        }

        // Reclaim scratch storage regardless of which exit path was taken.
        self.staging.release(request_id).await;
    }

    /// Advance through every pipeline step, recording and publishing each
    /// transition before handing the step to the generator.
    async fn process(&self, ctx: &GenerationContext) -> Result<(), CoreError> {
        for (idx, message) in PIPELINE_STEPS.iter().enumerate() {
            let step = idx as u32 + 1;

            self.store.update(&ctx.request_id, |record| {
                record.current_step = step;
                record.message = (*message).to_string();
            });
            self.broadcaster
                .publish(ctx.request_id, StreamEvent::progress(step, TOTAL_STEPS, *message));

            self.generator.run_step(step, message, ctx).await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
