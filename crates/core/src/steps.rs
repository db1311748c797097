//! The fixed processing pipeline and the generator seam.
//!
//! The step sequence and its messages are stable API surface: clients see
//! them verbatim in progress events and status polls. The actual work done
//! per step sits behind [`DocumentGenerator`] so the simulated stub can be
//! replaced by real LLM/document processing without touching the executor.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::generation::OutputFormat;
use crate::types::RequestId;

/// Ordered step messages for one generation run.
pub const PIPELINE_STEPS: [&str; 10] = [
    "Validating uploaded files...",
    "Extracting text from PDF documents...",
    "Parsing Word documents...",
    "Reading CSV/Excel data...",
    "Analyzing document structure...",
    "Preparing content for LLM...",
    "Generating document with AI...",
    "Formatting output...",
    "Finalizing document...",
    "Generation complete!",
];

/// Total step count, fixed for the lifetime of every request.
pub const TOTAL_STEPS: u32 = PIPELINE_STEPS.len() as u32;

/// Default simulated per-step latency.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(2);

/// Status message for a freshly accepted request (step 0).
pub const ACCEPTED_MESSAGE: &str = "Request accepted, starting processing...";

/// Status message once a run finishes successfully.
pub const COMPLETED_MESSAGE: &str = "Document generation completed successfully!";

/// Status message once a run fails; the cause goes in the `error` field.
pub const FAILED_MESSAGE: &str = "Generation failed";

/// Everything a generator implementation may need for one run.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub request_id: RequestId,
    pub description: String,
    pub output_format: OutputFormat,
    /// Staged copies of the uploaded files, owned by the staging area.
    pub staged_files: Vec<PathBuf>,
}

/// The work performed for a single pipeline step.
///
/// An error return is terminal for the whole request: the executor records
/// the error verbatim and skips the remaining steps.
#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    async fn run_step(
        &self,
        step: u32,
        message: &str,
        ctx: &GenerationContext,
    ) -> Result<(), CoreError>;
}

/// Stand-in generator that sleeps a fixed delay per step.
///
/// Placeholder for real LLM/document processing; the delay is configurable
/// so tests can run the pipeline at full speed.
pub struct SimulatedGenerator {
    step_delay: Duration,
}

impl SimulatedGenerator {
    pub fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }
}

impl Default for SimulatedGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_DELAY)
    }
}

#[async_trait]
impl DocumentGenerator for SimulatedGenerator {
    async fn run_step(
        &self,
        _step: u32,
        _message: &str,
        _ctx: &GenerationContext,
    ) -> Result<(), CoreError> {
        tokio::time::sleep(self.step_delay).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_has_ten_steps() {
        assert_eq!(TOTAL_STEPS, 10);
        assert_eq!(PIPELINE_STEPS.len(), 10);
    }

    #[test]
    fn final_step_announces_completion() {
        assert_eq!(PIPELINE_STEPS[PIPELINE_STEPS.len() - 1], "Generation complete!");
    }

    #[tokio::test]
    async fn simulated_generator_with_zero_delay_succeeds() {
        let generator = SimulatedGenerator::new(Duration::ZERO);
        let ctx = GenerationContext {
            request_id: uuid::Uuid::new_v4(),
            description: "summarize".to_string(),
            output_format: OutputFormat::Markdown,
            staged_files: vec![],
        };
        for (idx, message) in PIPELINE_STEPS.iter().enumerate() {
            generator
                .run_step(idx as u32 + 1, message, &ctx)
                .await
                .expect("simulated step should not fail");
        }
    }
}
