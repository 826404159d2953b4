//! Pipeline error types.

use algoviz_llm::LlmError;
use algoviz_media::{CleanupError, MediaError};
use algoviz_models::{JobStage, ModelError};
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    InvalidInput(#[from] ModelError),

    #[error("Text generation failed: {0}")]
    Llm(#[from] LlmError),

    #[error("{0}")]
    Media(#[from] MediaError),

    #[error("Illegal stage transition {from} -> {to}")]
    InvalidTransition { from: JobStage, to: JobStage },

    #[error("{0}")]
    Cleanup(#[from] CleanupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Captured `(stdout, stderr)` of the failing external process.
    ///
    /// Empty strings when the failure did not come from a process.
    pub fn diagnostics(&self) -> (String, String) {
        match self {
            PipelineError::Media(e) => e
                .streams()
                .map(|(out, err)| (out.to_string(), err.to_string()))
                .unwrap_or_default(),
            _ => (String::new(), String::new()),
        }
    }

    /// Whether the caller sent something unusable.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::InvalidInput(_))
    }
}
