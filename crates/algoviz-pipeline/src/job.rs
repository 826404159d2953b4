//! Per-request render job state.

use std::path::PathBuf;

use algoviz_models::{JobStage, NarrationScript, RenderId};
use chrono::{DateTime, Utc};

use crate::error::{PipelineError, PipelineResult};

/// State of one render request. Owned by a single coordinator run.
#[derive(Debug)]
pub struct RenderJob {
    pub id: RenderId,
    pub script: String,
    pub narration: NarrationScript,
    /// Transient working directory
    pub work_dir: PathBuf,
    /// Transient narration audio
    pub audio_path: PathBuf,
    /// Published directory; transient until the job succeeds
    pub published_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    stage: JobStage,
}

impl RenderJob {
    /// A job whose narration and script already exist.
    pub fn new(
        id: RenderId,
        script: String,
        narration: NarrationScript,
        work_dir: PathBuf,
        audio_path: PathBuf,
        published_dir: PathBuf,
    ) -> Self {
        Self {
            id,
            script,
            narration,
            work_dir,
            audio_path,
            published_dir,
            started_at: Utc::now(),
            stage: JobStage::ScriptGenerated,
        }
    }

    pub fn stage(&self) -> JobStage {
        self.stage
    }

    /// Move to `next`, which must directly follow the current stage.
    pub fn advance(&mut self, next: JobStage) -> PipelineResult<()> {
        if !self.stage.can_advance_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.stage,
                to: next,
            });
        }
        self.stage = next;
        Ok(())
    }

    /// Mark the job failed. No-op once terminal.
    pub fn fail(&mut self) {
        if !self.stage.is_terminal() {
            self.stage = JobStage::Failed;
        }
    }

    /// Wall-clock time since the job was created.
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }

    /// Paths removed if the job is abandoned mid-flight.
    pub fn transient_paths(&self) -> Vec<PathBuf> {
        vec![
            self.work_dir.clone(),
            self.audio_path.clone(),
            self.published_dir.clone(),
        ]
    }
}
