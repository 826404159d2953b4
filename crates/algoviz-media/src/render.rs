//! Manim rendering.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::command::{ProcessOutput, ToolCommand};
use crate::error::{MediaError, MediaResult};

/// File name of the animation script inside a work directory.
pub const SCRIPT_FILENAME: &str = "animation.py";

/// Extension of rendered videos.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Renders an animation script into a silent video.
#[async_trait]
pub trait AnimationRenderer: Send + Sync {
    /// Write the script into `work_dir`.
    async fn write_script(&self, work_dir: &Path, content: &str) -> MediaResult<PathBuf> {
        let path = work_dir.join(SCRIPT_FILENAME);
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }

    /// Render the script previously written into `work_dir`.
    ///
    /// Output lands somewhere below `work_dir`; use
    /// [`crate::locate_artifact`] to find it.
    async fn render(&self, work_dir: &Path) -> MediaResult<ProcessOutput>;
}

/// Runs the Manim CLI inside the work directory.
pub struct ManimRenderer {
    command: ToolCommand,
    quality_flag: String,
    timeout: Option<Duration>,
}

impl ManimRenderer {
    pub fn new(command: ToolCommand) -> Self {
        Self {
            command,
            quality_flag: "-ql".to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl AnimationRenderer for ManimRenderer {
    async fn render(&self, work_dir: &Path) -> MediaResult<ProcessOutput> {
        info!(work_dir = %work_dir.display(), command = %self.command, "Rendering animation");

        let output = self
            .command
            .runner()
            .arg(&self.quality_flag)
            .arg(SCRIPT_FILENAME)
            .current_dir(work_dir)
            .with_timeout(self.timeout)
            .run()
            .await?;

        if !output.success() {
            warn!(
                exit_code = ?output.exit_code,
                stderr_bytes = output.stderr.len(),
                "Manim exited with an error"
            );
            return Err(MediaError::RenderFailed {
                stdout: output.stdout,
                stderr: output.stderr,
                exit_code: output.exit_code,
            });
        }

        info!(duration_ms = output.duration.as_millis() as u64, "Animation rendered");
        Ok(output)
    }
}
