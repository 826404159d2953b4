//! Combining the rendered video with the narration audio.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, ToolCommand};
use crate::error::{MediaError, MediaResult};

/// Merges one video stream and one audio stream into a new file.
#[async_trait]
pub trait Muxer: Send + Sync {
    async fn combine(&self, video: &Path, audio: &Path, output: &Path) -> MediaResult<PathBuf>;
}

/// FFmpeg muxer. Video is stream-copied, audio encoded to AAC, and the
/// result is cut to the shorter of the two inputs.
pub struct FfmpegMuxer {
    command: ToolCommand,
    timeout: Option<Duration>,
}

impl FfmpegMuxer {
    pub fn new(command: ToolCommand) -> Self {
        Self {
            command,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The FFmpeg invocation for one mux.
    pub fn build_command(video: &Path, audio: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(video, output)
            .input(audio)
            .video_codec("copy")
            .audio_codec("aac")
            .shortest()
    }
}

impl Default for FfmpegMuxer {
    fn default() -> Self {
        Self::new(ToolCommand::new("ffmpeg"))
    }
}

#[async_trait]
impl Muxer for FfmpegMuxer {
    async fn combine(&self, video: &Path, audio: &Path, output: &Path) -> MediaResult<PathBuf> {
        let cmd = Self::build_command(video, audio, output);
        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", self.command, args.join(" "));

        let result = self
            .command
            .runner()
            .args(args)
            .with_timeout(self.timeout)
            .run()
            .await?;

        if !result.success() {
            return Err(MediaError::MuxFailed {
                stdout: result.stdout,
                stderr: result.stderr,
                exit_code: result.exit_code,
            });
        }

        info!(
            output = %output.display(),
            duration_ms = result.duration.as_millis() as u64,
            "Audio and video muxed"
        );
        Ok(output.to_path_buf())
    }
}
