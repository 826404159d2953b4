//! Error types for external media tools.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while driving external tools.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    #[error("Failed to start {program}: {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Speech synthesis failed: {message}")]
    SynthesisFailed {
        message: String,
        stdout: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("Animation render failed (exit code {exit_code:?})")]
    RenderFailed {
        stdout: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("No rendered video found under {}", .dir.display())]
    ArtifactNotFound {
        dir: PathBuf,
        /// Output of the render that exited cleanly without producing a video
        stdout: String,
        stderr: String,
    },

    #[error("Audio/video mux failed (exit code {exit_code:?})")]
    MuxFailed {
        stdout: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("{program} timed out after {millis} ms")]
    Timeout {
        program: String,
        millis: u64,
        /// Whatever the child wrote before it was killed
        stdout: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a process spawn error.
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::ProcessSpawn {
            program: program.into(),
            source,
        }
    }

    /// Create a speech synthesis failure error.
    pub fn synthesis_failed(
        message: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::SynthesisFailed {
            message: message.into(),
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Captured `(stdout, stderr)` of the process that failed, if any.
    pub fn streams(&self) -> Option<(&str, &str)> {
        match self {
            Self::SynthesisFailed { stdout, stderr, .. }
            | Self::RenderFailed { stdout, stderr, .. }
            | Self::MuxFailed { stdout, stderr, .. }
            | Self::ArtifactNotFound { stdout, stderr, .. }
            | Self::Timeout { stdout, stderr, .. } => Some((stdout, stderr)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streams_for_process_failures() {
        let err = MediaError::RenderFailed {
            stdout: "Rendering...".into(),
            stderr: "NameError".into(),
            exit_code: Some(1),
        };
        assert_eq!(err.streams(), Some(("Rendering...", "NameError")));

        let err = MediaError::ArtifactNotFound {
            dir: PathBuf::from("renders/x"),
            stdout: String::new(),
            stderr: "There are no scenes inside that module".into(),
        };
        assert_eq!(
            err.streams(),
            Some(("", "There are no scenes inside that module"))
        );

        let err = MediaError::ToolNotFound("manim".into());
        assert!(err.streams().is_none());
    }

    #[test]
    fn test_timeout_reports_milliseconds() {
        let err = MediaError::Timeout {
            program: "manim".into(),
            millis: 300,
            stdout: String::new(),
            stderr: "Rendering frame 12/900".into(),
        };
        assert_eq!(err.to_string(), "manim timed out after 300 ms");
        assert_eq!(err.streams(), Some(("", "Rendering frame 12/900")));
    }

    #[test]
    fn test_spawn_error_names_program() {
        let err = MediaError::spawn(
            "manim",
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        );
        assert!(err.to_string().contains("manim"));
    }
}
