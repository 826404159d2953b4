//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use algoviz_media::{SpeechConfig, SpeechEngine, ToolCommand};
use tracing::warn;

use crate::layout::StorageLayout;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root under which `renders/`, `audio/` and `videos/` live
    pub data_dir: PathBuf,
    /// Python interpreter for the speech driver
    pub python: ToolCommand,
    pub tts_engine: SpeechEngine,
    pub tts_language: String,
    /// Manim CLI
    pub manim: ToolCommand,
    /// FFmpeg CLI
    pub ffmpeg: ToolCommand,
    /// Bound on one speech synthesis run
    pub speech_timeout: Option<Duration>,
    /// Bound on one Manim render
    pub render_timeout: Option<Duration>,
    /// Bound on one FFmpeg mux
    pub mux_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            python: ToolCommand::new("python3"),
            tts_engine: SpeechEngine::Gtts,
            tts_language: "en".to_string(),
            manim: ToolCommand::new("manim"),
            ffmpeg: ToolCommand::new("ffmpeg"),
            speech_timeout: Some(Duration::from_secs(120)),
            render_timeout: Some(Duration::from_secs(600)),
            mux_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            python: tool_from_env("PYTHON_BIN").unwrap_or(defaults.python),
            tts_engine: std::env::var("TTS_ENGINE")
                .ok()
                .and_then(|s| {
                    s.parse()
                        .map_err(|e| warn!("Ignoring TTS_ENGINE: {}", e))
                        .ok()
                })
                .unwrap_or(defaults.tts_engine),
            tts_language: std::env::var("TTS_LANGUAGE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.tts_language),
            manim: tool_from_env("MANIM_BIN").unwrap_or(defaults.manim),
            ffmpeg: tool_from_env("FFMPEG_BIN").unwrap_or(defaults.ffmpeg),
            speech_timeout: timeout_from_env("SPEECH_TIMEOUT_SECS", defaults.speech_timeout),
            render_timeout: timeout_from_env("RENDER_TIMEOUT_SECS", defaults.render_timeout),
            mux_timeout: timeout_from_env("MUX_TIMEOUT_SECS", defaults.mux_timeout),
        }
    }

    pub fn layout(&self) -> StorageLayout {
        StorageLayout::new(&self.data_dir)
    }

    pub fn speech_config(&self) -> SpeechConfig {
        SpeechConfig {
            python: self.python.clone(),
            engine: self.tts_engine,
            language: self.tts_language.clone(),
            audio_root: self.layout().audio_root().to_path_buf(),
            driver_dir: None,
            timeout: self.speech_timeout,
        }
    }
}

fn tool_from_env(name: &str) -> Option<ToolCommand> {
    std::env::var(name).ok().and_then(|s| ToolCommand::parse(&s))
}

/// Seconds from the environment; `0` disables the bound.
fn timeout_from_env(name: &str, default: Option<Duration>) -> Option<Duration> {
    match std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => default,
    }
}
