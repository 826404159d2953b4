//! External media tools for the AlgoViz pipeline.
//!
//! This crate provides:
//! - A supervised subprocess runner with captured output, timeouts and
//!   kill-on-drop cancellation
//! - Speech synthesis through a disposable Python driver
//! - Manim rendering and discovery of the rendered video
//! - FFmpeg audio/video muxing

pub mod artifact;
pub mod command;
pub mod error;
pub mod fs_utils;
pub mod mux;
pub mod render;
pub mod speech;

pub use artifact::{locate_artifact, DirEntryInfo, DirectoryReader, LocalFs, MemoryFs};
pub use command::{check_tool, FfmpegCommand, ProcessOutput, ProcessRunner, ToolCommand};
pub use error::{MediaError, MediaResult};
pub use fs_utils::CleanupError;
pub use mux::{FfmpegMuxer, Muxer};
pub use render::{AnimationRenderer, ManimRenderer, SCRIPT_FILENAME, VIDEO_EXTENSION};
pub use speech::{
    PythonSpeechSynthesizer, SpeechConfig, SpeechEngine, SpeechSynthesizer, AUDIO_EXTENSION,
};
