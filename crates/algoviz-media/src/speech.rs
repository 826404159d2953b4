//! Narration to speech via a disposable Python driver.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use algoviz_models::{NarrationScript, RenderId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::command::ToolCommand;
use crate::error::{MediaError, MediaResult};

/// Extension of synthesized audio files.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Turns a narration into one audio file.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Where the audio for `id` will be written.
    fn output_path(&self, id: &RenderId) -> PathBuf;

    /// Synthesize the narration. On success the returned path exists.
    async fn synthesize(&self, narration: &NarrationScript, id: &RenderId) -> MediaResult<PathBuf>;
}

/// Python text-to-speech library used by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechEngine {
    /// Google TTS, needs network access
    #[default]
    Gtts,
    /// Offline system voices
    Pyttsx3,
}

impl SpeechEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gtts => "gtts",
            Self::Pyttsx3 => "pyttsx3",
        }
    }
}

impl FromStr for SpeechEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gtts" => Ok(Self::Gtts),
            "pyttsx3" => Ok(Self::Pyttsx3),
            other => Err(format!("unknown TTS engine: {}", other)),
        }
    }
}

/// Speech synthesizer configuration.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Python interpreter command
    pub python: ToolCommand,
    pub engine: SpeechEngine,
    /// Language code passed to the engine
    pub language: String,
    /// Directory audio files are written to
    pub audio_root: PathBuf,
    /// Directory for driver scripts; system temp dir when `None`
    pub driver_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl SpeechConfig {
    pub fn new(audio_root: impl Into<PathBuf>) -> Self {
        Self {
            python: ToolCommand::new("python3"),
            engine: SpeechEngine::default(),
            language: "en".to_string(),
            audio_root: audio_root.into(),
            driver_dir: None,
            timeout: None,
        }
    }
}

/// Runs a generated Python script that calls the configured TTS engine.
pub struct PythonSpeechSynthesizer {
    config: SpeechConfig,
}

impl PythonSpeechSynthesizer {
    pub fn new(config: SpeechConfig) -> Self {
        Self { config }
    }

    fn write_driver(&self, text: &str, output: &Path) -> MediaResult<tempfile::TempPath> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("tts_driver_").suffix(".py");
        let mut file = match &self.config.driver_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        let source = driver_source(self.config.engine, &self.config.language, text, output);
        file.write_all(source.as_bytes())?;
        file.flush()?;

        Ok(file.into_temp_path())
    }
}

#[async_trait]
impl SpeechSynthesizer for PythonSpeechSynthesizer {
    fn output_path(&self, id: &RenderId) -> PathBuf {
        self.config
            .audio_root
            .join(format!("{}.{}", id, AUDIO_EXTENSION))
    }

    async fn synthesize(&self, narration: &NarrationScript, id: &RenderId) -> MediaResult<PathBuf> {
        let output = self.output_path(id);
        let transcript = narration.transcript();
        info!(
            render_id = %id,
            engine = self.config.engine.as_str(),
            chars = transcript.len(),
            "Synthesizing narration audio"
        );

        let driver = self.write_driver(&transcript, &output)?;
        let result = self
            .config
            .python
            .runner()
            .arg(driver.to_string_lossy())
            .with_timeout(self.config.timeout)
            .run()
            .await;

        let driver_path = driver.to_path_buf();
        if let Err(e) = driver.close() {
            warn!(path = %driver_path.display(), error = %e, "Failed to remove TTS driver script");
        }

        let process = result?;
        if !process.success() {
            return Err(MediaError::synthesis_failed(
                "speech process exited with an error",
                process.stdout,
                process.stderr,
                process.exit_code,
            ));
        }

        if !tokio::fs::try_exists(&output).await.unwrap_or(false) {
            return Err(MediaError::synthesis_failed(
                format!("speech process produced no file at {}", output.display()),
                process.stdout,
                process.stderr,
                process.exit_code,
            ));
        }

        debug!(render_id = %id, path = %output.display(), "Narration audio written");
        Ok(output)
    }
}

/// Python source of the driver script.
///
/// Text and paths are embedded as JSON string literals, which Python parses
/// as equivalent string literals.
fn driver_source(engine: SpeechEngine, language: &str, text: &str, output: &Path) -> String {
    let text = json_literal(text);
    let output = json_literal(&output.to_string_lossy());
    let language = json_literal(language);

    match engine {
        SpeechEngine::Gtts => format!(
            "from gtts import gTTS\n\n\
             TEXT = {text}\n\
             OUTPUT_PATH = {output}\n\
             LANGUAGE = {language}\n\n\
             gTTS(text=TEXT, lang=LANGUAGE).save(OUTPUT_PATH)\n"
        ),
        SpeechEngine::Pyttsx3 => format!(
            "import pyttsx3\n\n\
             TEXT = {text}\n\
             OUTPUT_PATH = {output}\n\
             LANGUAGE = {language}\n\n\
             engine = pyttsx3.init()\n\
             engine.save_to_file(TEXT, OUTPUT_PATH)\n\
             engine.runAndWait()\n"
        ),
    }
}

fn json_literal(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
