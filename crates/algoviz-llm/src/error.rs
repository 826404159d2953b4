//! Text generation error types.

use thiserror::Error;

/// Result type for text generation.
pub type LlmResult<T> = Result<T, LlmError>;

/// Longest excerpt of an unparseable response kept in a [`LlmError::Parse`].
const EXCERPT_LEN: usize = 500;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Failed to parse model response: {message}")]
    Parse { message: String, excerpt: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Parse failure, keeping the start of the offending text for diagnosis.
    pub fn parse(message: impl Into<String>, text: &str) -> Self {
        Self::Parse {
            message: message.into(),
            excerpt: text.chars().take(EXCERPT_LEN).collect(),
        }
    }
}
