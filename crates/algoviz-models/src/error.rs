//! Model validation errors.

use thiserror::Error;

/// Result type for model construction and validation.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Narration script has no usable lines")]
    EmptyNarration,

    #[error("Approach '{0}' has no source code")]
    MissingSourceCode(String),

    #[error("Analysis returned no approaches")]
    NoApproaches,

    #[error("Invalid render id: {0}")]
    InvalidRenderId(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<validator::ValidationErrors> for ModelError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
