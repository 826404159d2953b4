//! Shared data models for the AlgoViz backend.
//!
//! This crate provides Serde-serializable types for:
//! - Solution approaches returned by the language model
//! - Narration scripts
//! - Render job identifiers and pipeline stages
//! - HTTP request/response schemas

pub mod api;
pub mod approach;
pub mod error;
pub mod job;
pub mod narration;

// Re-export common types
pub use api::{
    AnalyzeRequest, AnalyzeResponse, AnimationRequest, AnimationResponse, CleanupAllResponse,
    CleanupResponse, ErrorBody,
};
pub use approach::{AnalysisResult, Approach, CodeSamples, Language};
pub use error::{ModelError, ModelResult};
pub use job::{JobStage, RenderId};
pub use narration::NarrationScript;
