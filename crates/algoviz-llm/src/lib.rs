//! Language-model side of the AlgoViz pipeline.
//!
//! This crate provides:
//! - A provider-agnostic [`TextGenerator`] trait and a Gemini implementation
//! - Cleaning of fenced model output and validated JSON parsing
//! - Approach analysis, narration generation and animation script synthesis

pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod narration;
pub mod prompts;
pub mod response;
pub mod script;

pub use analysis::ApproachAnalyzer;
pub use client::{GeminiClient, TextGenerator};
pub use config::LlmConfig;
pub use error::{LlmError, LlmResult};
pub use narration::NarrationGenerator;
pub use response::{clean_json_response, generate_block, generate_structured, strip_code_fences};
pub use script::{ScriptSynthesizer, SynthesizedScript};

#[cfg(test)]
pub(crate) mod testing;
