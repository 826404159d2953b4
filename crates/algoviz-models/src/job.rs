//! Render job identifiers and pipeline stages.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// Unique identifier binding one animation request to its working
/// directory, audio file and published output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RenderId(String);

impl RenderId {
    /// Generate a new random render ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept an externally supplied ID (e.g. a URL path segment).
    ///
    /// IDs become directory names, so anything that is not a single plain
    /// path segment is rejected.
    pub fn parse(s: impl Into<String>) -> ModelResult<Self> {
        let s = s.into();
        let valid = !s.is_empty()
            && s.len() <= 128
            && s != "."
            && s != ".."
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if valid {
            Ok(Self(s))
        } else {
            Err(ModelError::InvalidRenderId(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RenderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stage of a render job.
///
/// Stages advance strictly in declaration order. `Failed` is reachable from
/// every non-terminal stage; `Cleaned` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    #[default]
    Idle,
    NarrationGenerated,
    ScriptGenerated,
    DirectoryPrepared,
    AudioSynthesized,
    Rendering,
    ArtifactLocated,
    Published,
    Cleaned,
    Failed,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Idle => "idle",
            JobStage::NarrationGenerated => "narration_generated",
            JobStage::ScriptGenerated => "script_generated",
            JobStage::DirectoryPrepared => "directory_prepared",
            JobStage::AudioSynthesized => "audio_synthesized",
            JobStage::Rendering => "rendering",
            JobStage::ArtifactLocated => "artifact_located",
            JobStage::Published => "published",
            JobStage::Cleaned => "cleaned",
            JobStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Cleaned | JobStage::Failed)
    }

    /// The stage that follows this one on the success path.
    pub fn next(&self) -> Option<JobStage> {
        match self {
            JobStage::Idle => Some(JobStage::NarrationGenerated),
            JobStage::NarrationGenerated => Some(JobStage::ScriptGenerated),
            JobStage::ScriptGenerated => Some(JobStage::DirectoryPrepared),
            JobStage::DirectoryPrepared => Some(JobStage::AudioSynthesized),
            JobStage::AudioSynthesized => Some(JobStage::Rendering),
            JobStage::Rendering => Some(JobStage::ArtifactLocated),
            JobStage::ArtifactLocated => Some(JobStage::Published),
            JobStage::Published => Some(JobStage::Cleaned),
            JobStage::Cleaned | JobStage::Failed => None,
        }
    }

    pub fn can_advance_to(&self, target: JobStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        target == JobStage::Failed || self.next() == Some(target)
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_ids_are_unique() {
        assert_ne!(RenderId::new(), RenderId::new());
    }

    #[test]
    fn test_parse_rejects_path_tricks() {
        assert!(RenderId::parse("3f1c-abc_1").is_ok());
        assert!(RenderId::parse("").is_err());
        assert!(RenderId::parse("..").is_err());
        assert!(RenderId::parse("a/b").is_err());
        assert!(RenderId::parse("a\\b").is_err());
        assert!(RenderId::parse("x".repeat(200)).is_err());
    }

    #[test]
    fn test_success_path_order() {
        let mut stage = JobStage::Idle;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            assert!(stage.can_advance_to(next));
            stage = next;
            visited.push(stage);
        }
        assert_eq!(stage, JobStage::Cleaned);
        assert_eq!(visited.len(), 9);
    }

    #[test]
    fn test_no_skipping_stages() {
        assert!(!JobStage::ScriptGenerated.can_advance_to(JobStage::Rendering));
        assert!(!JobStage::Idle.can_advance_to(JobStage::Published));
    }

    #[test]
    fn test_failed_reachable_from_non_terminal() {
        for stage in [
            JobStage::Idle,
            JobStage::ScriptGenerated,
            JobStage::Rendering,
            JobStage::Published,
        ] {
            assert!(stage.can_advance_to(JobStage::Failed));
        }
        assert!(!JobStage::Cleaned.can_advance_to(JobStage::Failed));
        assert!(!JobStage::Failed.can_advance_to(JobStage::Failed));
    }
}
