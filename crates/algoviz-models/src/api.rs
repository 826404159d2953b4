//! HTTP request and response payloads.
//!
//! Field names match what the existing web player sends and expects.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::approach::Approach;

/// `POST /analyze` request body.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Validate)]
pub struct AnalyzeRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 4000, message = "question is required"))]
    pub question: String,
}

/// `POST /analyze` response body.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeResponse {
    pub question: String,
    pub title: String,
    pub approaches: Vec<Approach>,
}

/// `POST /getAnimation` request body.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct AnimationRequest {
    #[serde(default)]
    pub approach: Option<Approach>,
}

/// `POST /getAnimation` response body.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimationResponse {
    pub video_url: String,
}

/// `DELETE /cleanup/:videoId` response body.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub message: String,
    pub video_id: String,
}

/// `DELETE /cleanup-all` response body.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CleanupAllResponse {
    pub message: String,
    pub count: usize,
}

/// Error body returned by every failing endpoint.
///
/// `output` and `error_output` carry the captured streams of the external
/// process that failed, when there was one.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_output: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            output: None,
            error_output: None,
        }
    }

    pub fn with_streams(
        mut self,
        output: impl Into<String>,
        error_output: impl Into<String>,
    ) -> Self {
        self.output = Some(output.into());
        self.error_output = Some(error_output.into());
        self
    }
}
