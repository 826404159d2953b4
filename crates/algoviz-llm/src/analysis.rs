//! Problem analysis: question in, candidate approaches out.

use std::sync::Arc;

use algoviz_models::AnalysisResult;
use tracing::info;

use crate::client::TextGenerator;
use crate::error::{LlmError, LlmResult};
use crate::prompts::build_analysis_prompt;
use crate::response::generate_structured;

/// Asks the model for solution approaches to a DSA problem.
#[derive(Clone)]
pub struct ApproachAnalyzer {
    generator: Arc<dyn TextGenerator>,
}

impl ApproachAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Analyse a question. The response is validated before it is returned.
    pub async fn analyze(&self, question: &str) -> LlmResult<AnalysisResult> {
        let prompt = build_analysis_prompt(question);
        let analysis: AnalysisResult = generate_structured(self.generator.as_ref(), &prompt).await?;

        if let Err(e) = analysis.check() {
            let raw = serde_json::to_string(&analysis).unwrap_or_default();
            return Err(LlmError::parse(e.to_string(), &raw));
        }

        info!(
            title = %analysis.title,
            approaches = analysis.approaches.len(),
            "Problem analysed"
        );
        Ok(analysis)
    }
}
