//! Animation script synthesis.

use std::sync::Arc;

use algoviz_models::{NarrationScript, RenderId};
use tracing::info;

use crate::client::TextGenerator;
use crate::error::LlmResult;
use crate::prompts::build_script_prompt;
use crate::response::generate_block;

/// A generated animation script and the render it belongs to.
#[derive(Debug, Clone)]
pub struct SynthesizedScript {
    pub id: RenderId,
    pub content: String,
}

/// Asks the model for a Manim script animating an approach.
#[derive(Clone)]
pub struct ScriptSynthesizer {
    generator: Arc<dyn TextGenerator>,
}

impl ScriptSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate a script for `source_code` narrated by `narration`.
    ///
    /// The render id is minted before the model call. The script is not
    /// checked for validity here; the renderer reports broken scripts.
    pub async fn synthesize(
        &self,
        source_code: &str,
        narration: &NarrationScript,
    ) -> LlmResult<SynthesizedScript> {
        let id = RenderId::new();
        let prompt = build_script_prompt(source_code, narration);
        let content = generate_block(self.generator.as_ref(), &prompt).await?;

        info!(render_id = %id, script_bytes = content.len(), "Animation script generated");
        Ok(SynthesizedScript { id, content })
    }
}
