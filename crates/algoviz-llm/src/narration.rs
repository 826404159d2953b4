//! Narration generation from source code.

use std::sync::Arc;

use algoviz_models::NarrationScript;
use tracing::info;

use crate::client::TextGenerator;
use crate::error::LlmResult;
use crate::prompts::build_narration_prompt;
use crate::response::generate_structured;

/// Turns an approach's source code into spoken narration lines.
#[derive(Clone)]
pub struct NarrationGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl NarrationGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn generate(&self, source_code: &str) -> LlmResult<NarrationScript> {
        let prompt = build_narration_prompt(source_code);
        // NarrationScript validates itself while deserializing.
        let narration: NarrationScript =
            generate_structured(self.generator.as_ref(), &prompt).await?;

        info!(lines = narration.len(), "Narration generated");
        Ok(narration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::testing::ScriptedGenerator;

    #[tokio::test]
    async fn test_generate_narration() {
        let generator = Arc::new(ScriptedGenerator::new([
            "```json\n[\"We scan the array.\", \"**Swap** neighbours\"]\n```",
        ]));
        let narration = NarrationGenerator::new(generator.clone())
            .generate("int x;")
            .await
            .unwrap();

        assert_eq!(narration.lines(), &["We scan the array.", "Swap neighbours"]);
        assert!(generator.prompts()[0].contains("int x;"));
    }

    #[tokio::test]
    async fn test_empty_narration_is_parse_error() {
        let generator = Arc::new(ScriptedGenerator::new(["[]"]));
        let err = NarrationGenerator::new(generator)
            .generate("int x;")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Parse { .. }));
    }
}
