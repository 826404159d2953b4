//! Cleaning and parsing of model responses.
//!
//! Models frequently wrap output in markdown code fences even when told not
//! to. Everything that consumes model text goes through these helpers.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::client::TextGenerator;
use crate::error::{LlmError, LlmResult};

const FENCE: &str = "```";

/// Remove a surrounding markdown code fence, if any, and trim.
///
/// Handles language-tagged (```` ```json ````) and plain fences. Text
/// without a fence comes back trimmed and otherwise unchanged.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(open) = fence_at_line_start(trimmed) else {
        return trimmed.to_string();
    };

    let after_open = &trimmed[open + FENCE.len()..];
    let body = match after_open.find('\n') {
        Some(nl) if is_language_tag(&after_open[..nl]) => &after_open[nl + 1..],
        _ => after_open,
    };
    let body = match fence_at_line_start(body).or_else(|| body.find(FENCE)) {
        Some(close) => &body[..close],
        None => body,
    };

    body.trim().to_string()
}

/// Same as [`strip_code_fences`]; named for JSON call sites.
pub fn clean_json_response(text: &str) -> String {
    strip_code_fences(text)
}

/// Offset of the first fence that begins a line.
fn fence_at_line_start(text: &str) -> Option<usize> {
    if text.starts_with(FENCE) {
        return Some(0);
    }
    text.match_indices(&format!("\n{FENCE}"))
        .next()
        .map(|(i, _)| i + 1)
}

fn is_language_tag(s: &str) -> bool {
    s.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_' | '#' | '.'))
}

/// Generate, clean and parse a JSON response into `T`.
pub async fn generate_structured<T>(generator: &dyn TextGenerator, prompt: &str) -> LlmResult<T>
where
    T: DeserializeOwned,
{
    let raw = generator.generate_text(prompt).await?;
    let cleaned = clean_json_response(&raw);

    serde_json::from_str(&cleaned).map_err(|e| {
        warn!(error = %e, "Model returned malformed JSON");
        LlmError::parse(e.to_string(), &cleaned)
    })
}

/// Generate a free-form text block (e.g. source code) with fences removed.
pub async fn generate_block(generator: &dyn TextGenerator, prompt: &str) -> LlmResult<String> {
    let raw = generator.generate_text(prompt).await?;
    let cleaned = strip_code_fences(&raw);

    if cleaned.is_empty() {
        return Err(LlmError::parse("model returned an empty block", &raw));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    #[test]
    fn test_strip_json_fence() {
        assert_eq!(strip_code_fences("```json\n[1,2]\n```"), "[1,2]");
    }

    #[test]
    fn test_strip_plain_fence() {
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_no_fence_is_only_trimmed() {
        assert_eq!(strip_code_fences("  [1, 2]\n"), "[1, 2]");
        assert_eq!(strip_code_fences("plain text"), "plain text");
    }

    #[test]
    fn test_single_line_fence() {
        assert_eq!(strip_code_fences("```[1,2]```"), "[1,2]");
    }

    #[test]
    fn test_preamble_before_fence() {
        let text = "Here is the scene:\n```python\nfrom manim import *\n```\nEnjoy!";
        assert_eq!(strip_code_fences(text), "from manim import *");
    }

    #[test]
    fn test_unterminated_fence() {
        assert_eq!(strip_code_fences("```python\nprint(1)\n"), "print(1)");
    }

    #[test]
    fn test_inline_backticks_do_not_open_a_fence() {
        let script = "from manim import *\nlabel = Text(\"```\")\nself.play(Write(label))";
        assert_eq!(strip_code_fences(script), script);
    }

    #[test]
    fn test_inline_backticks_inside_fenced_block_are_kept() {
        let text = "```python\nlabel = Text(\"a ``` b\")\n```";
        assert_eq!(strip_code_fences(text), "label = Text(\"a ``` b\")");
    }

    #[tokio::test]
    async fn test_generate_structured_parses_fenced_json() {
        let generator = ScriptedGenerator::new(["```json\n[\"one\", \"two\"]\n```"]);
        let lines: Vec<String> = generate_structured(&generator, "p").await.unwrap();
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_generate_structured_wrong_shape_is_parse_error() {
        let generator = ScriptedGenerator::new(["{\"not\": \"an array\"}"]);
        let result: LlmResult<Vec<String>> = generate_structured(&generator, "p").await;
        match result {
            Err(LlmError::Parse { excerpt, .. }) => assert!(excerpt.contains("not")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_block_rejects_empty() {
        let generator = ScriptedGenerator::new(["```python\n```"]);
        let result = generate_block(&generator, "p").await;
        assert!(matches!(result, Err(LlmError::Parse { .. })));
    }
}
