//! Narration scripts spoken over an animation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Ordered, non-empty sequence of plain-text narration lines.
///
/// Each line is one spoken beat. Lines are normalised on construction so
/// the same text can be fed to a speech engine and embedded in a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct NarrationScript {
    lines: Vec<String>,
}

impl NarrationScript {
    /// Build a script from raw lines, dropping blank lines and markup.
    pub fn from_lines<I, S>(lines: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<String> = lines
            .into_iter()
            .map(|line| strip_markup(line.as_ref()))
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            return Err(ModelError::EmptyNarration);
        }

        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Full spoken text: lines joined with sentence punctuation.
    pub fn transcript(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                if line.ends_with(|c: char| matches!(c, '.' | '!' | '?')) {
                    line.clone()
                } else {
                    format!("{}.", line)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lines numbered from 1, one per row, for embedding in prompts.
    pub fn numbered(&self) -> String {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{}. {}", i + 1, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'de> Deserialize<'de> for NarrationScript {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let lines = Vec::<String>::deserialize(deserializer)?;
        Self::from_lines(lines).map_err(serde::de::Error::custom)
    }
}

/// Remove markdown decoration the model tends to add to spoken lines.
fn strip_markup(line: &str) -> String {
    let mut line = line.trim();

    line = line.trim_start_matches('#').trim_start();
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            line = rest.trim_start();
        }
    }

    line.chars()
        .filter(|c| !matches!(c, '*' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}
