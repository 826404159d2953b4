//! Solution approaches produced by problem analysis.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::error::{ModelError, ModelResult};

/// Source languages an approach may carry code for.
///
/// Declaration order is the preference order used when one implementation
/// has to be picked for narration and animation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Python,
    Cpp,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Java,
        Language::Python,
        Language::Cpp,
        Language::JavaScript,
    ];

    /// Key used for this language inside an approach's `code` object.
    pub fn code_key(&self) -> &'static str {
        match self {
            Language::Java => "javaCode",
            Language::Python => "pythonCode",
            Language::Cpp => "cppCode",
            Language::JavaScript => "javascriptCode",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Python => "python",
            Language::Cpp => "cpp",
            Language::JavaScript => "javascript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-language source code of an approach.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeSamples {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpp_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub javascript_code: Option<String>,
}

impl CodeSamples {
    /// Source text for a language, if present and non-blank.
    pub fn get(&self, language: Language) -> Option<&str> {
        let code = match language {
            Language::Java => self.java_code.as_deref(),
            Language::Python => self.python_code.as_deref(),
            Language::Cpp => self.cpp_code.as_deref(),
            Language::JavaScript => self.javascript_code.as_deref(),
        };
        code.filter(|c| !c.trim().is_empty())
    }

    /// Set the source text for a language.
    pub fn with(mut self, language: Language, code: impl Into<String>) -> Self {
        let slot = match language {
            Language::Java => &mut self.java_code,
            Language::Python => &mut self.python_code,
            Language::Cpp => &mut self.cpp_code,
            Language::JavaScript => &mut self.javascript_code,
        };
        *slot = Some(code.into());
        self
    }

    /// Non-blank samples in preference order.
    pub fn iter(&self) -> impl Iterator<Item = (Language, &str)> + '_ {
        Language::ALL
            .into_iter()
            .filter_map(move |lang| self.get(lang).map(|code| (lang, code)))
    }

    /// The preferred sample.
    pub fn primary(&self) -> Option<(Language, &str)> {
        self.iter().next()
    }

    pub fn is_empty(&self) -> bool {
        self.primary().is_none()
    }
}

/// One candidate solution to a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Approach {
    #[validate(length(min = 1, message = "approach title must not be empty"))]
    pub title: String,

    #[serde(default)]
    pub time_complexity: String,

    #[serde(default)]
    pub space_complexity: String,

    #[serde(default)]
    pub description: String,

    pub code: CodeSamples,

    #[serde(default)]
    pub pros: Vec<String>,

    #[serde(default)]
    pub cons: Vec<String>,

    #[serde(default)]
    pub concepts: Vec<String>,
}

impl Approach {
    /// Minimal approach with a title and a single implementation.
    pub fn new(title: impl Into<String>, language: Language, code: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            time_complexity: String::new(),
            space_complexity: String::new(),
            description: String::new(),
            code: CodeSamples::default().with(language, code),
            pros: Vec::new(),
            cons: Vec::new(),
            concepts: Vec::new(),
        }
    }

    /// Validate an approach received from the model or a client.
    pub fn check(&self) -> ModelResult<()> {
        self.validate()?;
        if self.code.is_empty() {
            return Err(ModelError::MissingSourceCode(self.title.clone()));
        }
        Ok(())
    }

    /// The implementation narrated and animated for this approach.
    pub fn primary_source(&self) -> ModelResult<&str> {
        self.code
            .primary()
            .map(|(_, code)| code)
            .ok_or_else(|| ModelError::MissingSourceCode(self.title.clone()))
    }
}

/// Result of analysing a problem statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Canonical problem title
    pub title: String,
    /// Candidate approaches, simplest first
    pub approaches: Vec<Approach>,
}

impl AnalysisResult {
    pub fn check(&self) -> ModelResult<()> {
        if self.approaches.is_empty() {
            return Err(ModelError::NoApproaches);
        }
        self.approaches.iter().try_for_each(Approach::check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_from_minimal_json() {
        let approach: Approach = serde_json::from_str(
            r#"{"title": "Bubble Sort", "code": {"javaCode": "class A {}"}}"#,
        )
        .unwrap();

        assert_eq!(approach.title, "Bubble Sort");
        assert!(approach.pros.is_empty());
        assert_eq!(approach.primary_source().unwrap(), "class A {}");
        assert!(approach.check().is_ok());
    }

    #[test]
    fn test_approach_serializes_camel_case() {
        let mut approach = Approach::new("Two Pointers", Language::Python, "def f(): pass");
        approach.time_complexity = "O(n)".to_string();

        let json = serde_json::to_value(&approach).unwrap();
        assert_eq!(json["timeComplexity"], "O(n)");
        assert_eq!(json["code"]["pythonCode"], "def f(): pass");
        assert!(json["code"].get("javaCode").is_none());
    }

    #[test]
    fn test_language_wire_names_match_display() {
        for language in Language::ALL {
            let json = serde_json::to_value(language).unwrap();
            assert_eq!(json, language.as_str());
        }
        let parsed: Language = serde_json::from_str("\"javascript\"").unwrap();
        assert_eq!(parsed, Language::JavaScript);
    }

    #[test]
    fn test_primary_source_prefers_java() {
        let code = CodeSamples::default()
            .with(Language::Python, "py")
            .with(Language::Java, "java");
        assert_eq!(code.primary(), Some((Language::Java, "java")));
    }

    #[test]
    fn test_blank_code_is_ignored() {
        let code = CodeSamples::default()
            .with(Language::Java, "   ")
            .with(Language::Cpp, "int main() {}");
        assert_eq!(code.primary(), Some((Language::Cpp, "int main() {}")));
        assert_eq!(code.iter().count(), 1);
    }

    #[test]
    fn test_check_rejects_missing_code() {
        let approach: Approach =
            serde_json::from_str(r#"{"title": "Empty", "code": {}}"#).unwrap();
        assert_eq!(
            approach.check(),
            Err(ModelError::MissingSourceCode("Empty".to_string()))
        );
    }

    #[test]
    fn test_check_rejects_empty_title() {
        let approach = Approach::new("", Language::Java, "x");
        assert!(matches!(approach.check(), Err(ModelError::Validation(_))));
    }

    #[test]
    fn test_analysis_requires_approaches() {
        let analysis = AnalysisResult {
            title: "Two Sum".to_string(),
            approaches: vec![],
        };
        assert_eq!(analysis.check(), Err(ModelError::NoApproaches));
    }
}
