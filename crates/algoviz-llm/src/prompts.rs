//! Prompt builders.

use algoviz_models::{AnalysisResult, NarrationScript};

/// Scene class every generated animation script must define.
pub const SCENE_CLASS: &str = "AlgorithmDemo";

/// Narration beats requested per approach.
pub const NARRATION_LINES: std::ops::RangeInclusive<usize> = 5..=8;

/// JSON schema of [`AnalysisResult`], pretty-printed for embedding.
pub fn analysis_schema() -> String {
    let schema = schemars::schema_for!(AnalysisResult);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Prompt asking for candidate approaches to a DSA problem.
pub fn build_analysis_prompt(question: &str) -> String {
    format!(
        r#"You are an expert competitive programmer and teacher.

Analyse the following data structures and algorithms problem and propose
between 2 and 4 distinct solution approaches, from the most naive to the most
optimal.

PROBLEM:
{question}

For every approach provide a short title, time and space complexity in big-O
notation, a plain-English description, complete and runnable code in Java,
Python, C++ and JavaScript, and short lists of pros, cons and the core concepts
involved.

IMPORTANT: Return ONLY a single JSON object matching this JSON schema.
The "code" object uses the keys "javaCode", "pythonCode", "cppCode" and
"javascriptCode". Do not wrap the JSON in markdown.

{schema}"#,
        question = question.trim(),
        schema = analysis_schema(),
    )
}

/// Prompt asking for spoken narration of a piece of source code.
pub fn build_narration_prompt(source_code: &str) -> String {
    format!(
        r#"You are narrating a short animated video that explains how the
following algorithm works.

CODE:
{source_code}

Write between {min} and {max} short narration lines. Each line is one spoken
beat of the video and must be a single plain sentence: no markdown, no code,
no bullet characters, no numbering.

IMPORTANT: Return ONLY a JSON array of strings, for example:
["First line.", "Second line."]"#,
        source_code = source_code.trim(),
        min = NARRATION_LINES.start(),
        max = NARRATION_LINES.end(),
    )
}

/// Prompt asking for a Manim scene that animates the narration.
pub fn build_script_prompt(source_code: &str, narration: &NarrationScript) -> String {
    format!(
        r#"You write Manim Community Edition (v0.18) Python scripts that visualise algorithms.

Write a complete Python file that animates the algorithm below, in sync with
the narration. The narration will be played as a voice-over; spend roughly
3 to 5 seconds of animation on each narration line, in order.

CODE:
{source_code}

NARRATION:
{narration}

STRICT RULES:
- Start with `from manim import *`.
- Define exactly one scene: `class {scene}(Scene):` with a `construct(self)` method.
- Use only Text, Square, Rectangle, Circle, Arrow, Line, VGroup, SurroundingRectangle
  and the standard animations (Create, Write, FadeIn, FadeOut, Transform, Indicate, self.wait).
- Do NOT use MathTex, Tex or anything that requires LaTeX.
- Do NOT read files, import other modules, or use external assets.
- Keep every object inside the default frame.
- Return ONLY the Python code, no explanations."#,
        source_code = source_code.trim(),
        narration = narration.numbered(),
        scene = SCENE_CLASS,
    )
}
