//! Splits one LLM response blob into an ordered list of `(filename, body)` pairs (§4.3).
//!
//! Grounded on `code_generator.py::generate_code`'s `FILE:` marker scan (`r"(?m)^(?:#|//)\s*FILE:\s*(.+)$"`)
//! with its fenced-code-block and whole-text fallbacks.

use crate::model::ProgrammingLanguage;
use once_cell::sync::Lazy;
use regex::Regex;

static FILE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(?:#|//)\s*FILE:\s*(.+)$").unwrap());

static FENCE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[^\n]*\n([\s\S]*?)```").unwrap());

static LEADING_FILENAME_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?:#|//)\s*(?:filename|file|path):\s*(\S+)").unwrap());

static JAVA_PUBLIC_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"public\s+class\s+(\w+)").unwrap());

/// One file extracted from a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSegment {
    pub filename: String,
    pub body: String,
}

pub fn split(text: &str, language: ProgrammingLanguage) -> Vec<SplitSegment> {
    let by_marker = split_by_markers(text);
    if !by_marker.is_empty() {
        return by_marker;
    }

    let by_fence = split_by_fences(text, language);
    if !by_fence.is_empty() {
        return by_fence;
    }

    vec![SplitSegment { filename: synthesize_filename(0, language), body: text.trim().to_string() }]
}

fn split_by_markers(text: &str) -> Vec<SplitSegment> {
    let matches: Vec<_> = FILE_MARKER.find_iter(text).collect();
    if matches.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    for (i, m) in matches.iter().enumerate() {
        let captures = FILE_MARKER.captures(&text[m.start()..m.end()]).unwrap();
        let filename = captures.get(1).unwrap().as_str().trim().to_string();

        let body_start = m.end();
        let body_end = matches.get(i + 1).map(|next| next.start()).unwrap_or(text.len());
        let body = strip_fences(text[body_start..body_end].trim());

        segments.push(SplitSegment { filename, body });
    }
    segments
}

fn split_by_fences(text: &str, language: ProgrammingLanguage) -> Vec<SplitSegment> {
    let mut segments = Vec::new();
    for (i, m) in FENCE_BLOCK.captures_iter(text).enumerate() {
        let body = m.get(1).unwrap().as_str();
        let filename = infer_fence_filename(body, i, language);
        let body = strip_leading_filename_comment(body).trim().to_string();
        segments.push(SplitSegment { filename, body });
    }
    segments
}

fn infer_fence_filename(body: &str, index: usize, language: ProgrammingLanguage) -> String {
    if let Some(first_line) = body.lines().next() {
        if let Some(captures) = LEADING_FILENAME_COMMENT.captures(first_line) {
            return captures.get(1).unwrap().as_str().to_string();
        }
    }

    if language == ProgrammingLanguage::Java {
        if let Some(captures) = JAVA_PUBLIC_CLASS.captures(body) {
            return format!("{}.java", captures.get(1).unwrap().as_str());
        }
    }

    synthesize_filename(index, language)
}

fn strip_leading_filename_comment(body: &str) -> &str {
    let mut lines = body.lines();
    match lines.next() {
        Some(first) if LEADING_FILENAME_COMMENT.is_match(first) => {
            body.splitn(2, '\n').nth(1).unwrap_or("")
        }
        _ => body,
    }
}

/// Drop a single leading and/or trailing fence line (` ``` ` optionally with a language tag),
/// left over when the LLM wraps `FILE:`-marked content in a fence anyway.
fn strip_fences(body: &str) -> String {
    let mut lines: Vec<&str> = body.lines().collect();
    if lines.first().is_some_and(|l| l.trim_start().starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim() == "```") {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

fn synthesize_filename(index: usize, language: ProgrammingLanguage) -> String {
    let ext = match language {
        ProgrammingLanguage::Python => "py",
        ProgrammingLanguage::Java => "java",
    };
    format!("generated_{index}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_file_markers_across_comment_styles() {
        let text = "# FILE: src/main.py\nprint('hi')\n// FILE: src/Util.java\nclass Util {}\n";
        let segments = split(text, ProgrammingLanguage::Python);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].filename, "src/main.py");
        assert_eq!(segments[0].body, "print('hi')");
        assert_eq!(segments[1].filename, "src/Util.java");
    }

    #[test]
    fn falls_back_to_fenced_blocks_deriving_java_class_name() {
        let text = "Here is the code:\n```java\npublic class Greeter {\n    // body\n}\n```\n";
        let segments = split(text, ProgrammingLanguage::Java);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].filename, "Greeter.java");
    }

    #[test]
    fn falls_back_to_whole_text_with_synthesized_name() {
        let text = "print('just a blob, no markers or fences')";
        let segments = split(text, ProgrammingLanguage::Python);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].filename, "generated_0.py");
        assert_eq!(segments[0].body, text);
    }

    #[test]
    fn honors_leading_filename_comment_inside_a_fence() {
        let text = "```python\n# filename: app/config.py\nDEBUG = True\n```\n";
        let segments = split(text, ProgrammingLanguage::Python);
        assert_eq!(segments[0].filename, "app/config.py");
        assert_eq!(segments[0].body, "DEBUG = True");
    }
}
