use regex::Regex;
use std::sync::LazyLock;

static LIST_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+[).]\s*").unwrap());

/// Unify line endings to `\n` and em/en dashes to `-`.
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace(['\u{2014}', '\u{2013}'], "-")
}

/// Strip a leading `12.` / `3)` list marker and surrounding whitespace.
pub fn strip_list_prefix(line: &str) -> &str {
    let line = line.trim();
    match LIST_PREFIX.find(line) {
        Some(prefix) => line[prefix.end()..].trim(),
        None => line,
    }
}

pub fn has_list_prefix(line: &str) -> bool {
    LIST_PREFIX.is_match(line.trim_start())
}

/// Every non-empty line of `span`, with list markers stripped.
///
/// A line holding nothing but a marker is dropped.
pub fn split_questions(span: &str) -> Vec<String> {
    span.lines()
        .map(strip_list_prefix)
        .filter(|question| !question.is_empty())
        .map(str::to_string)
        .collect()
}

/// Only the lines of `span` that carry a list marker, stripped.
pub fn numbered_questions(span: &str) -> Vec<String> {
    span.lines()
        .filter(|line| has_list_prefix(line))
        .map(strip_list_prefix)
        .filter(|question| !question.is_empty())
        .map(str::to_string)
        .collect()
}
