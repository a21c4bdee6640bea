//! Recovery of a JSON object from free-form model output.
//!
//! Generative models wrap their JSON in markdown fences, lead with commentary, or trail off
//! with explanations. [`extract_json`] tries, in order:
//!
//! 1. the first fenced block (` ```json ... ``` ` or a bare ` ``` ... ``` `),
//! 2. the whole text, trimmed,
//! 3. every top-level balanced `{...}` span, left to right.
//!
//! The first candidate that parses as a JSON *object* wins.

use crate::error::{FinancialRatioError, Result};
use log::debug;
use serde_json::Value;

const FENCE: &str = "```";

pub fn extract_json(text: &str) -> Result<Value> {
    if let Some(body) = fenced_object(text) {
        if let Some(value) = parse_object(body) {
            return Ok(value);
        }
        debug!("Fenced block did not contain a valid JSON object");
    }

    if let Some(value) = parse_object(text.trim()) {
        return Ok(value);
    }

    for candidate in balanced_objects(text) {
        if let Some(value) = parse_object(candidate) {
            return Ok(value);
        }
    }

    Err(FinancialRatioError::ParseError {
        text: text.to_string(),
    })
}

fn parse_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// The `{...}` content of the first fenced block, from its first `{` to its last `}`.
fn fenced_object(text: &str) -> Option<&str> {
    let open = text.find(FENCE)?;
    let after_open = &text[open + FENCE.len()..];

    // Skip an optional language tag such as `json` or `JSON`.
    let tag_len = after_open
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(after_open.len());
    let body_and_rest = &after_open[tag_len..];

    let close = body_and_rest.find(FENCE)?;
    let body = &body_and_rest[..close];

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&body[start..=end])
}

/// Every maximal, non-overlapping balanced `{...}` span in `text`, left to right. Braces inside
/// JSON string literals are not counted.
fn balanced_objects(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if depth > 0 && in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = idx;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=idx]);
                }
            }
            _ => {}
        }
    }

    spans
}
