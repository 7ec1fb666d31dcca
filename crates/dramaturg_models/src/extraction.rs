//! Recovering JSON from model prose.
//!
//! Model replies often wrap JSON in markdown fences, surround it with
//! commentary, or get cut off mid-structure when the output token limit is
//! reached. [`extract_json`] tries, in order:
//!
//! 1. The whole reply as JSON
//! 2. A fenced code block (```json preferred, then any fence)
//! 3. The widest brace/bracket span, then the first balanced structure
//! 4. Truncation repair: cut back to the last closer, or close what is open

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, trace};

static SPAN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)[\{\[].*[\}\]]").ok());

/// Extract a JSON value from a model reply.
///
/// Returns `None` when no strategy yields valid JSON.
///
/// # Examples
///
/// ```
/// use dramaturg_models::extract_json;
/// use serde_json::json;
///
/// let reply = "Here you go:\n```json\n{\"names\": [\"Layla\", \"Omar\"]}\n```\nAnything else?";
/// assert_eq!(extract_json(reply), Some(json!({"names": ["Layla", "Omar"]})));
///
/// // Cut off by the token limit
/// let truncated = "{\"names\": [\"Layla\", \"Om";
/// assert_eq!(extract_json(truncated), Some(json!({"names": ["Layla", "Om"]})));
/// ```
pub fn extract_json(response: &str) -> Option<Value> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        trace!("Reply parsed directly");
        return Some(value);
    }

    if let Some(block) = extract_from_code_block(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(&block) {
            trace!("Reply parsed from fenced block");
            return Some(value);
        }
        // A fenced but truncated reply is repaired from the fence contents,
        // so surrounding prose cannot leak brackets into the repair.
        if let Some(value) = repair_truncated(&block) {
            debug!("Repaired truncated JSON inside fenced block");
            return Some(value);
        }
    }

    if let Some(value) = extract_span(trimmed) {
        trace!("Reply parsed from embedded span");
        return Some(value);
    }

    let value = repair_truncated(trimmed);
    if value.is_some() {
        debug!(response_length = response.len(), "Repaired truncated JSON");
    } else {
        debug!(response_length = response.len(), "No JSON recoverable from reply");
    }
    value
}

/// Remove `null` object members recursively and drop `null` array items.
///
/// Lets `#[serde(default)]` fields take their defaults when a model writes
/// `null` for a value it could not determine.
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(strip_nulls)
                .collect(),
        ),
        other => other,
    }
}

/// Contents of the first fenced block, preferring ```json.
///
/// An unterminated fence yields everything after the opening line.
fn extract_from_code_block(response: &str) -> Option<String> {
    let pattern = "```json";
    if let Some(start) = response.find(pattern) {
        let content_start = start + pattern.len();
        return Some(match response[content_start..].find("```") {
            Some(end) => response[content_start..content_start + end].trim().to_string(),
            None => response[content_start..].trim().to_string(),
        });
    }

    let start = response.find("```")?;
    let content_start = start + 3;
    // Skip a language tag on the fence line
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);

    Some(match response[skip_to..].find("```") {
        Some(end) => response[skip_to..skip_to + end].trim().to_string(),
        None => response[skip_to..].trim().to_string(),
    })
}

/// Widest brace/bracket span, then the first balanced structure.
fn extract_span(response: &str) -> Option<Value> {
    if let Some(regex) = SPAN.as_ref()
        && let Some(found) = regex.find(response)
        && let Ok(value) = serde_json::from_str::<Value>(found.as_str())
    {
        return Some(value);
    }

    let open_pos = response.find(['{', '['])?;
    let (open, close) = if response[open_pos..].starts_with('{') {
        ('{', '}')
    } else {
        ('[', ']')
    };
    let candidate = extract_balanced(&response[open_pos..], open, close)?;
    serde_json::from_str::<Value>(candidate).ok()
}

/// Prefix of `response` up to the delimiter matching its first `open`.
fn extract_balanced(response: &str, open: char, close: char) -> Option<&str> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&response[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Recover a value from a reply cut off mid-structure.
fn repair_truncated(response: &str) -> Option<Value> {
    let start = response.find(['{', '['])?;
    let body = &response[start..];

    // Cut back to the last closer
    if let Some(last) = body.rfind(['}', ']'])
        && let Ok(value) = serde_json::from_str::<Value>(&body[..=last])
    {
        return Some(value);
    }

    let scan = scan_structure(body);

    // Close everything still open at the end
    let mut closed = body.trim_end().to_string();
    if scan.in_string {
        closed.push('"');
    }
    if let Some(value) = close_and_parse(closed, &scan.open_stack) {
        return Some(value);
    }

    // Drop the incomplete trailing member and close from the last separator
    let (comma, stack) = scan.last_separator?;
    close_and_parse(body[..comma].to_string(), &stack)
}

struct StructureScan {
    in_string: bool,
    open_stack: Vec<char>,
    last_separator: Option<(usize, Vec<char>)>,
}

fn scan_structure(body: &str) -> StructureScan {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;
    let mut last_separator = None;

    for (i, ch) in body.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if in_string {
            match ch {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            ',' => last_separator = Some((i, stack.clone())),
            _ => {}
        }
    }

    StructureScan {
        in_string,
        open_stack: stack,
        last_separator,
    }
}

fn close_and_parse(mut text: String, stack: &[char]) -> Option<Value> {
    loop {
        let trimmed = text.trim_end();
        if let Some(stripped) = trimmed.strip_suffix(',') {
            text = stripped.to_string();
        } else {
            text.truncate(trimmed.len());
            break;
        }
    }
    if text.ends_with(':') {
        text.push_str("null");
    }
    for closer in stack.iter().rev() {
        text.push(*closer);
    }
    serde_json::from_str::<Value>(&text).ok()
}
