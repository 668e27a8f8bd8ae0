//! Textual repair of almost-JSON payloads.
//!
//! When a located payload fails to parse, a fixed sequence of transforms is
//! applied cumulatively, re-attempting a parse after each one and stopping at
//! the first success. The sequence runs from least to most destructive;
//! longest-valid-prefix extraction is the last resort for truncated
//! responses.

use tessera_error::{IngestError, IngestErrorKind};

/// A successful repair: the parsed value plus the transforms that were needed.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// The parsed JSON value
    pub value: serde_json::Value,
    /// Names of the transforms applied before the parse succeeded, in order
    pub applied: Vec<&'static str>,
}

/// The fixed repair sequence. Order matters.
const TRANSFORMS: &[(&str, fn(&str) -> String)] = &[
    ("strip-control-chars", strip_control_chars),
    ("normalize-quotes", normalize_quotes),
    ("remove-trailing-commas", remove_trailing_commas),
    ("balance-brackets", balance_brackets),
];

/// Attempt to repair an unparseable JSON payload.
///
/// # Errors
///
/// Returns `RepairExhausted` when no transform in the sequence (including
/// longest-valid-prefix extraction) produces parseable JSON.
///
/// # Examples
///
/// ```
/// use tessera_ingest::repair;
///
/// let outcome = repair(r#"{"characters": [],}"#).unwrap();
/// assert!(outcome.applied.contains(&"remove-trailing-commas"));
/// ```
#[tracing::instrument(skip_all, fields(length = text.len()))]
pub fn repair(text: &str) -> Result<RepairOutcome, IngestError> {
    let mut current = text.to_string();
    let mut applied = Vec::new();
    let mut last_error = String::new();

    for (name, transform) in TRANSFORMS {
        current = transform(&current);
        applied.push(*name);
        match serde_json::from_str(&current) {
            Ok(value) => {
                tracing::debug!(transforms = ?applied, "Repair succeeded");
                return Ok(RepairOutcome { value, applied });
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    // Last resort: cut back to the longest prefix that closes cleanly.
    applied.push("longest-valid-prefix");
    if let Some(value) = longest_valid_prefix(&current) {
        tracing::debug!(transforms = ?applied, "Repair succeeded via prefix extraction");
        return Ok(RepairOutcome { value, applied });
    }

    tracing::warn!(error = %last_error, "Repair exhausted, response unrecoverable");
    Err(IngestError::new(IngestErrorKind::RepairExhausted {
        attempts: applied.len(),
        message: last_error,
    }))
}

/// Remove control characters that providers occasionally emit mid-string.
///
/// Newlines, carriage returns, and tabs survive; raw control characters
/// inside string literals are what break the parser.
fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Replace typographic quotes with their ASCII equivalents.
fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{201f}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

/// Remove commas that directly precede a closing brace or bracket.
fn remove_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escape_next = false;
    let chars: Vec<char> = text.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if escape_next {
            escape_next = false;
            out.push(c);
            continue;
        }
        match c {
            '\\' if in_string => {
                escape_next = true;
                out.push(c);
            }
            '"' => {
                in_string = !in_string;
                out.push(c);
            }
            ',' if !in_string => {
                // Drop the comma when the next non-whitespace closes a container
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Append the closing delimiters a truncated payload is missing.
fn balance_brackets(text: &str) -> String {
    // Trimming a dangling `,`/`:` cannot change the bracket stack.
    let trimmed = trim_dangling_tail(text);
    match closers_for(&trimmed) {
        Some(closers) if !closers.is_empty() => format!("{}{}", trimmed, closers),
        _ => text.to_string(),
    }
}

/// Compute the closing sequence needed to balance `text`, or `None` when the
/// text is malformed beyond bracket counting (e.g. mismatched closers).
fn closers_for(text: &str) -> Option<String> {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;

    for c in text.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => stack.push('}'),
            '[' if !in_string => stack.push(']'),
            '}' | ']' if !in_string => {
                if stack.pop() != Some(c) {
                    return None;
                }
            }
            _ => {}
        }
    }

    let mut closers = String::new();
    if in_string {
        closers.push('"');
    }
    while let Some(c) = stack.pop() {
        closers.push(c);
    }
    Some(closers)
}

/// Trim a dangling `,` or `:` (plus whitespace) from the end of a truncated
/// payload so appended closers produce valid JSON.
fn trim_dangling_tail(text: &str) -> String {
    let trimmed = text.trim_end();
    let trimmed = trimmed.strip_suffix([',', ':']).unwrap_or(trimmed);
    trimmed.trim_end().to_string()
}

/// Find the longest prefix that parses once balanced, cutting back through
/// candidate points that end a complete JSON value.
fn longest_valid_prefix(text: &str) -> Option<serde_json::Value> {
    let mut cut_points = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => {
                in_string = !in_string;
                if !in_string {
                    cut_points.push(i + c.len_utf8());
                }
            }
            '}' | ']' if !in_string => cut_points.push(i + 1),
            c if !in_string && (c.is_ascii_alphanumeric() || c == '.') => {
                cut_points.push(i + 1);
            }
            _ => {}
        }
    }

    for &cut in cut_points.iter().rev() {
        let prefix = trim_dangling_tail(&text[..cut]);
        if prefix.is_empty() {
            continue;
        }
        let Some(closers) = closers_for(&prefix) else {
            continue;
        };
        let candidate = format!("{}{}", prefix, closers);
        if let Ok(value) = serde_json::from_str(&candidate) {
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_comma_removed() {
        let outcome = repair(r#"{"characters": ["Rei",], "events": [],}"#).unwrap();
        assert_eq!(outcome.value["characters"][0], "Rei");
    }

    #[test]
    fn test_smart_quotes_normalized() {
        let outcome = repair("{\u{201c}name\u{201d}: \u{201c}Rei\u{201d}}").unwrap();
        assert_eq!(outcome.value["name"], "Rei");
    }

    #[test]
    fn test_control_chars_stripped() {
        let outcome = repair("{\"name\": \"Re\u{0007}i\"}").unwrap();
        assert_eq!(outcome.value["name"], "Rei");
    }

    #[test]
    fn test_unbalanced_brackets_closed() {
        let outcome = repair(r#"{"characters": [{"name": "Rei""#).unwrap();
        assert_eq!(outcome.value["characters"][0]["name"], "Rei");
        assert!(outcome.applied.contains(&"balance-brackets"));
    }

    #[test]
    fn test_truncated_mid_value_uses_prefix() {
        // Truncated after a key and colon; only cutting back to the last
        // complete element recovers anything.
        let outcome = repair(r#"{"events": [{"title": "Duel", "page": 4}, {"title":"#).unwrap();
        assert_eq!(outcome.value["events"][0]["title"], "Duel");
    }

    #[test]
    fn test_hopeless_text_errors() {
        assert!(repair("no structure here at all").is_err());
    }

    #[test]
    fn test_already_valid_json_reports_first_transform() {
        // Valid input reaching repair still parses after the first transform.
        let outcome = repair(r#"{"ok": true}"#).unwrap();
        assert_eq!(outcome.applied, vec!["strip-control-chars"]);
    }
}
