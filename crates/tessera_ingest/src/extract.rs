//! Locating JSON payloads in raw model text.
//!
//! Responses often wrap JSON in markdown code blocks, mix it with explanatory
//! prose, or introduce it with a label like `JSON:`. The strategies here are
//! tried in order and the first hit wins.

use tessera_error::{IngestError, IngestErrorKind};

/// Extract a JSON payload from a response that may contain markdown or prose.
///
/// Strategies, in order:
/// 1. The whole text, when it already parses as JSON
/// 2. Markdown code blocks: ```json ... ```
/// 3. Outermost balanced `{...}` or `[...]` span
/// 4. Text following a labelled prefix (`JSON:`, `Result:`, `Output:`, ...)
///
/// # Errors
///
/// Returns an error if no candidate payload is found. The candidate is not
/// guaranteed to parse; callers fall through to the repair pass.
///
/// # Examples
///
/// ```
/// use tessera_ingest::extract_json;
///
/// let response = "Here's the extraction:\n\
///     \n\
///     ```json\n\
///     {\"characters\": []}\n\
///     ```\n";
///
/// let json = extract_json(response).unwrap();
/// assert!(json.contains("characters"));
/// ```
pub fn extract_json(response: &str) -> Result<String, IngestError> {
    locate_payload(response).ok_or_else(|| {
        tracing::error!(
            response_length = response.len(),
            "No JSON found in model response"
        );
        IngestError::new(IngestErrorKind::NoJsonFound {
            length: response.len(),
        })
    })
}

/// Locate the most plausible JSON payload, or `None` when no strategy hits.
pub fn locate_payload(response: &str) -> Option<String> {
    let trimmed = response.trim();

    // Strategy 1: the response is already bare JSON
    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Some(trimmed.to_string());
    }

    // Strategy 2: markdown code blocks
    if let Some(json) = extract_from_code_block(response, "json") {
        return Some(json);
    }

    // Strategy 3: balanced spans, preferring whichever opens first
    if let Some(json) = extract_first_balanced(response) {
        return Some(json);
    }

    // Strategy 4: labelled prefix; take a balanced span after the label
    if let Some(rest) = after_labelled_prefix(response) {
        if let Some(json) = extract_first_balanced(rest) {
            return Some(json);
        }
        let rest = rest.trim();
        if !rest.is_empty() {
            return Some(rest.to_string());
        }
    }

    None
}

/// Extract content from markdown code blocks.
///
/// Looks for patterns like:
/// - ```language\n...\n```
/// - ``` ... ``` (no language specified)
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    // Pattern: ```language\n...\n```
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        if let Some(end) = response[content_start..].find("```") {
            let content = &response[content_start..content_start + end];
            return Some(content.trim().to_string());
        }
        // No closing fence found - likely truncated response
        // Return content from opening fence to end
        return Some(response[content_start..].trim().to_string());
    }

    // Try without language specifier
    if let Some(start) = response.find("```") {
        let content_start = start + 3;
        // Skip to next newline (in case there's a language specifier)
        let skip_to = response[content_start..]
            .find('\n')
            .map(|n| content_start + n + 1)
            .unwrap_or(content_start);

        if let Some(end) = response[skip_to..].find("```") {
            let content = &response[skip_to..skip_to + end];
            return Some(content.trim().to_string());
        }
        // No closing fence found - likely truncated response
        // Return content from opening fence to end
        return Some(response[skip_to..].trim().to_string());
    }

    None
}

/// Balanced-span extraction, preferring whichever delimiter opens first.
fn extract_first_balanced(response: &str) -> Option<String> {
    let bracket_pos = response.find('[');
    let brace_pos = response.find('{');

    match (bracket_pos, brace_pos) {
        (Some(b_pos), Some(c_pos)) if b_pos < c_pos => extract_balanced(response, '[', ']')
            .or_else(|| extract_balanced(response, '{', '}')),
        (Some(_), None) => extract_balanced(response, '[', ']'),
        (None, Some(_)) => extract_balanced(response, '{', '}'),
        (Some(_), Some(_)) => extract_balanced(response, '{', '}')
            .or_else(|| extract_balanced(response, '[', ']')),
        (None, None) => None,
    }
}

/// Extract content between balanced delimiters.
///
/// Finds the first occurrence of `open` and extracts content up to
/// the matching `close`, handling nesting and string literals correctly.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Strip a labelled prefix like `JSON:` or `Result:` and return the rest.
fn after_labelled_prefix(response: &str) -> Option<&str> {
    // Labels the extraction prompts have been seen to elicit.
    static LABEL: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let label = LABEL.get_or_init(|| {
        regex::Regex::new(r"(?im)^\s*(?:json|result|output|answer|response)\s*:\s*")
            .expect("labelled prefix pattern is valid")
    });
    label.find(response).map(|m| &response[m.end()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let response = r#"
Here's the extraction you requested:

```json
{
  "characters": [],
  "events": []
}
```

Hope this helps!
"#;
        let json = extract_json(response).unwrap();
        assert!(json.contains("\"characters\""));
    }

    #[test]
    fn test_extract_json_balanced_braces() {
        let response = r#"
Sure! Here it is: {"characters": [], "nested": {"value": "test"}}
"#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_extract_json_array() {
        let response = r#"
Here are the events:
[
  {"id": "event-1"},
  {"id": "event-2"}
]
"#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('['));
        assert!(json.ends_with(']'));
    }

    #[test]
    fn test_extract_after_labelled_prefix() {
        let response = "Result: {\"characters\": []}";
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
    }

    #[test]
    fn test_no_json_found() {
        let response = "This is just plain text with no payload";
        assert!(extract_json(response).is_err());
    }

    #[test]
    fn test_extract_json_with_string_escapes() {
        let response = r#"{"text": "She said \"run\""}"#;
        let json = extract_json(response).unwrap();
        assert!(json.contains("She said"));
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        let response = r#"prefix {"title": "scene {interior}", "page": 3} suffix"#;
        let json = extract_json(response).unwrap();
        assert!(json.ends_with('}'));
        assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
    }

    #[test]
    fn test_truncated_code_block_returns_remainder() {
        let response = "```json\n{\"characters\": [";
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
    }
}
