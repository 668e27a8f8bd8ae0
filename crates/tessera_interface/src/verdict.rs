//! Structured verdicts parsed from arbitration answers.

use serde::{Deserialize, Serialize};
use tessera_core::Confidence;
use tessera_error::{ProviderError, ProviderErrorKind};

/// The discrete answer an arbitration query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VerdictChoice {
    /// Trust side A
    A,
    /// Trust side B
    B,
    /// Combine both sides
    Merge,
    /// The provider could not decide
    Unsure,
    /// Affirmative answer to a yes/no query
    Yes,
    /// Negative answer to a yes/no query
    No,
}

/// A parsed arbitration answer: a discrete choice plus confidence.
///
/// Queries instruct the provider to answer on a single line, e.g.
/// `merge 0.8` or `no 0.95`. Parsing is tolerant of surrounding prose since
/// providers rarely follow format instructions exactly.
///
/// # Examples
///
/// ```
/// use tessera_interface::{Verdict, VerdictChoice};
///
/// let verdict = Verdict::parse("I believe these match.\nmerge 0.85").unwrap();
/// assert_eq!(verdict.choice, VerdictChoice::Merge);
/// assert!((verdict.confidence.value() - 0.85).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// The discrete answer
    pub choice: VerdictChoice,
    /// Confidence the provider reported, default 0.5 when absent
    pub confidence: Confidence,
}

impl Verdict {
    /// Parse a verdict from raw provider text.
    ///
    /// Scans line by line for a recognized keyword, preferring later lines
    /// (the final line usually carries the requested format). The first
    /// decimal on the matched line becomes the confidence.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] with `UnparseableVerdict` when no keyword is
    /// found anywhere in the text.
    pub fn parse(text: &str) -> Result<Verdict, ProviderError> {
        for line in text.lines().rev() {
            if let Some(verdict) = Self::parse_line(line) {
                return Ok(verdict);
            }
        }
        Err(ProviderError::new(ProviderErrorKind::UnparseableVerdict(
            text.chars().take(100).collect(),
        )))
    }

    fn parse_line(line: &str) -> Option<Verdict> {
        let lower = line.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        let choice = Self::match_choice(&lower)?;
        let confidence = first_decimal(&lower)
            .map(Confidence::new)
            .unwrap_or_default();
        Some(Verdict { choice, confidence })
    }

    fn match_choice(lower: &str) -> Option<VerdictChoice> {
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        // Multi-letter keywords first; bare "a"/"b" are too easy to find in prose
        // so they only count as a leading token.
        if tokens.contains(&"merge") || tokens.contains(&"both") {
            return Some(VerdictChoice::Merge);
        }
        if tokens.contains(&"unsure") || tokens.contains(&"unknown") {
            return Some(VerdictChoice::Unsure);
        }
        if tokens.contains(&"yes") || tokens.contains(&"same") {
            return Some(VerdictChoice::Yes);
        }
        if tokens.contains(&"no") || tokens.contains(&"different") {
            return Some(VerdictChoice::No);
        }
        match tokens.first() {
            Some(&"a") => Some(VerdictChoice::A),
            Some(&"b") => Some(VerdictChoice::B),
            _ => None,
        }
    }
}

/// First decimal number in the text, if any.
fn first_decimal(text: &str) -> Option<f32> {
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_ascii_digit() || c == '.' {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start {
            if let Ok(value) = text[s..i].parse::<f32>() {
                return Some(value);
            }
            start = None;
        }
    }
    start.and_then(|s| text[s..].parse::<f32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_merge_with_confidence() {
        let verdict = Verdict::parse("merge 0.8").unwrap();
        assert_eq!(verdict.choice, VerdictChoice::Merge);
        assert!((verdict.confidence.value() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_parse_prefers_final_line() {
        let verdict = Verdict::parse("These could be the same person.\nb 0.6").unwrap();
        assert_eq!(verdict.choice, VerdictChoice::B);
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(Verdict::parse("yes 0.9").unwrap().choice, VerdictChoice::Yes);
        assert_eq!(Verdict::parse("no 0.7").unwrap().choice, VerdictChoice::No);
    }

    #[test]
    fn test_missing_confidence_defaults() {
        let verdict = Verdict::parse("unsure").unwrap();
        assert_eq!(verdict.choice, VerdictChoice::Unsure);
        assert_eq!(verdict.confidence.value(), 0.5);
    }

    #[test]
    fn test_unparseable_text_errors() {
        assert!(Verdict::parse("the weather is lovely").is_err());
    }
}
