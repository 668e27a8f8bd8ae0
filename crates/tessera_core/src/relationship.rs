//! Relationship entities.

use crate::Confidence;
use serde::{Deserialize, Serialize};

/// A relationship between two characters extracted from one batch.
///
/// Cross-batch identity is the unordered character pair plus `kind`:
/// `(Rei, Kaito, "rivals")` matches `(Kaito, Rei, "rivals")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Stable unique identifier
    pub id: String,
    /// First character name
    pub character_a: String,
    /// Second character name
    pub character_b: String,
    /// Kind of relationship (rivals, siblings, mentor, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-text description
    pub description: String,
    /// How established the relationship is in this span
    #[serde(default)]
    pub strength: Confidence,
    /// Page where the relationship is first visible
    #[serde(default)]
    pub first_page: u32,
}

impl Relationship {
    /// Canonical key: the character pair sorted lexicographically, plus kind.
    ///
    /// Lets unordered pairs compare equal across batches.
    pub fn pair_key(&self) -> (String, String, String) {
        let (first, second) = if self.character_a <= self.character_b {
            (&self.character_a, &self.character_b)
        } else {
            (&self.character_b, &self.character_a)
        };
        (
            first.to_lowercase(),
            second.to_lowercase(),
            self.kind.to_lowercase(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relationship(a: &str, b: &str) -> Relationship {
        Relationship {
            id: "rel-1".to_string(),
            character_a: a.to_string(),
            character_b: b.to_string(),
            kind: "rivals".to_string(),
            description: String::new(),
            strength: Confidence::default(),
            first_page: 1,
        }
    }

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(
            relationship("Rei", "Kaito").pair_key(),
            relationship("Kaito", "Rei").pair_key()
        );
    }

    #[test]
    fn test_kind_serializes_as_type() {
        let json = serde_json::to_string(&relationship("Rei", "Kaito")).unwrap();
        assert!(json.contains("\"type\":\"rivals\""));
    }
}
