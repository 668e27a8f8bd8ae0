//! Character entities.

use serde::{Deserialize, Serialize};

/// How central a character is to the story.
///
/// Ordered so that a higher rank means greater importance; the merge policy
/// keeps the higher rank when two records disagree.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Importance {
    /// Background or one-scene character
    Minor,
    /// Recurring character with narrative weight
    Supporting,
    /// Protagonist-tier character
    Major,
}

impl Importance {
    /// Numeric rank for comparison; higher is more important.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Minor => 0,
            Self::Supporting => 1,
            Self::Major => 2,
        }
    }
}

/// A character extracted from one batch of pages.
///
/// Identity is canonical by `id` within a batch, but different batches mint
/// different ids for the same person; cross-batch identity is resolved by
/// name and alias similarity, never by id equality.
///
/// # Examples
///
/// ```
/// use tessera_core::{Character, Importance};
///
/// let json = r#"{
///     "id": "char-1",
///     "name": "Rei Ayama",
///     "aliases": ["Rei"],
///     "description": "A transfer student hiding her past.",
///     "firstAppearance": 3,
///     "importance": "major"
/// }"#;
/// let character: Character = serde_json::from_str(json).unwrap();
/// assert_eq!(character.name, "Rei Ayama");
/// assert_eq!(character.importance, Importance::Major);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Stable unique identifier
    pub id: String,
    /// Primary name
    pub name: String,
    /// Alternate names, nicknames, and titles
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Free-text description
    pub description: String,
    /// Page of first appearance
    pub first_appearance: u32,
    /// Narrative importance
    pub importance: Importance,
    /// Physical appearance notes, when extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    /// Personality notes, when extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
}

impl Character {
    /// All names this character is known by: primary name plus aliases.
    pub fn known_names(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(self.aliases.iter().map(|a| a.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip() {
        let character = Character {
            id: "char-1".to_string(),
            name: "Rei Ayama".to_string(),
            aliases: vec!["Rei".to_string()],
            description: "A transfer student.".to_string(),
            first_appearance: 3,
            importance: Importance::Major,
            appearance: None,
            personality: Some("Reserved".to_string()),
        };
        let json = serde_json::to_string(&character).unwrap();
        let back: Character = serde_json::from_str(&json).unwrap();
        assert_eq!(character, back);
    }

    #[test]
    fn test_camel_case_wire_names() {
        let character = Character {
            id: "char-1".to_string(),
            name: "Rei".to_string(),
            aliases: vec![],
            description: String::new(),
            first_appearance: 1,
            importance: Importance::Minor,
            appearance: None,
            personality: None,
        };
        let json = serde_json::to_string(&character).unwrap();
        assert!(json.contains("firstAppearance"));
    }

    #[test]
    fn test_importance_rank_ordering() {
        assert!(Importance::Major.rank() > Importance::Supporting.rank());
        assert!(Importance::Supporting.rank() > Importance::Minor.rank());
    }
}
