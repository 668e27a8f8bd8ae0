//! The merged narrative model.

use crate::{Character, MergeGap, Relationship, Theme, TimelineEvent};
use serde::{Deserialize, Serialize};

/// The fully merged narrative model produced by reconciliation.
///
/// Downstream consumers read this through projection views; nothing in the
/// pipeline mutates a storyline after a merge pass completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Storyline {
    /// Deduplicated characters
    pub characters: Vec<Character>,
    /// Deduplicated timeline events, sorted by page
    pub timeline: Vec<TimelineEvent>,
    /// Deduplicated themes
    pub themes: Vec<Theme>,
    /// Deduplicated relationships
    pub relationships: Vec<Relationship>,
    /// Advisory coverage gaps discovered during merging
    #[serde(default)]
    pub gaps: Vec<MergeGap>,
}

impl Storyline {
    /// Look up a character by id.
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Look up a character by any of its known names, case-insensitively.
    pub fn character_by_name(&self, name: &str) -> Option<&Character> {
        let needle = name.to_lowercase();
        self.characters.iter().find(|c| {
            c.known_names()
                .iter()
                .any(|known| known.to_lowercase() == needle)
        })
    }

    /// Look up an event by id.
    pub fn event(&self, id: &str) -> Option<&TimelineEvent> {
        self.timeline.iter().find(|e| e.id == id)
    }

    /// Total entity count across all four entity kinds.
    pub fn entity_count(&self) -> usize {
        self.characters.len() + self.timeline.len() + self.themes.len() + self.relationships.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Importance;

    #[test]
    fn test_character_by_name_matches_aliases() {
        let storyline = Storyline {
            characters: vec![Character {
                id: "char-1".to_string(),
                name: "Rei Ayama".to_string(),
                aliases: vec!["Rei".to_string()],
                description: String::new(),
                first_appearance: 1,
                importance: Importance::Major,
                appearance: None,
                personality: None,
            }],
            ..Default::default()
        };
        assert!(storyline.character_by_name("rei").is_some());
        assert!(storyline.character_by_name("Rei Ayama").is_some());
        assert!(storyline.character_by_name("Kaito").is_none());
    }
}
