//! Timeline event entities.

use serde::{Deserialize, Serialize};

/// Narrative weight of a timeline event.
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
pub enum Significance {
    /// Incidental scene
    Minor,
    /// Meaningful but not pivotal
    Moderate,
    /// Pivotal development
    Major,
    /// Story-defining turning point
    Critical,
}

impl Significance {
    /// Numeric rank for comparison; higher is more significant.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Minor => 0,
            Self::Moderate => 1,
            Self::Major => 2,
            Self::Critical => 3,
        }
    }
}

/// An event extracted from one batch of pages.
///
/// `page_number` is reading order; `chronological_order`, when present, is
/// in-world order and may disagree with reading order for flashbacks.
///
/// # Examples
///
/// ```
/// use tessera_core::{Significance, TimelineEvent};
///
/// let json = r#"{
///     "id": "event-1",
///     "pageNumber": 40,
///     "title": "Confrontation",
///     "description": "Rei confronts the captain on the rooftop.",
///     "characters": ["Rei Ayama"],
///     "significance": "major",
///     "isFlashback": false
/// }"#;
/// let event: TimelineEvent = serde_json::from_str(json).unwrap();
/// assert_eq!(event.significance, Significance::Major);
/// assert!(!event.is_flashback);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    /// Stable unique identifier
    pub id: String,
    /// Page where the event occurs
    pub page_number: u32,
    /// Chapter containing the event, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_number: Option<u32>,
    /// Short title
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Names of characters involved
    #[serde(default)]
    pub characters: Vec<String>,
    /// Narrative weight
    pub significance: Significance,
    /// Whether this event is a flashback
    #[serde(default)]
    pub is_flashback: bool,
    /// Explicit position in in-world chronology, when extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chronological_order: Option<u32>,
}

impl TimelineEvent {
    /// Character names shared with another event.
    pub fn shared_characters(&self, other: &TimelineEvent) -> usize {
        self.characters
            .iter()
            .filter(|name| other.characters.contains(name))
            .count()
    }
}
