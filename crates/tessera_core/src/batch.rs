//! Per-call extraction results.

use crate::{Character, Confidence, Relationship, Theme, TimelineEvent};
use serde::{Deserialize, Serialize};

/// The result of one independent extraction call over a contiguous page range.
///
/// A `BatchResult` is immutable once constructed; the reconciliation pipeline
/// reads batches but never writes back into them. Batches may arrive in any
/// order and adjacent batches may overlap or leave gaps in page coverage.
///
/// # Examples
///
/// ```
/// use tessera_core::BatchResult;
///
/// let json = r#"{
///     "batchIndex": 0,
///     "startPage": 1,
///     "endPage": 20,
///     "characters": [],
///     "events": [],
///     "themes": [],
///     "relationships": [],
///     "confidence": 0.85
/// }"#;
/// let batch: BatchResult = serde_json::from_str(json).unwrap();
/// assert_eq!(batch.page_span(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Position of this batch in the overall sequence
    pub batch_index: u32,
    /// First page covered by this batch
    pub start_page: u32,
    /// Last page covered by this batch
    pub end_page: u32,
    /// Characters extracted from this span
    #[serde(default)]
    pub characters: Vec<Character>,
    /// Timeline events extracted from this span
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
    /// Themes extracted from this span
    #[serde(default)]
    pub themes: Vec<Theme>,
    /// Relationships extracted from this span
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Extraction confidence reported for the whole batch
    #[serde(default)]
    pub confidence: Confidence,
}

impl BatchResult {
    /// Number of pages covered, inclusive of both endpoints.
    pub fn page_span(&self) -> u32 {
        self.end_page.saturating_sub(self.start_page) + 1
    }

    /// Whether this batch's page range overlaps another's.
    pub fn overlaps(&self, other: &BatchResult) -> bool {
        self.start_page <= other.end_page && other.start_page <= self.end_page
    }

    /// Total entity count across all four entity kinds.
    pub fn entity_count(&self) -> usize {
        self.characters.len() + self.events.len() + self.themes.len() + self.relationships.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(index: u32, start: u32, end: u32) -> BatchResult {
        BatchResult {
            batch_index: index,
            start_page: start,
            end_page: end,
            characters: vec![],
            events: vec![],
            themes: vec![],
            relationships: vec![],
            confidence: Confidence::default(),
        }
    }

    #[test]
    fn test_overlap_detection() {
        assert!(batch(0, 1, 20).overlaps(&batch(1, 15, 35)));
        assert!(!batch(0, 1, 20).overlaps(&batch(1, 21, 40)));
    }

    #[test]
    fn test_page_span_inclusive() {
        assert_eq!(batch(0, 1, 20).page_span(), 20);
        assert_eq!(batch(0, 5, 5).page_span(), 1);
    }
}
