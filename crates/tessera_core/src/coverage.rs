//! Page coverage types: gaps and overlaps between adjacent batches.

use serde::{Deserialize, Serialize};

/// Estimated explanation for an uncovered page range.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GapKind {
    /// Scene transition, a short uncovered stretch
    Transition,
    /// In-world time skip suggested by adjacent event text
    Timeskip,
    /// No cue available
    Unknown,
}

/// An uncovered page range between two adjacent batches.
///
/// Gaps are advisory metadata on the merged storyline; they never block
/// merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeGap {
    /// Last covered page before the gap
    pub start_page: u32,
    /// First covered page after the gap
    pub end_page: u32,
    /// Estimated classification
    pub kind: GapKind,
}

impl MergeGap {
    /// Number of pages spanned by the gap.
    pub fn duration(&self) -> u32 {
        self.end_page.saturating_sub(self.start_page)
    }
}

/// A page range claimed by two adjacent batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapRegion {
    /// First doubly-covered page
    pub start_page: u32,
    /// Last doubly-covered page
    pub end_page: u32,
    /// Index of the earlier batch
    pub batch_a: u32,
    /// Index of the later batch
    pub batch_b: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_duration() {
        let gap = MergeGap {
            start_page: 5,
            end_page: 45,
            kind: GapKind::Unknown,
        };
        assert_eq!(gap.duration(), 40);
    }
}
