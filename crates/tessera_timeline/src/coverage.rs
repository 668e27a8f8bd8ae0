//! Gap and overlap analysis over batch page ranges.

use serde::{Deserialize, Serialize};
use tessera_core::{BatchResult, GapKind, MergeGap, OverlapRegion, TimelineEvent};
use tessera_merge::{merge_events, token_jaccard, token_overlap};
use tracing::debug;

/// Tuning for coverage analysis and overlap stitching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoverageConfig {
    /// Gaps at most this many pages wide read as scene transitions
    pub transition_max: u32,
    /// Event-level gaps narrower than this are not reported
    pub min_gap_size: u32,
    /// Page distance within which two overlap events may be the same scene
    pub stitch_window: u32,
    /// Title similarity required for the same-event test
    pub title_threshold: f32,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            transition_max: 3,
            min_gap_size: 10,
            stitch_window: 5,
            title_threshold: 0.5,
        }
    }
}

/// Gaps and overlaps found across a set of batches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    /// Uncovered page ranges between adjacent batches
    pub gaps: Vec<MergeGap>,
    /// Page ranges claimed by more than one batch
    pub overlaps: Vec<OverlapRegion>,
}

/// Analyze batch page ranges for gaps and overlaps.
///
/// Batches are considered in `start_page` order regardless of arrival order.
/// A gap is an uncovered stretch between one batch's end and the next batch's
/// start; an overlap is a stretch both claim.
///
/// # Examples
///
/// ```
/// use tessera_core::{BatchResult, Confidence};
/// use tessera_timeline::analyze;
///
/// let batch = |index, start, end| BatchResult {
///     batch_index: index,
///     start_page: start,
///     end_page: end,
///     characters: vec![],
///     events: vec![],
///     themes: vec![],
///     relationships: vec![],
///     confidence: Confidence::default(),
/// };
/// let coverage = analyze(&[batch(0, 1, 20), batch(1, 31, 50)]);
/// assert_eq!(coverage.gaps.len(), 1);
/// assert!(coverage.overlaps.is_empty());
/// ```
#[tracing::instrument(skip_all, fields(batches = batches.len()))]
pub fn analyze(batches: &[BatchResult]) -> Coverage {
    analyze_with(batches, &CoverageConfig::default())
}

/// [`analyze`] with explicit tuning.
pub fn analyze_with(batches: &[BatchResult], config: &CoverageConfig) -> Coverage {
    let mut ordered: Vec<&BatchResult> = batches.iter().collect();
    ordered.sort_by_key(|b| (b.start_page, b.end_page));

    let mut coverage = Coverage::default();
    for pair in ordered.windows(2) {
        let (earlier, later) = (pair[0], pair[1]);
        // Page ranges are inclusive: end 20 then start 21 is contiguous.
        if later.start_page > earlier.end_page + 1 {
            let kind = classify_gap(
                earlier.end_page,
                later.start_page,
                earlier.events.iter().chain(later.events.iter()),
                config,
            );
            coverage.gaps.push(MergeGap {
                start_page: earlier.end_page,
                end_page: later.start_page,
                kind,
            });
        } else if earlier.end_page > later.start_page {
            coverage.overlaps.push(OverlapRegion {
                start_page: later.start_page,
                end_page: earlier.end_page.min(later.end_page),
                batch_a: earlier.batch_index,
                batch_b: later.batch_index,
            });
        }
    }

    debug!(
        gaps = coverage.gaps.len(),
        overlaps = coverage.overlaps.len(),
        "Coverage analyzed"
    );
    coverage
}

/// Report gaps in event coverage within an already-merged timeline.
///
/// Events are considered in page order; a stretch of at least `min_gap_size`
/// pages with no event is reported as a gap.
///
/// # Examples
///
/// ```
/// use tessera_timeline::detect_gaps;
/// # use tessera_core::{Significance, TimelineEvent};
/// # let event = |page| TimelineEvent {
/// #     id: format!("event-{page}"),
/// #     page_number: page,
/// #     chapter_number: None,
/// #     title: "Scene".to_string(),
/// #     description: String::new(),
/// #     characters: vec![],
/// #     significance: Significance::Minor,
/// #     is_flashback: false,
/// #     chronological_order: None,
/// # };
/// let gaps = detect_gaps(&[event(5), event(45)], 10);
/// assert_eq!(gaps.len(), 1);
/// assert_eq!(gaps[0].duration(), 40);
/// ```
pub fn detect_gaps(events: &[TimelineEvent], min_gap_size: u32) -> Vec<MergeGap> {
    let config = CoverageConfig {
        min_gap_size,
        ..CoverageConfig::default()
    };
    let mut pages: Vec<&TimelineEvent> = events.iter().collect();
    pages.sort_by_key(|e| e.page_number);

    let mut gaps = Vec::new();
    for pair in pages.windows(2) {
        let (earlier, later) = (pair[0], pair[1]);
        let distance = later.page_number.saturating_sub(earlier.page_number);
        if distance >= min_gap_size {
            let kind = classify_gap(
                earlier.page_number,
                later.page_number,
                [earlier, later].into_iter(),
                &config,
            );
            gaps.push(MergeGap {
                start_page: earlier.page_number,
                end_page: later.page_number,
                kind,
            });
        }
    }
    gaps
}

/// Classify a gap from its width and keyword cues in the adjacent events.
fn classify_gap<'a>(
    start: u32,
    end: u32,
    adjacent: impl Iterator<Item = &'a TimelineEvent>,
    config: &CoverageConfig,
) -> GapKind {
    const TIMESKIP_CUES: &[&str] = &[
        "later", "years", "months", "weeks", "days", "timeskip", "afterward", "aftermath",
    ];

    for event in adjacent {
        let text = format!("{} {}", event.title, event.description).to_lowercase();
        if TIMESKIP_CUES.iter().any(|cue| text.contains(cue)) {
            return GapKind::Timeskip;
        }
    }

    if end.saturating_sub(start) <= config.transition_max {
        GapKind::Transition
    } else {
        GapKind::Unknown
    }
}

/// Stitch the event lists of two overlapping batches.
///
/// Two events are the same scene when their pages are within the stitch
/// window, their titles are similar, and they share at least one character.
/// Matches merge under the merge policy; everything unmatched survives from
/// both sides.
#[tracing::instrument(skip_all, fields(left = left.len(), right = right.len()))]
pub fn stitch_events(
    left: Vec<TimelineEvent>,
    right: Vec<TimelineEvent>,
    config: &CoverageConfig,
) -> Vec<TimelineEvent> {
    let mut stitched = left;
    for incoming in right {
        let matched = stitched
            .iter()
            .position(|existing| same_scene(existing, &incoming, config));
        match matched {
            Some(index) => {
                let existing = stitched.swap_remove(index);
                stitched.push(merge_events(existing, incoming));
            }
            None => stitched.push(incoming),
        }
    }
    stitched.sort_by_key(|e| e.page_number);
    stitched
}

fn same_scene(a: &TimelineEvent, b: &TimelineEvent, config: &CoverageConfig) -> bool {
    let distance = a.page_number.abs_diff(b.page_number);
    if distance > config.stitch_window {
        return false;
    }
    let title = token_jaccard(&a.title, &b.title).max(token_overlap(&a.title, &b.title));
    title >= config.title_threshold && a.shared_characters(b) > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Confidence, Significance};

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

    fn event(id: &str, title: &str, page: u32, cast: &[&str]) -> TimelineEvent {
        TimelineEvent {
            id: id.to_string(),
            page_number: page,
            chapter_number: None,
            title: title.to_string(),
            description: format!("{}.", title),
            characters: cast.iter().map(|c| c.to_string()).collect(),
            significance: Significance::Moderate,
            is_flashback: false,
            chronological_order: None,
        }
    }

    #[test]
    fn test_analyze_finds_gap_between_batches() {
        let coverage = analyze(&[batch(0, 1, 20), batch(1, 31, 50)]);
        assert_eq!(coverage.gaps.len(), 1);
        assert_eq!(coverage.gaps[0].start_page, 20);
        assert_eq!(coverage.gaps[0].end_page, 31);
    }

    #[test]
    fn test_analyze_finds_overlap() {
        let coverage = analyze(&[batch(0, 1, 25), batch(1, 20, 40)]);
        assert_eq!(coverage.overlaps.len(), 1);
        let overlap = &coverage.overlaps[0];
        assert_eq!(overlap.start_page, 20);
        assert_eq!(overlap.end_page, 25);
        assert_eq!((overlap.batch_a, overlap.batch_b), (0, 1));
    }

    #[test]
    fn test_analyze_sorts_out_of_order_batches() {
        let coverage = analyze(&[batch(1, 31, 50), batch(0, 1, 20)]);
        assert_eq!(coverage.gaps.len(), 1);
        assert_eq!(coverage.gaps[0].start_page, 20);
    }

    #[test]
    fn test_adjacent_batches_are_clean() {
        // Page 20 then page 21: neither gap nor overlap
        let coverage = analyze(&[batch(0, 1, 20), batch(1, 21, 40)]);
        assert!(coverage.gaps.is_empty());
        assert!(coverage.overlaps.is_empty());
    }

    #[test]
    fn test_detect_gaps_reports_wide_event_gap() {
        let events = vec![
            event("e1", "Arrival", 5, &["Rei"]),
            event("e2", "Tournament", 45, &["Rei"]),
        ];
        let gaps = detect_gaps(&events, 10);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].duration(), 40);
    }

    #[test]
    fn test_detect_gaps_ignores_narrow_gaps() {
        let events = vec![
            event("e1", "Arrival", 5, &["Rei"]),
            event("e2", "Practice", 12, &["Rei"]),
        ];
        assert!(detect_gaps(&events, 10).is_empty());
    }

    #[test]
    fn test_timeskip_cue_classifies_gap() {
        let mut events = vec![
            event("e1", "Arrival", 5, &["Rei"]),
            event("e2", "Tournament", 45, &["Rei"]),
        ];
        events[1].description = "Three months later, the tournament begins.".to_string();
        let gaps = detect_gaps(&events, 10);
        assert_eq!(gaps[0].kind, GapKind::Timeskip);
    }

    #[test]
    fn test_stitch_merges_same_scene() {
        let left = vec![event("e1", "Rooftop confrontation", 21, &["Rei", "Captain"])];
        let right = vec![event("e2", "Confrontation on the rooftop", 22, &["Rei"])];
        let stitched = stitch_events(left, right, &CoverageConfig::default());
        assert_eq!(stitched.len(), 1);
        assert_eq!(stitched[0].page_number, 21);
    }

    #[test]
    fn test_stitch_keeps_unmatched_from_both_sides() {
        let left = vec![event("e1", "Rooftop confrontation", 21, &["Rei"])];
        let right = vec![event("e2", "Cafeteria scene", 23, &["Kaito"])];
        let stitched = stitch_events(left, right, &CoverageConfig::default());
        assert_eq!(stitched.len(), 2);
    }

    #[test]
    fn test_stitch_requires_shared_character() {
        let left = vec![event("e1", "Confrontation", 21, &["Rei"])];
        let right = vec![event("e2", "Confrontation", 22, &["Kaito"])];
        let stitched = stitch_events(left, right, &CoverageConfig::default());
        assert_eq!(stitched.len(), 2);
    }
}
