//! Reading order versus chronological order.
//!
//! Reading order is page order. Chronological order prefers an explicit
//! `chronological_order` value; without one, flashbacks sort before
//! non-flashbacks and each group keeps reading order. Disagreements between
//! the two orderings are surfaced as data, never auto-resolved.

use serde::{Deserialize, Serialize};
use tessera_core::TimelineEvent;

/// Event ids in reading (page) order.
pub fn reading_order(events: &[TimelineEvent]) -> Vec<String> {
    let mut ordered: Vec<&TimelineEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.page_number);
    ordered.iter().map(|e| e.id.clone()).collect()
}

/// Event ids in estimated in-world order.
///
/// Events carrying an explicit `chronological_order` sort by it among
/// themselves; flashbacks without one come first, everything else follows in
/// reading order.
pub fn chronological_order(events: &[TimelineEvent]) -> Vec<String> {
    let mut ordered: Vec<&TimelineEvent> = events.iter().collect();
    ordered.sort_by_key(|e| match e.chronological_order {
        Some(n) => (1u8, n),
        None if e.is_flashback => (0, e.page_number),
        None => (2, e.page_number),
    });
    ordered.iter().map(|e| e.id.clone()).collect()
}

/// An event whose reading and chronological positions disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderingDiscrepancy {
    /// The event in question
    pub event_id: String,
    /// Position in reading order
    pub reading_position: usize,
    /// Position in chronological order
    pub chronological_position: usize,
}

/// Events whose positions in the two orderings differ by more than
/// `tolerance`.
///
/// Flashbacks are exempt; disagreeing with reading order is what makes them
/// flashbacks.
pub fn ordering_discrepancies(
    events: &[TimelineEvent],
    tolerance: usize,
) -> Vec<OrderingDiscrepancy> {
    let reading = reading_order(events);
    let chronological = chronological_order(events);

    let mut found = Vec::new();
    for event in events {
        if event.is_flashback {
            continue;
        }
        let Some(reading_position) = reading.iter().position(|id| *id == event.id) else {
            continue;
        };
        let Some(chronological_position) = chronological.iter().position(|id| *id == event.id)
        else {
            continue;
        };
        if reading_position.abs_diff(chronological_position) > tolerance {
            found.push(OrderingDiscrepancy {
                event_id: event.id.clone(),
                reading_position,
                chronological_position,
            });
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Significance;

    fn event(id: &str, page: u32) -> TimelineEvent {
        TimelineEvent {
            id: id.to_string(),
            page_number: page,
            chapter_number: None,
            title: format!("Scene {id}"),
            description: String::new(),
            characters: vec![],
            significance: Significance::Minor,
            is_flashback: false,
            chronological_order: None,
        }
    }

    #[test]
    fn test_reading_order_is_page_order() {
        let events = vec![event("e2", 20), event("e1", 5), event("e3", 40)];
        assert_eq!(reading_order(&events), vec!["e1", "e2", "e3"]);
    }

    #[test]
    fn test_flashback_sorts_first_chronologically() {
        let mut events = vec![event("e1", 5), event("e2", 20)];
        events[1].is_flashback = true;
        assert_eq!(chronological_order(&events), vec!["e2", "e1"]);
    }

    #[test]
    fn test_explicit_order_wins_within_group() {
        let mut events = vec![event("e1", 5), event("e2", 20)];
        events[0].chronological_order = Some(2);
        events[1].chronological_order = Some(1);
        assert_eq!(chronological_order(&events), vec!["e2", "e1"]);
    }

    #[test]
    fn test_flashback_exempt_from_discrepancies() {
        let mut events = vec![event("e1", 5), event("e2", 20), event("e3", 40)];
        events[2].is_flashback = true;
        let found = ordering_discrepancies(&events, 0);
        assert!(found.iter().all(|d| d.event_id != "e3"));
    }

    #[test]
    fn test_discrepancy_reports_both_positions() {
        let mut events = vec![
            event("e1", 5),
            event("e2", 20),
            event("e3", 40),
            event("e4", 60),
        ];
        // The last event read is explicitly earliest in-world
        events[3].chronological_order = Some(1);
        events[0].chronological_order = Some(2);
        let found = ordering_discrepancies(&events, 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].event_id, "e4");
        assert_eq!(found[0].reading_position, 3);
        assert_eq!(found[0].chronological_position, 0);
    }
}
