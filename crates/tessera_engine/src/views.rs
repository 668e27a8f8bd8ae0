//! Pure projections over the merged storyline.
//!
//! Views never mutate pipeline state; each is computed from the storyline
//! (and causal graph) on demand, so downstream consumers can shape the merged
//! model without reaching into the reconciler.

use serde::{Deserialize, Serialize};
use tessera_core::{Character, Importance, Significance, Storyline, Theme, TimelineEvent};
use tessera_timeline::{CausalGraph, CausalLink};

/// Characters, events, and the causal structure anchoring the story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorDetection {
    /// All merged characters
    pub characters: Vec<Character>,
    /// All merged events
    pub events: Vec<TimelineEvent>,
    /// Inferred causal links
    pub links: Vec<CausalLink>,
    /// Ids of events that anchor the narrative
    pub anchor_events: Vec<String>,
}

/// The state a branch of the story would continue from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchGeneration {
    /// Last page covered by any event
    pub latest_page: u32,
    /// Per-character snapshots
    pub character_states: Vec<CharacterState>,
    /// Anchor event ids a branch must respect
    pub anchor_points: Vec<String>,
}

/// One character's standing at the end of the merged timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterState {
    /// Character name
    pub name: String,
    /// Narrative importance
    pub importance: Importance,
    /// Current description
    pub description: String,
    /// Page of the character's last event appearance, if any
    pub last_seen: Option<u32>,
}

/// Material for continuing the story in its established voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryContinuation {
    /// Most recent events, reading order
    pub recent_events: Vec<TimelineEvent>,
    /// Characters active in the recent events
    pub active_characters: Vec<String>,
    /// Themes in play
    pub open_themes: Vec<Theme>,
    /// Events per ten pages over the covered span
    pub pacing: f32,
}

/// A compact overview of the merged storyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySummary {
    /// Character count
    pub characters: usize,
    /// Event count
    pub events: usize,
    /// Theme count
    pub themes: usize,
    /// Relationship count
    pub relationships: usize,
    /// First and last covered page
    pub page_range: Option<(u32, u32)>,
    /// Major-importance character names
    pub principal_characters: Vec<String>,
}

/// All four projections, computed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryViews {
    /// Anchor structure
    pub anchor_detection: AnchorDetection,
    /// Branch starting state
    pub branch_generation: BranchGeneration,
    /// Continuation material
    pub story_continuation: StoryContinuation,
    /// Overview
    pub summary: StorySummary,
}

impl StoryViews {
    /// Compute every view from a storyline and its causal graph.
    pub fn build(storyline: &Storyline, causal: &CausalGraph) -> Self {
        Self {
            anchor_detection: anchor_detection(storyline, causal),
            branch_generation: branch_generation(storyline, causal),
            story_continuation: story_continuation(storyline),
            summary: summary(storyline),
        }
    }
}

/// An event anchors the narrative when it is pivotal by significance or
/// heavily connected in the causal graph.
fn is_anchor(event: &TimelineEvent, causal: &CausalGraph) -> bool {
    event.significance >= Significance::Major || causal.outgoing(&event.id).len() >= 2
}

/// Project the anchor structure of the story.
pub fn anchor_detection(storyline: &Storyline, causal: &CausalGraph) -> AnchorDetection {
    AnchorDetection {
        characters: storyline.characters.clone(),
        events: storyline.timeline.clone(),
        links: causal.links().to_vec(),
        anchor_events: storyline
            .timeline
            .iter()
            .filter(|e| is_anchor(e, causal))
            .map(|e| e.id.clone())
            .collect(),
    }
}

/// Project the state a new branch would continue from.
pub fn branch_generation(storyline: &Storyline, causal: &CausalGraph) -> BranchGeneration {
    let latest_page = storyline
        .timeline
        .iter()
        .map(|e| e.page_number)
        .max()
        .unwrap_or(0);

    let character_states = storyline
        .characters
        .iter()
        .map(|c| CharacterState {
            name: c.name.clone(),
            importance: c.importance,
            description: c.description.clone(),
            last_seen: storyline
                .timeline
                .iter()
                .filter(|e| e.characters.iter().any(|name| name == &c.name))
                .map(|e| e.page_number)
                .max(),
        })
        .collect();

    BranchGeneration {
        latest_page,
        character_states,
        anchor_points: storyline
            .timeline
            .iter()
            .filter(|e| is_anchor(e, causal))
            .map(|e| e.id.clone())
            .collect(),
    }
}

/// Project continuation material: the recent tail of the timeline plus
/// overall pacing.
pub fn story_continuation(storyline: &Storyline) -> StoryContinuation {
    const RECENT: usize = 5;

    let recent_events: Vec<TimelineEvent> = storyline
        .timeline
        .iter()
        .rev()
        .take(RECENT)
        .rev()
        .cloned()
        .collect();

    let mut active_characters: Vec<String> = Vec::new();
    for event in &recent_events {
        for name in &event.characters {
            if !active_characters.contains(name) {
                active_characters.push(name.clone());
            }
        }
    }

    let pacing = match (
        storyline.timeline.first().map(|e| e.page_number),
        storyline.timeline.last().map(|e| e.page_number),
    ) {
        (Some(first), Some(last)) if last > first => {
            storyline.timeline.len() as f32 / (last - first) as f32 * 10.0
        }
        (Some(_), Some(_)) => storyline.timeline.len() as f32,
        _ => 0.0,
    };

    StoryContinuation {
        recent_events,
        active_characters,
        open_themes: storyline.themes.clone(),
        pacing,
    }
}

/// Project a compact overview.
pub fn summary(storyline: &Storyline) -> StorySummary {
    let pages: Vec<u32> = storyline.timeline.iter().map(|e| e.page_number).collect();
    StorySummary {
        characters: storyline.characters.len(),
        events: storyline.timeline.len(),
        themes: storyline.themes.len(),
        relationships: storyline.relationships.len(),
        page_range: pages
            .iter()
            .min()
            .zip(pages.iter().max())
            .map(|(min, max)| (*min, *max)),
        principal_characters: storyline
            .characters
            .iter()
            .filter(|c| c.importance == Importance::Major)
            .map(|c| c.name.clone())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_timeline::CausalConfig;

    fn event(id: &str, page: u32, cast: &[&str], significance: Significance) -> TimelineEvent {
        TimelineEvent {
            id: id.to_string(),
            page_number: page,
            chapter_number: None,
            title: format!("Scene {id}"),
            description: String::new(),
            characters: cast.iter().map(|c| c.to_string()).collect(),
            significance,
            is_flashback: false,
            chronological_order: None,
        }
    }

    fn storyline() -> Storyline {
        Storyline {
            characters: vec![Character {
                id: "char-1".to_string(),
                name: "Rei".to_string(),
                aliases: vec![],
                description: "A quiet transfer student.".to_string(),
                first_appearance: 3,
                importance: Importance::Major,
                appearance: None,
                personality: None,
            }],
            timeline: vec![
                event("e1", 5, &["Rei"], Significance::Minor),
                event("e2", 25, &["Rei"], Significance::Critical),
            ],
            themes: vec![],
            relationships: vec![],
            gaps: vec![],
        }
    }

    #[test]
    fn test_significant_events_are_anchors() {
        let storyline = storyline();
        let causal = CausalGraph::build(&storyline.timeline, &CausalConfig::default());
        let anchors = anchor_detection(&storyline, &causal);
        assert_eq!(anchors.anchor_events, vec!["e2".to_string()]);
    }

    #[test]
    fn test_branch_state_tracks_last_seen() {
        let storyline = storyline();
        let causal = CausalGraph::build(&storyline.timeline, &CausalConfig::default());
        let branch = branch_generation(&storyline, &causal);
        assert_eq!(branch.latest_page, 25);
        assert_eq!(branch.character_states[0].last_seen, Some(25));
    }

    #[test]
    fn test_summary_page_range() {
        let report = summary(&storyline());
        assert_eq!(report.page_range, Some((5, 25)));
        assert_eq!(report.principal_characters, vec!["Rei".to_string()]);
    }

    #[test]
    fn test_continuation_orders_recent_events_by_page() {
        let continuation = story_continuation(&storyline());
        assert_eq!(continuation.recent_events.len(), 2);
        assert_eq!(continuation.recent_events[0].id, "e1");
        assert!(continuation.active_characters.contains(&"Rei".to_string()));
    }
}
