//! Causal graph inference over the merged timeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tessera_core::{Confidence, TimelineEvent};
use tessera_merge::narrative_proximity;
use tracing::debug;

/// The kind of causal influence one event exerts on another.
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
pub enum CausalLinkKind {
    /// The earlier event directly causes the later one
    Causes,
    /// The earlier event makes the later one possible
    Enables,
    /// The earlier event forecloses the later one
    Prevents,
    /// Unspecified influence
    Influences,
}

/// A directed causal link between two events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CausalLink {
    /// Id of the earlier event
    pub from: String,
    /// Id of the later event
    pub to: String,
    /// Kind of influence
    pub kind: CausalLinkKind,
    /// Inferred strength of the connection
    pub strength: Confidence,
}

/// Tuning for link inference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CausalConfig {
    /// How many subsequent events each event is compared against
    pub lookahead: usize,
    /// Combined strength below which no link is inferred
    pub link_threshold: f32,
    /// Page window for the temporal-proximity component
    pub proximity_window: u32,
}

impl Default for CausalConfig {
    fn default() -> Self {
        Self {
            lookahead: 5,
            link_threshold: 0.3,
            proximity_window: 30,
        }
    }
}

/// A causal graph over timeline events.
///
/// Nodes are event ids; depth is the longest incoming path from a root.
/// Cycles are tolerated: a back-edge contributes depth 0 and the offending
/// edge is recorded in `cycles` so callers can surface it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CausalGraph {
    nodes: Vec<String>,
    links: Vec<CausalLink>,
    depths: HashMap<String, u32>,
    cycles: Vec<(String, String)>,
}

impl CausalGraph {
    /// Infer a causal graph from a page-ordered view of the events.
    ///
    /// Each event is compared against the next `lookahead` events; a shared
    /// cast and temporal proximity above the threshold produce a link whose
    /// kind comes from keyword cues in the later event's text.
    #[tracing::instrument(skip_all, fields(events = events.len()))]
    pub fn build(events: &[TimelineEvent], config: &CausalConfig) -> Self {
        let mut ordered: Vec<&TimelineEvent> = events.iter().collect();
        ordered.sort_by_key(|e| e.page_number);

        let mut links = Vec::new();
        for (i, earlier) in ordered.iter().enumerate() {
            for later in ordered.iter().skip(i + 1).take(config.lookahead) {
                if let Some(link) = infer_link(earlier, later, config) {
                    links.push(link);
                }
            }
        }

        let nodes: Vec<String> = ordered.iter().map(|e| e.id.clone()).collect();
        let mut graph = Self {
            nodes,
            links,
            depths: HashMap::new(),
            cycles: Vec::new(),
        };
        graph.compute_depths();
        debug!(
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            cycles = graph.cycles.len(),
            "Causal graph built"
        );
        graph
    }

    /// Add an explicit link and recompute depths.
    pub fn add_link(&mut self, link: CausalLink) {
        for id in [&link.from, &link.to] {
            if !self.nodes.contains(id) {
                self.nodes.push(id.clone());
            }
        }
        self.links.push(link);
        self.compute_depths();
    }

    /// All event ids in the graph, page order.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// All inferred links.
    pub fn links(&self) -> &[CausalLink] {
        &self.links
    }

    /// Links pointing into the given event.
    pub fn incoming(&self, id: &str) -> Vec<&CausalLink> {
        self.links.iter().filter(|l| l.to == id).collect()
    }

    /// Links leading out of the given event.
    pub fn outgoing(&self, id: &str) -> Vec<&CausalLink> {
        self.links.iter().filter(|l| l.from == id).collect()
    }

    /// Longest incoming path from a root, or `None` for an unknown id.
    pub fn depth(&self, id: &str) -> Option<u32> {
        self.depths.get(id).copied()
    }

    /// Nodes with no incoming links.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|id| self.incoming(id).is_empty())
            .map(String::as_str)
            .collect()
    }

    /// Back-edges detected during depth computation, as `(from, to)` pairs.
    pub fn cycles(&self) -> &[(String, String)] {
        &self.cycles
    }

    /// Longest-path depth per node, iterative with an explicit visiting mark.
    ///
    /// A back-edge into a node still being visited contributes depth 0 rather
    /// than recursing, so cyclic input terminates.
    fn compute_depths(&mut self) {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Visiting,
            Done,
        }

        let mut marks: HashMap<&str, Mark> = self
            .nodes
            .iter()
            .map(|id| (id.as_str(), Mark::Unvisited))
            .collect();
        let mut depths: HashMap<String, u32> = HashMap::new();
        let mut cycles: Vec<(String, String)> = Vec::new();

        for start in &self.nodes {
            if marks[start.as_str()] != Mark::Unvisited {
                continue;
            }
            // Frame: node plus index of the next incoming link to examine.
            let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];
            marks.insert(start.as_str(), Mark::Visiting);

            while let Some((node, next)) = stack.last_mut() {
                let node = *node;
                let predecessors: Vec<&str> = self
                    .links
                    .iter()
                    .filter(|l| l.to == node)
                    .map(|l| l.from.as_str())
                    .collect();

                if *next < predecessors.len() {
                    let pred = predecessors[*next];
                    *next += 1;
                    match marks.get(pred).copied() {
                        Some(Mark::Unvisited) => {
                            marks.insert(pred, Mark::Visiting);
                            stack.push((pred, 0));
                        }
                        Some(Mark::Visiting) => {
                            cycles.push((pred.to_string(), node.to_string()));
                        }
                        // Done or a link to an id outside the node set
                        _ => {}
                    }
                } else {
                    let depth = predecessors
                        .iter()
                        .filter_map(|p| depths.get(*p).map(|d| d + 1))
                        .max()
                        .unwrap_or(0);
                    depths.insert(node.to_string(), depth);
                    marks.insert(node, Mark::Done);
                    stack.pop();
                }
            }
        }

        self.depths = depths;
        self.cycles = cycles;
    }
}

/// Infer a link between an earlier and a later event, if any.
fn infer_link(
    earlier: &TimelineEvent,
    later: &TimelineEvent,
    config: &CausalConfig,
) -> Option<CausalLink> {
    let shared = earlier.shared_characters(later);
    if shared == 0 {
        return None;
    }
    let cast = earlier.characters.len().min(later.characters.len()).max(1);
    let overlap = shared as f32 / cast as f32;
    let proximity =
        narrative_proximity(earlier.page_number, later.page_number, config.proximity_window);
    let strength = overlap * 0.6 + proximity * 0.4;
    if strength < config.link_threshold {
        return None;
    }

    Some(CausalLink {
        from: earlier.id.clone(),
        to: later.id.clone(),
        kind: link_kind(later),
        strength: Confidence::new(strength),
    })
}

/// Keyword cues in the later event's text decide the link kind.
fn link_kind(later: &TimelineEvent) -> CausalLinkKind {
    let text = format!("{} {}", later.title, later.description).to_lowercase();
    const CAUSES: &[&str] = &["because", "caused", "causes", "results in", "leads to"];
    const ENABLES: &[&str] = &["enables", "allows", "makes possible", "opens"];
    const PREVENTS: &[&str] = &["prevents", "stops", "blocks", "forbids"];

    if CAUSES.iter().any(|cue| text.contains(cue)) {
        CausalLinkKind::Causes
    } else if ENABLES.iter().any(|cue| text.contains(cue)) {
        CausalLinkKind::Enables
    } else if PREVENTS.iter().any(|cue| text.contains(cue)) {
        CausalLinkKind::Prevents
    } else {
        CausalLinkKind::Influences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Significance;

    fn event(id: &str, page: u32, cast: &[&str], description: &str) -> TimelineEvent {
        TimelineEvent {
            id: id.to_string(),
            page_number: page,
            chapter_number: None,
            title: format!("Scene {id}"),
            description: description.to_string(),
            characters: cast.iter().map(|c| c.to_string()).collect(),
            significance: Significance::Moderate,
            is_flashback: false,
            chronological_order: None,
        }
    }

    #[test]
    fn test_links_events_sharing_characters() {
        let events = vec![
            event("e1", 5, &["Rei"], "Rei joins the club."),
            event("e2", 8, &["Rei", "Kaito"], "Rei spars with Kaito."),
        ];
        let graph = CausalGraph::build(&events, &CausalConfig::default());
        assert_eq!(graph.links().len(), 1);
        assert_eq!(graph.links()[0].from, "e1");
        assert_eq!(graph.links()[0].to, "e2");
    }

    #[test]
    fn test_no_link_without_shared_cast() {
        let events = vec![
            event("e1", 5, &["Rei"], "Rei joins the club."),
            event("e2", 8, &["Kaito"], "Kaito trains alone."),
        ];
        let graph = CausalGraph::build(&events, &CausalConfig::default());
        assert!(graph.links().is_empty());
    }

    #[test]
    fn test_keyword_cue_sets_link_kind() {
        let events = vec![
            event("e1", 5, &["Rei"], "Rei challenges the captain."),
            event(
                "e2",
                8,
                &["Rei"],
                "Because of the challenge, the captain accepts a duel.",
            ),
        ];
        let graph = CausalGraph::build(&events, &CausalConfig::default());
        assert_eq!(graph.links()[0].kind, CausalLinkKind::Causes);
    }

    #[test]
    fn test_depth_is_longest_path() {
        let events = vec![
            event("e1", 1, &["Rei"], ""),
            event("e2", 4, &["Rei"], ""),
            event("e3", 7, &["Rei"], ""),
        ];
        // e1->e2, e1->e3, e2->e3: depth of e3 is 2, not 1
        let graph = CausalGraph::build(&events, &CausalConfig::default());
        assert_eq!(graph.depth("e1"), Some(0));
        assert_eq!(graph.depth("e2"), Some(1));
        assert_eq!(graph.depth("e3"), Some(2));
    }

    #[test]
    fn test_lookahead_bounds_comparisons() {
        let events: Vec<TimelineEvent> = (0..10)
            .map(|i| event(&format!("e{i}"), i, &["Rei"], ""))
            .collect();
        let config = CausalConfig {
            lookahead: 1,
            ..CausalConfig::default()
        };
        let graph = CausalGraph::build(&events, &config);
        // Only chain links survive a lookahead of 1
        assert_eq!(graph.links().len(), 9);
        assert_eq!(graph.depth("e9"), Some(9));
    }

    #[test]
    fn test_cycle_terminates_and_is_recorded() {
        let events = vec![event("e1", 1, &["Rei"], ""), event("e2", 4, &["Rei"], "")];
        let mut graph = CausalGraph::build(&events, &CausalConfig::default());
        // Force a back-edge e2 -> e1
        graph.add_link(CausalLink {
            from: "e2".to_string(),
            to: "e1".to_string(),
            kind: CausalLinkKind::Influences,
            strength: Confidence::new(0.5),
        });
        assert!(!graph.cycles().is_empty());
        // Every node still gets a depth
        assert!(graph.depth("e1").is_some());
        assert!(graph.depth("e2").is_some());
    }

    #[test]
    fn test_roots_have_no_incoming_links() {
        let events = vec![
            event("e1", 5, &["Rei"], ""),
            event("e2", 8, &["Rei"], ""),
            event("e3", 9, &["Mina"], ""),
        ];
        let graph = CausalGraph::build(&events, &CausalConfig::default());
        let roots = graph.roots();
        assert!(roots.contains(&"e1"));
        assert!(roots.contains(&"e3"));
        assert!(!roots.contains(&"e2"));
    }
}
