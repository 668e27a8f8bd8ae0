//! Cross-batch deduplication.

use crate::{
    character_similarity, event_similarity, merge_characters, merge_events, merge_relationships,
    merge_themes, relationship_similarity, same_entity_query, theme_similarity,
};
use serde::{Deserialize, Serialize};
use tessera_core::{Character, Relationship, Theme, TimelineEvent};
use tessera_interface::{Arbiter, ArbiterDriver, Verdict, VerdictChoice};
use tracing::{debug, warn};

/// Thresholds and weights for similarity scoring and merge decisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DedupConfig {
    /// Weight of the name/title component
    pub name_weight: f32,
    /// Weight of the alias/cast component
    pub alias_weight: f32,
    /// Weight of the description component
    pub description_weight: f32,
    /// Weight of the narrative-proximity component
    pub proximity_weight: f32,
    /// Pages beyond which narrative proximity decays to zero
    pub proximity_window: u32,
    /// Scores below this are distinct; at or above, candidates for merging
    pub low_floor: f32,
    /// Scores at or above this merge automatically
    pub auto_merge_floor: f32,
    /// Heuristic cut for the middle band when no arbiter is available
    pub merge_threshold: f32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            name_weight: 0.4,
            alias_weight: 0.2,
            description_weight: 0.25,
            proximity_weight: 0.15,
            proximity_window: 30,
            low_floor: 0.4,
            auto_merge_floor: 0.9,
            merge_threshold: 0.7,
        }
    }
}

/// Which similarity band a pair falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Band {
    /// Below the low floor; never merged
    #[display("distinct")]
    Distinct,
    /// Middle band; arbitrated or compared against the merge threshold
    #[display("escalate")]
    Escalate,
    /// At or above the auto-merge floor; merged without arbitration
    #[display("auto-merge")]
    AutoMerge,
}

impl DedupConfig {
    /// Classify a similarity score into its decision band.
    ///
    /// The auto-merge floor is inclusive: exactly 0.9 auto-merges, 0.89 is
    /// escalated.
    pub fn band(&self, score: f32) -> Band {
        if score >= self.auto_merge_floor {
            Band::AutoMerge
        } else if score >= self.low_floor {
            Band::Escalate
        } else {
            Band::Distinct
        }
    }
}

/// Record of one absorbed duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateRecord {
    /// Id of the surviving entity
    pub kept: String,
    /// Id of the absorbed entity
    pub removed: String,
    /// Why the pair was merged
    pub reason: String,
}

/// The result of deduplicating one entity collection.
#[derive(Debug, Clone)]
pub struct DedupOutcome<T> {
    /// The deduplicated set: every surviving entity
    pub unique: Vec<T>,
    /// Ids within `unique` that absorbed at least one duplicate
    pub merged: Vec<String>,
    /// One record per absorbed duplicate
    pub duplicates: Vec<DuplicateRecord>,
}

/// An entity kind the deduplicator knows how to score and merge.
///
/// Merging and scoring are pure; `summarize` renders the entity for an
/// arbitration prompt.
pub trait Dedupable: Clone {
    /// Stable id of this entity.
    fn id(&self) -> &str;
    /// Similarity to another entity of the same kind.
    fn similarity(&self, other: &Self, config: &DedupConfig) -> f32;
    /// Merge `loser` into `winner` per the merge policy.
    fn merge(winner: Self, loser: Self) -> Self;
    /// Ranking key for survivor choice: richer description, more aliases,
    /// earlier appearance, in that priority order.
    fn richness(&self) -> (usize, usize, std::cmp::Reverse<u32>);
    /// Short rendering for arbitration prompts.
    fn summarize(&self) -> String;
}

impl Dedupable for Character {
    fn id(&self) -> &str {
        &self.id
    }

    fn similarity(&self, other: &Self, config: &DedupConfig) -> f32 {
        character_similarity(self, other, config)
    }

    fn merge(winner: Self, loser: Self) -> Self {
        merge_characters(winner, loser)
    }

    fn richness(&self) -> (usize, usize, std::cmp::Reverse<u32>) {
        (
            self.description.len(),
            self.aliases.len(),
            std::cmp::Reverse(self.first_appearance),
        )
    }

    fn summarize(&self) -> String {
        format!(
            "name: {}; aliases: {}; first seen: page {}; description: {}",
            self.name,
            self.aliases.join(", "),
            self.first_appearance,
            self.description
        )
    }
}

impl Dedupable for TimelineEvent {
    fn id(&self) -> &str {
        &self.id
    }

    fn similarity(&self, other: &Self, config: &DedupConfig) -> f32 {
        event_similarity(self, other, config)
    }

    fn merge(winner: Self, loser: Self) -> Self {
        merge_events(winner, loser)
    }

    fn richness(&self) -> (usize, usize, std::cmp::Reverse<u32>) {
        (
            self.description.len(),
            self.characters.len(),
            std::cmp::Reverse(self.page_number),
        )
    }

    fn summarize(&self) -> String {
        format!(
            "title: {}; page: {}; characters: {}; description: {}",
            self.title,
            self.page_number,
            self.characters.join(", "),
            self.description
        )
    }
}

impl Dedupable for Theme {
    fn id(&self) -> &str {
        &self.id
    }

    fn similarity(&self, other: &Self, config: &DedupConfig) -> f32 {
        theme_similarity(self, other, config)
    }

    fn merge(winner: Self, loser: Self) -> Self {
        merge_themes(winner, loser)
    }

    fn richness(&self) -> (usize, usize, std::cmp::Reverse<u32>) {
        (self.description.len(), self.related_characters.len(), std::cmp::Reverse(0))
    }

    fn summarize(&self) -> String {
        format!("theme: {}; description: {}", self.name, self.description)
    }
}

impl Dedupable for Relationship {
    fn id(&self) -> &str {
        &self.id
    }

    fn similarity(&self, other: &Self, config: &DedupConfig) -> f32 {
        relationship_similarity(self, other, config)
    }

    fn merge(winner: Self, loser: Self) -> Self {
        merge_relationships(winner, loser)
    }

    fn richness(&self) -> (usize, usize, std::cmp::Reverse<u32>) {
        (self.description.len(), 0, std::cmp::Reverse(self.first_page))
    }

    fn summarize(&self) -> String {
        format!(
            "{} and {}: {} ({})",
            self.character_a, self.character_b, self.kind, self.description
        )
    }
}

/// Deduplicates entity collections under a [`DedupConfig`].
#[derive(Debug, Clone, Default)]
pub struct Deduper {
    config: DedupConfig,
}

impl Deduper {
    /// Create a deduper with the given configuration.
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Deduplicate without arbitration; the middle band is decided by the
    /// heuristic score against `merge_threshold`.
    ///
    /// Runs to a fixpoint so the result is idempotent: deduplicating an
    /// already-deduplicated set changes nothing.
    #[tracing::instrument(skip_all, fields(input = items.len()))]
    pub fn dedupe<T: Dedupable>(&self, items: Vec<T>) -> DedupOutcome<T> {
        let mut outcome = DedupOutcome {
            unique: items,
            merged: Vec::new(),
            duplicates: Vec::new(),
        };
        loop {
            let before = outcome.duplicates.len();
            outcome = self.pass(outcome);
            if outcome.duplicates.len() == before {
                break;
            }
        }
        debug!(
            unique = outcome.unique.len(),
            duplicates = outcome.duplicates.len(),
            "Deduplication complete"
        );
        outcome
    }

    /// Deduplicate with LLM arbitration for the middle band.
    ///
    /// Provider failures degrade to the heuristic decision; arbitration never
    /// fails the pass.
    #[tracing::instrument(skip_all, fields(input = items.len()))]
    pub async fn dedupe_with_arbiter<T, D>(
        &self,
        items: Vec<T>,
        arbiter: &Arbiter<D>,
    ) -> DedupOutcome<T>
    where
        T: Dedupable,
        D: ArbiterDriver,
    {
        let mut outcome = DedupOutcome {
            unique: items,
            merged: Vec::new(),
            duplicates: Vec::new(),
        };
        loop {
            let before = outcome.duplicates.len();
            outcome = self.pass_async(outcome, arbiter).await;
            if outcome.duplicates.len() == before {
                break;
            }
        }
        outcome
    }

    /// One heuristic-only pass.
    fn pass<T: Dedupable>(&self, outcome: DedupOutcome<T>) -> DedupOutcome<T> {
        let DedupOutcome {
            unique: items,
            mut merged,
            mut duplicates,
        } = outcome;

        let mut accepted: Vec<T> = Vec::with_capacity(items.len());
        for item in items {
            match self.best_match(&accepted, &item) {
                Some((index, score)) if self.should_merge_heuristic(score) => {
                    let existing = accepted.swap_remove(index);
                    let reason = format!("similarity {:.2} ({})", score, self.config.band(score));
                    Self::absorb(existing, item, reason, &mut accepted, &mut merged, &mut duplicates);
                }
                _ => accepted.push(item),
            }
        }

        DedupOutcome {
            unique: accepted,
            merged,
            duplicates,
        }
    }

    /// One pass with arbitration available for the middle band.
    async fn pass_async<T, D>(
        &self,
        outcome: DedupOutcome<T>,
        arbiter: &Arbiter<D>,
    ) -> DedupOutcome<T>
    where
        T: Dedupable,
        D: ArbiterDriver,
    {
        let DedupOutcome {
            unique: items,
            mut merged,
            mut duplicates,
        } = outcome;

        let mut accepted: Vec<T> = Vec::with_capacity(items.len());
        for item in items {
            let decision = match self.best_match(&accepted, &item) {
                Some((index, score)) => match self.config.band(score) {
                    Band::AutoMerge => Some((index, score, "auto".to_string())),
                    Band::Escalate => {
                        if self.verify_same(&accepted[index], &item, arbiter).await {
                            Some((index, score, "arbitrated".to_string()))
                        } else {
                            None
                        }
                    }
                    Band::Distinct => None,
                },
                None => None,
            };

            match decision {
                Some((index, score, how)) => {
                    let existing = accepted.swap_remove(index);
                    let reason = format!("similarity {:.2} ({})", score, how);
                    Self::absorb(existing, item, reason, &mut accepted, &mut merged, &mut duplicates);
                }
                None => accepted.push(item),
            }
        }

        DedupOutcome {
            unique: accepted,
            merged,
            duplicates,
        }
    }

    /// Ask the arbiter whether two entities are the same; fall back to the
    /// heuristic on any provider failure.
    async fn verify_same<T, D>(&self, a: &T, b: &T, arbiter: &Arbiter<D>) -> bool
    where
        T: Dedupable,
        D: ArbiterDriver,
    {
        let request = same_entity_query(&a.summarize(), &b.summarize());
        match arbiter.ask(request).await {
            Ok(answer) => match Verdict::parse(&answer) {
                Ok(Verdict {
                    choice: VerdictChoice::Yes | VerdictChoice::Merge,
                    ..
                }) => true,
                Ok(Verdict {
                    choice: VerdictChoice::No,
                    ..
                }) => false,
                Ok(_) | Err(_) => self.heuristic_fallback(a, b),
            },
            Err(e) => {
                warn!(error = %e, "Arbitration unavailable, falling back to heuristic");
                self.heuristic_fallback(a, b)
            }
        }
    }

    fn heuristic_fallback<T: Dedupable>(&self, a: &T, b: &T) -> bool {
        a.similarity(b, &self.config) >= self.config.merge_threshold
    }

    fn should_merge_heuristic(&self, score: f32) -> bool {
        match self.config.band(score) {
            Band::AutoMerge => true,
            Band::Escalate => score >= self.config.merge_threshold,
            Band::Distinct => false,
        }
    }

    /// Best-scoring candidate above the low floor, if any.
    fn best_match<T: Dedupable>(&self, accepted: &[T], item: &T) -> Option<(usize, f32)> {
        accepted
            .iter()
            .enumerate()
            .map(|(i, existing)| (i, existing.similarity(item, &self.config)))
            .filter(|(_, score)| *score >= self.config.low_floor)
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Merge a matched pair, keeping the richer record as survivor.
    fn absorb<T: Dedupable>(
        existing: T,
        incoming: T,
        reason: String,
        accepted: &mut Vec<T>,
        merged: &mut Vec<String>,
        duplicates: &mut Vec<DuplicateRecord>,
    ) {
        let (winner, loser) = if existing.richness() >= incoming.richness() {
            (existing, incoming)
        } else {
            (incoming, existing)
        };
        duplicates.push(DuplicateRecord {
            kept: winner.id().to_string(),
            removed: loser.id().to_string(),
            reason,
        });
        let survivor = T::merge(winner, loser);
        if !merged.contains(&survivor.id().to_string()) {
            merged.push(survivor.id().to_string());
        }
        accepted.push(survivor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Importance;

    fn character(id: &str, name: &str, aliases: &[&str], description: &str, page: u32) -> Character {
        Character {
            id: id.to_string(),
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            description: description.to_string(),
            first_appearance: page,
            importance: Importance::Supporting,
            appearance: None,
            personality: None,
        }
    }

    #[test]
    fn test_band_boundary_inclusive() {
        let config = DedupConfig::default();
        assert_eq!(config.band(0.9), Band::AutoMerge);
        assert_eq!(config.band(0.89), Band::Escalate);
        assert_eq!(config.band(0.4), Band::Escalate);
        assert_eq!(config.band(0.39), Band::Distinct);
    }

    #[test]
    fn test_merges_partial_name_match() {
        let deduper = Deduper::default();
        let outcome = deduper.dedupe(vec![
            character("c1", "Rei", &[], "A quiet transfer student.", 5),
            character(
                "c2",
                "Rei Ayama",
                &["Rei"],
                "Quiet transfer student with a hidden past.",
                18,
            ),
        ]);
        assert_eq!(outcome.unique.len(), 1);
        assert_eq!(outcome.duplicates.len(), 1);

        let survivor = &outcome.unique[0];
        // The richer record wins; the loser's name becomes an alias.
        assert_eq!(survivor.name, "Rei Ayama");
        assert!(survivor.aliases.iter().any(|a| a == "Rei"));
        assert_eq!(survivor.first_appearance, 5);
    }

    #[test]
    fn test_distinct_characters_kept() {
        let deduper = Deduper::default();
        let outcome = deduper.dedupe(vec![
            character("c1", "Rei Ayama", &[], "A quiet transfer student.", 5),
            character("c2", "Coach Tanaka", &[], "The gruff kendo instructor.", 60),
        ]);
        assert_eq!(outcome.unique.len(), 2);
        assert!(outcome.duplicates.is_empty());
    }

    #[test]
    fn test_idempotent_on_deduplicated_set() {
        let deduper = Deduper::default();
        let first = deduper.dedupe(vec![
            character("c1", "Rei", &[], "A quiet transfer student.", 5),
            character(
                "c2",
                "Rei Ayama",
                &["Rei"],
                "Quiet transfer student with a hidden past.",
                18,
            ),
            character("c3", "Coach Tanaka", &[], "The gruff kendo instructor.", 60),
        ]);
        let first_unique: Vec<String> =
            first.unique.iter().map(|c| c.id.clone()).collect();

        let second = deduper.dedupe(first.unique.clone());
        let second_unique: Vec<String> =
            second.unique.iter().map(|c| c.id.clone()).collect();

        assert_eq!(first_unique.len(), second_unique.len());
        assert!(second.duplicates.is_empty());
        for id in first_unique {
            assert!(second_unique.contains(&id));
        }
    }

    #[test]
    fn test_duplicate_record_names_both_sides() {
        let deduper = Deduper::default();
        let outcome = deduper.dedupe(vec![
            character("c1", "Rei", &[], "Short.", 5),
            character("c2", "Rei", &[], "A much longer and richer description of Rei.", 5),
        ]);
        assert_eq!(outcome.duplicates.len(), 1);
        let record = &outcome.duplicates[0];
        assert_eq!(record.kept, "c2");
        assert_eq!(record.removed, "c1");
        assert_eq!(outcome.merged, vec!["c2".to_string()]);
    }
}
