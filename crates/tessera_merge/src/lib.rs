//! Cross-batch deduplication and contradiction resolution.
//!
//! Different batches mint different ids for the same character or event, so
//! cross-batch identity is resolved by similarity, never id equality. This
//! crate scores entity pairs, merges confident matches under a single merge
//! policy, escalates the uncertain middle band to LLM arbitration when a
//! driver is available, and detects and resolves conflicting facts about
//! matched entities.
//!
//! Similarity scoring and merging are pure functions; the only suspension
//! point is the arbitration boundary in [`tessera_interface::Arbiter`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod arbitration;
mod contradiction;
mod dedup;
mod policy;
mod similarity;

pub use arbitration::{resolve_query, same_entity_query};
pub use contradiction::{
    ContradictionConfig, apply_event_resolution, detect_event_contradictions, resolve,
    resolve_heuristic,
};
pub use dedup::{Band, Deduper, DedupConfig, DedupOutcome, Dedupable, DuplicateRecord};
pub use policy::{
    merge_characters, merge_descriptions, merge_events, merge_relationships, merge_themes,
};
pub use similarity::{
    character_similarity, event_similarity, narrative_proximity, relationship_similarity,
    theme_similarity, token_jaccard, token_overlap,
};
