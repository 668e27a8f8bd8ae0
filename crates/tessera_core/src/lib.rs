//! Core data types for the Tessera reconciliation engine.
//!
//! This crate defines the narrative domain model shared across the workspace:
//! batch results arriving from per-batch extraction calls, the entities they
//! carry (characters, timeline events, themes, relationships), the merged
//! [`Storyline`], and the wire types used for LLM arbitration.
//!
//! Wire shapes use camelCase field names, matching the JSON emitted by the
//! extraction prompts.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod character;
mod confidence;
mod contradiction;
mod coverage;
mod event;
mod message;
mod relationship;
mod request;
mod role;
mod storyline;
mod theme;

pub use batch::BatchResult;
pub use character::{Character, Importance};
pub use confidence::Confidence;
pub use contradiction::{
    Contradiction, ContradictionKind, Resolution, ResolutionResult, Severity,
};
pub use coverage::{GapKind, MergeGap, OverlapRegion};
pub use event::{Significance, TimelineEvent};
pub use message::Message;
pub use relationship::Relationship;
pub use request::{CompletionRequest, CompletionResponse};
pub use role::Role;
pub use storyline::Storyline;
pub use theme::Theme;

/// Mint a fresh unique entity id with the given prefix.
///
/// Batches mint their own ids per model call; the engine uses this when an
/// ingested entity arrives without one.
///
/// # Examples
///
/// ```
/// let id = tessera_core::mint_id("char");
/// assert!(id.starts_with("char-"));
/// ```
pub fn mint_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}
