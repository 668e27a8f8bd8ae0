//! Contradiction and resolution types.

use crate::Confidence;
use serde::{Deserialize, Serialize};

/// What kind of facts disagree.
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
pub enum ContradictionKind {
    /// General factual disagreement
    Fact,
    /// Disagreement about when an event occurs
    Timeline,
    /// Disagreement about a character attribute
    Character,
    /// Disagreement about a relationship
    Relationship,
}

/// How serious a contradiction is.
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
pub enum Severity {
    /// Cosmetic disagreement, safe to merge
    Minor,
    /// Substantive disagreement needing arbitration
    Major,
    /// Disagreement that undermines the storyline if wrong
    Critical,
}

/// A detected disagreement between two representations of the same entity.
///
/// Contradictions are ephemeral: produced and consumed within one
/// reconciliation pass, never persisted into the storyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contradiction {
    /// Unique identifier for this detection
    pub id: String,
    /// What kind of facts disagree
    #[serde(rename = "type")]
    pub kind: ContradictionKind,
    /// Id of the first disagreeing element
    pub element_a: String,
    /// Id of the second disagreeing element
    pub element_b: String,
    /// Human-readable description of the disagreement
    pub description: String,
    /// How serious the disagreement is
    pub severity: Severity,
}

/// The chosen way to resolve a contradiction.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Resolution {
    /// Trust element A
    UseA,
    /// Trust element B
    UseB,
    /// Combine both per the merge policy
    Merge,
    /// Keep one side and mark for human review
    FlagForReview,
}

/// The outcome of resolving one contradiction.
///
/// A `FlagForReview` result is not a failure; it preserves the disagreement
/// as a visible annotation rather than dropping either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    /// The contradiction this resolves
    pub contradiction: Contradiction,
    /// The chosen resolution
    pub resolution: Resolution,
    /// Confidence in the resolution
    pub confidence: Confidence,
    /// Why this resolution was chosen
    pub reasoning: String,
}
