//! Contradiction detection and resolution for matched entity pairs.
//!
//! Detection runs on pairs the deduplicator already matched; the question is
//! never "are these the same event" but "these are the same event, whose
//! facts do we trust".

use crate::{merge_events, resolve_query};
use serde::{Deserialize, Serialize};
use tessera_core::{
    Confidence, Contradiction, ContradictionKind, Resolution, ResolutionResult, Severity,
    Significance, TimelineEvent, mint_id,
};
use tessera_interface::{Arbiter, ArbiterDriver, Verdict, VerdictChoice};
use tracing::{debug, warn};

/// Thresholds for detecting and resolving contradictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContradictionConfig {
    /// Page disagreement at or below this is noise, not a contradiction
    pub page_tolerance: u32,
    /// Batch confidence gap above which the higher side wins outright
    pub confidence_gap: f32,
}

impl Default for ContradictionConfig {
    fn default() -> Self {
        Self {
            page_tolerance: 5,
            confidence_gap: 0.3,
        }
    }
}

/// Detect disagreements between two records of the same event.
///
/// A page disagreement beyond the tolerance is a timeline contradiction whose
/// severity follows the event's significance; flashback-flag and
/// significance-rating disagreements are minor factual ones.
pub fn detect_event_contradictions(
    a: &TimelineEvent,
    b: &TimelineEvent,
    config: &ContradictionConfig,
) -> Vec<Contradiction> {
    let mut found = Vec::new();

    let distance = a.page_number.abs_diff(b.page_number);
    if distance > config.page_tolerance {
        found.push(Contradiction {
            id: mint_id("contra"),
            kind: ContradictionKind::Timeline,
            element_a: a.id.clone(),
            element_b: b.id.clone(),
            description: format!(
                "\"{}\" placed on page {} and page {}",
                a.title, a.page_number, b.page_number
            ),
            severity: severity_for(a.significance.max(b.significance)),
        });
    }

    if a.is_flashback != b.is_flashback {
        found.push(Contradiction {
            id: mint_id("contra"),
            kind: ContradictionKind::Fact,
            element_a: a.id.clone(),
            element_b: b.id.clone(),
            description: format!("\"{}\" marked as flashback in only one batch", a.title),
            severity: Severity::Minor,
        });
    }

    if a.significance != b.significance {
        found.push(Contradiction {
            id: mint_id("contra"),
            kind: ContradictionKind::Fact,
            element_a: a.id.clone(),
            element_b: b.id.clone(),
            description: format!(
                "\"{}\" rated {} and {}",
                a.title, a.significance, b.significance
            ),
            severity: Severity::Minor,
        });
    }

    found
}

fn severity_for(significance: Significance) -> Severity {
    match significance {
        Significance::Critical => Severity::Critical,
        Significance::Major => Severity::Major,
        Significance::Minor | Significance::Moderate => Severity::Minor,
    }
}

/// Resolve a contradiction without arbitration.
///
/// A batch confidence gap above the threshold means the higher-confidence
/// side wins, with the gap itself as the resolution confidence. Minor
/// contradictions merge. Everything else is flagged for review.
pub fn resolve_heuristic(
    contradiction: &Contradiction,
    confidence_a: Confidence,
    confidence_b: Confidence,
    config: &ContradictionConfig,
) -> ResolutionResult {
    let gap = confidence_a.gap(confidence_b);
    if gap > config.confidence_gap {
        let (resolution, winner) = if confidence_a > confidence_b {
            (Resolution::UseA, "A")
        } else {
            (Resolution::UseB, "B")
        };
        return ResolutionResult {
            contradiction: contradiction.clone(),
            resolution,
            confidence: Confidence::new(gap),
            reasoning: format!(
                "Batch confidence gap {:.2} favors side {}",
                gap, winner
            ),
        };
    }

    if contradiction.severity == Severity::Minor {
        return ResolutionResult {
            contradiction: contradiction.clone(),
            resolution: Resolution::Merge,
            confidence: Confidence::default(),
            reasoning: "Minor disagreement, merged under the merge policy".to_string(),
        };
    }

    ResolutionResult {
        contradiction: contradiction.clone(),
        resolution: Resolution::FlagForReview,
        confidence: Confidence::new(0.2),
        reasoning: "No decisive signal without arbitration".to_string(),
    }
}

/// Resolve a contradiction, escalating the undecided cases to arbitration.
///
/// Decisive heuristic signals (confidence gap, minor severity) skip the
/// provider entirely. Provider failure or an unusable verdict degrades to
/// [`Resolution::FlagForReview`]; resolution itself never fails.
#[tracing::instrument(skip_all, fields(id = %contradiction.id, kind = %contradiction.kind))]
pub async fn resolve<D: ArbiterDriver>(
    contradiction: &Contradiction,
    side_a: &str,
    side_b: &str,
    confidence_a: Confidence,
    confidence_b: Confidence,
    arbiter: &Arbiter<D>,
    config: &ContradictionConfig,
) -> ResolutionResult {
    let heuristic = resolve_heuristic(contradiction, confidence_a, confidence_b, config);
    if heuristic.resolution != Resolution::FlagForReview {
        return heuristic;
    }

    let request = resolve_query(contradiction, side_a, side_b);
    match arbiter.ask(request).await {
        Ok(answer) => match Verdict::parse(&answer) {
            Ok(verdict) => {
                debug!(choice = %verdict.choice, "Arbitrated contradiction");
                from_verdict(contradiction, verdict)
            }
            Err(e) => {
                warn!(error = %e, "Unusable arbitration verdict, flagging for review");
                heuristic
            }
        },
        Err(e) => {
            warn!(error = %e, "Arbitration unavailable, flagging for review");
            heuristic
        }
    }
}

fn from_verdict(contradiction: &Contradiction, verdict: Verdict) -> ResolutionResult {
    let resolution = match verdict.choice {
        VerdictChoice::A => Resolution::UseA,
        VerdictChoice::B => Resolution::UseB,
        VerdictChoice::Merge | VerdictChoice::Yes => Resolution::Merge,
        VerdictChoice::Unsure | VerdictChoice::No => Resolution::FlagForReview,
    };
    ResolutionResult {
        contradiction: contradiction.clone(),
        resolution,
        confidence: verdict.confidence,
        reasoning: format!("Arbitration answered `{}`", verdict.choice),
    }
}

/// Apply a resolution to the event pair it concerns.
///
/// `FlagForReview` keeps side A but makes the disagreement visible in the
/// description rather than dropping either record.
pub fn apply_event_resolution(
    result: &ResolutionResult,
    a: TimelineEvent,
    b: TimelineEvent,
) -> TimelineEvent {
    match result.resolution {
        Resolution::UseA => a,
        Resolution::UseB => b,
        Resolution::Merge => merge_events(a, b),
        Resolution::FlagForReview => {
            let mut kept = a;
            kept.description = format!(
                "{} [review: {}]",
                kept.description.trim_end(),
                result.contradiction.description
            );
            kept
        }
    }
}
