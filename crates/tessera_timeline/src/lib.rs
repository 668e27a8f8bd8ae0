//! Coverage analysis and causal/temporal ordering.
//!
//! Everything here is advisory metadata over the merged timeline: gaps and
//! overlaps between batch page ranges, an inferred causal graph over events,
//! and the two orderings (reading and chronological) with their
//! discrepancies. Nothing in this crate blocks or mutates a merge.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod causal;
mod coverage;
mod ordering;

pub use causal::{CausalConfig, CausalGraph, CausalLink, CausalLinkKind};
pub use coverage::{Coverage, CoverageConfig, analyze, analyze_with, detect_gaps, stitch_events};
pub use ordering::{
    OrderingDiscrepancy, chronological_order, ordering_discrepancies, reading_order,
};
