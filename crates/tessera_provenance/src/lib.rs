//! Audit trail and entity provenance.
//!
//! Every pipeline operation that touches an entity appends an operation
//! record to an append-only [`AuditTrail`] and updates that entity's
//! [`EntityProvenance`]. The trail answers "where did this come from" for
//! every entity in the merged storyline and "what did the pipeline do" for
//! the run as a whole.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod entry;
mod trail;

pub use entry::{AuditReport, EntityProvenance, PipelineStage, ProvenanceEntry};
pub use trail::AuditTrail;
