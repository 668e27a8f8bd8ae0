//! Provenance record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tessera_core::mint_id;

/// Which pipeline stage performed an operation.
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
pub enum PipelineStage {
    /// Batch ingestion from raw model output
    Extraction,
    /// Deduplication and entity merging
    Merge,
    /// Schema migration or other shape changes
    Transform,
    /// Validation passes, including degraded batches
    Validation,
    /// Final storyline export
    Export,
}

/// One operation recorded in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceEntry {
    /// Unique operation id
    pub id: String,
    /// The stage that performed the operation
    pub stage: PipelineStage,
    /// Human-readable description of what happened
    pub description: String,
    /// Entities touched by the operation
    pub entity_ids: Vec<String>,
    /// When the operation was recorded
    pub timestamp: DateTime<Utc>,
    /// Free-form context, e.g. batch index or similarity score
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ProvenanceEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(stage: PipelineStage, description: impl Into<String>, entity_ids: Vec<String>) -> Self {
        Self {
            id: mint_id("op"),
            stage,
            description: description.into(),
            entity_ids,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata key/value pair.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The full history of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityProvenance {
    /// The entity this history belongs to
    pub entity_id: String,
    /// Operation id that first produced the entity
    pub created_by: String,
    /// Operation ids that later modified it, in order
    #[serde(default)]
    pub modified_by: Vec<String>,
    /// Every operation id in the entity's history, creation included
    #[serde(default)]
    pub lineage: Vec<String>,
}

/// A run-level summary exported from the trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// Operation counts per stage
    pub operations_by_stage: HashMap<String, usize>,
    /// Entities first seen during the run
    pub entities_created: usize,
    /// Entities modified after creation
    pub entities_modified: usize,
    /// When the trail was opened
    pub started_at: DateTime<Utc>,
    /// When the trail was finalized, if it was
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_mints_operation_id() {
        let entry = ProvenanceEntry::new(PipelineStage::Merge, "merged", vec!["c1".to_string()]);
        assert!(entry.id.starts_with("op-"));
    }

    #[test]
    fn test_metadata_builder() {
        let entry = ProvenanceEntry::new(PipelineStage::Extraction, "ingested", vec![])
            .with_metadata("batchIndex", "2");
        assert_eq!(entry.metadata.get("batchIndex").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_stage_serializes_lowercase() {
        let json = serde_json::to_string(&PipelineStage::Validation).unwrap();
        assert_eq!(json, "\"validation\"");
    }
}
