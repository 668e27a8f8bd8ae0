//! The append-only audit trail.

use crate::{AuditReport, EntityProvenance, PipelineStage, ProvenanceEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tessera_error::{ProvenanceError, ProvenanceErrorKind};
use tracing::debug;

/// Append-only record of every operation in a reconciliation run.
///
/// Entries are never removed or rewritten; a finalized trail accepts no
/// further appends. Per-entity histories are derived as entries arrive: the
/// first operation touching an entity becomes its `created_by`, later ones
/// accumulate in `modified_by` and `lineage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrail {
    entries: Vec<ProvenanceEntry>,
    entities: HashMap<String, EntityProvenance>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditTrail {
    /// Open a new, empty trail.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            entities: HashMap::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// All recorded operations, oldest first.
    pub fn entries(&self) -> &[ProvenanceEntry] {
        &self.entries
    }

    /// The derived history for one entity.
    ///
    /// # Errors
    ///
    /// Returns [`ProvenanceError`] with `UnknownEntity` when no operation has
    /// touched the entity.
    pub fn entity(&self, entity_id: &str) -> Result<&EntityProvenance, ProvenanceError> {
        self.entities.get(entity_id).ok_or_else(|| {
            ProvenanceError::new(ProvenanceErrorKind::UnknownEntity(entity_id.to_string()))
        })
    }

    /// Whether the trail has been finalized.
    pub fn is_finalized(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Record a batch extraction.
    ///
    /// # Errors
    ///
    /// Fails when the trail is already finalized.
    pub fn record_extraction(
        &mut self,
        description: impl Into<String>,
        entity_ids: Vec<String>,
    ) -> Result<String, ProvenanceError> {
        self.append(ProvenanceEntry::new(
            PipelineStage::Extraction,
            description,
            entity_ids,
        ))
    }

    /// Record a merge operation.
    ///
    /// # Errors
    ///
    /// Fails when the trail is already finalized.
    pub fn record_merge(
        &mut self,
        description: impl Into<String>,
        entity_ids: Vec<String>,
    ) -> Result<String, ProvenanceError> {
        self.append(ProvenanceEntry::new(
            PipelineStage::Merge,
            description,
            entity_ids,
        ))
    }

    /// Record a transform, e.g. a schema migration.
    ///
    /// # Errors
    ///
    /// Fails when the trail is already finalized.
    pub fn record_transform(
        &mut self,
        description: impl Into<String>,
        entity_ids: Vec<String>,
    ) -> Result<String, ProvenanceError> {
        self.append(ProvenanceEntry::new(
            PipelineStage::Transform,
            description,
            entity_ids,
        ))
    }

    /// Record a validation outcome, including degraded batches.
    ///
    /// # Errors
    ///
    /// Fails when the trail is already finalized.
    pub fn record_validation(
        &mut self,
        description: impl Into<String>,
        entity_ids: Vec<String>,
    ) -> Result<String, ProvenanceError> {
        self.append(ProvenanceEntry::new(
            PipelineStage::Validation,
            description,
            entity_ids,
        ))
    }

    /// Record a storyline export.
    ///
    /// # Errors
    ///
    /// Fails when the trail is already finalized.
    pub fn record_export(
        &mut self,
        description: impl Into<String>,
        entity_ids: Vec<String>,
    ) -> Result<String, ProvenanceError> {
        self.append(ProvenanceEntry::new(
            PipelineStage::Export,
            description,
            entity_ids,
        ))
    }

    /// Append a prepared entry, returning its operation id.
    ///
    /// # Errors
    ///
    /// Fails when the trail is already finalized.
    pub fn append(&mut self, entry: ProvenanceEntry) -> Result<String, ProvenanceError> {
        if let Some(completed) = self.completed_at {
            return Err(ProvenanceError::new(ProvenanceErrorKind::AlreadyFinalized(
                completed.to_rfc3339(),
            )));
        }

        for entity_id in &entry.entity_ids {
            match self.entities.get_mut(entity_id) {
                Some(history) => {
                    history.modified_by.push(entry.id.clone());
                    history.lineage.push(entry.id.clone());
                }
                None => {
                    self.entities.insert(
                        entity_id.clone(),
                        EntityProvenance {
                            entity_id: entity_id.clone(),
                            created_by: entry.id.clone(),
                            modified_by: Vec::new(),
                            lineage: vec![entry.id.clone()],
                        },
                    );
                }
            }
        }

        let operation_id = entry.id.clone();
        self.entries.push(entry);
        Ok(operation_id)
    }

    /// Check that every lineage entry for an entity resolves in the trail.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` for an untracked id and `MissingLineageEntry`
    /// when a lineage operation id is absent from the entries.
    pub fn verify_integrity(&self, entity_id: &str) -> Result<(), ProvenanceError> {
        let history = self.entity(entity_id)?;
        for operation in &history.lineage {
            if !self.entries.iter().any(|e| e.id == *operation) {
                return Err(ProvenanceError::new(
                    ProvenanceErrorKind::MissingLineageEntry {
                        entity: entity_id.to_string(),
                        entry: operation.clone(),
                    },
                ));
            }
        }
        Ok(())
    }

    /// Summarize the run: operation counts per stage, entity churn, duration.
    pub fn export_report(&self) -> AuditReport {
        let mut operations_by_stage: HashMap<String, usize> = HashMap::new();
        for entry in &self.entries {
            *operations_by_stage
                .entry(entry.stage.to_string())
                .or_default() += 1;
        }

        AuditReport {
            operations_by_stage,
            entities_created: self.entities.len(),
            entities_modified: self
                .entities
                .values()
                .filter(|e| !e.modified_by.is_empty())
                .count(),
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }

    /// Close the trail. Further appends fail.
    ///
    /// # Errors
    ///
    /// Fails when the trail was already finalized.
    pub fn finalize(&mut self) -> Result<(), ProvenanceError> {
        if let Some(completed) = self.completed_at {
            return Err(ProvenanceError::new(ProvenanceErrorKind::AlreadyFinalized(
                completed.to_rfc3339(),
            )));
        }
        self.completed_at = Some(Utc::now());
        debug!(entries = self.entries.len(), "Audit trail finalized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_operation_creates_entity_history() {
        let mut trail = AuditTrail::new();
        trail
            .record_extraction("batch 0", vec!["char-1".to_string()])
            .unwrap();
        let history = trail.entity("char-1").unwrap();
        assert!(history.modified_by.is_empty());
        assert_eq!(history.lineage.len(), 1);
        assert_eq!(history.created_by, history.lineage[0]);
    }

    #[test]
    fn test_later_operations_extend_lineage() {
        let mut trail = AuditTrail::new();
        trail
            .record_extraction("batch 0", vec!["char-1".to_string()])
            .unwrap();
        trail
            .record_merge("absorbed duplicate", vec!["char-1".to_string()])
            .unwrap();
        let history = trail.entity("char-1").unwrap();
        assert_eq!(history.modified_by.len(), 1);
        assert_eq!(history.lineage.len(), 2);
    }

    #[test]
    fn test_unknown_entity_errors() {
        let trail = AuditTrail::new();
        assert!(trail.entity("char-404").is_err());
    }

    #[test]
    fn test_verify_integrity_passes_for_recorded_entity() {
        let mut trail = AuditTrail::new();
        trail
            .record_extraction("batch 0", vec!["char-1".to_string()])
            .unwrap();
        trail
            .record_merge("dedup", vec!["char-1".to_string()])
            .unwrap();
        assert!(trail.verify_integrity("char-1").is_ok());
    }

    #[test]
    fn test_finalized_trail_rejects_appends() {
        let mut trail = AuditTrail::new();
        trail.finalize().unwrap();
        assert!(trail.record_export("done", vec![]).is_err());
        assert!(trail.finalize().is_err());
    }

    #[test]
    fn test_report_counts_by_stage() {
        let mut trail = AuditTrail::new();
        trail
            .record_extraction("batch 0", vec!["char-1".to_string()])
            .unwrap();
        trail
            .record_extraction("batch 1", vec!["char-2".to_string()])
            .unwrap();
        trail
            .record_merge("dedup", vec!["char-1".to_string()])
            .unwrap();
        let report = trail.export_report();
        assert_eq!(report.operations_by_stage.get("extraction"), Some(&2));
        assert_eq!(report.operations_by_stage.get("merge"), Some(&1));
        assert_eq!(report.entities_created, 2);
        assert_eq!(report.entities_modified, 1);
        assert!(report.completed_at.is_none());
    }
}
