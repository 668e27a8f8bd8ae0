//! Provenance error types.

/// Specific error conditions for provenance tracking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProvenanceErrorKind {
    /// No provenance record exists for the entity
    #[display("No provenance recorded for entity '{}'", _0)]
    UnknownEntity(String),
    /// A lineage entry references an operation missing from the trail
    #[display("Lineage entry '{}' for entity '{}' not found in audit trail", entry, entity)]
    MissingLineageEntry {
        /// Entity whose lineage is broken
        entity: String,
        /// The unresolvable operation id
        entry: String,
    },
    /// The audit trail was already finalized
    #[display("Audit trail already finalized at {}", _0)]
    AlreadyFinalized(String),
}

/// Error type for provenance tracking.
///
/// # Examples
///
/// ```
/// use tessera_error::{ProvenanceError, ProvenanceErrorKind};
///
/// let err = ProvenanceError::new(ProvenanceErrorKind::UnknownEntity("char-1".to_string()));
/// assert!(format!("{}", err).contains("char-1"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provenance Error: {} at line {} in {}", kind, line, file)]
pub struct ProvenanceError {
    /// The specific error condition
    pub kind: ProvenanceErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ProvenanceError {
    /// Create a new ProvenanceError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProvenanceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
