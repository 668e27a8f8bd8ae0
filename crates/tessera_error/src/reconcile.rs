//! Reconciliation pipeline error types.

/// Specific error conditions for the reconciliation orchestrator.
///
/// Only structural failures live here; per-batch problems degrade the batch
/// rather than erroring the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ReconcileErrorKind {
    /// Reconciliation was requested with no batches supplied
    #[display("No batches supplied to reconcile")]
    NoBatches,
    /// A batch declared an inverted or empty page range
    #[display("Batch {} has invalid page range [{}, {}]", batch_index, start_page, end_page)]
    InvalidRange {
        /// Index of the offending batch
        batch_index: u32,
        /// Declared start page
        start_page: u32,
        /// Declared end page
        end_page: u32,
    },
    /// Reconciliation was cancelled by the caller
    #[display("Reconciliation cancelled during {}", stage)]
    Cancelled {
        /// Stage during which cancellation was observed
        stage: String,
    },
}

/// Error type for the reconciliation orchestrator.
///
/// # Examples
///
/// ```
/// use tessera_error::{ReconcileError, ReconcileErrorKind};
///
/// let err = ReconcileError::new(ReconcileErrorKind::NoBatches);
/// assert!(format!("{}", err).contains("No batches"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Reconcile Error: {} at line {} in {}", kind, line, file)]
pub struct ReconcileError {
    /// The specific error condition
    pub kind: ReconcileErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ReconcileError {
    /// Create a new ReconcileError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ReconcileErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
