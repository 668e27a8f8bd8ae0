//! Top-level error wrapper types.

use crate::{
    IngestError, MigrationError, ProvenanceError, ProviderError, ReconcileError, ValidationError,
};

/// This is the foundation error enum for the Tessera workspace.
///
/// # Examples
///
/// ```
/// use tessera_error::{TesseraError, ReconcileError, ReconcileErrorKind};
///
/// let reconcile_err = ReconcileError::new(ReconcileErrorKind::NoBatches);
/// let err: TesseraError = reconcile_err.into();
/// assert!(format!("{}", err).contains("Reconcile Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TesseraErrorKind {
    /// Response ingestion error
    #[from(IngestError)]
    Ingest(IngestError),
    /// Schema validation error
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Schema migration error
    #[from(MigrationError)]
    Migration(MigrationError),
    /// Arbitration provider error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Provenance tracking error
    #[from(ProvenanceError)]
    Provenance(ProvenanceError),
    /// Reconciliation pipeline error
    #[from(ReconcileError)]
    Reconcile(ReconcileError),
}

/// Tessera error with kind discrimination.
///
/// # Examples
///
/// ```
/// use tessera_error::{TesseraResult, MigrationError, MigrationErrorKind};
///
/// fn might_fail() -> TesseraResult<()> {
///     Err(MigrationError::new(MigrationErrorKind::DetectionFailed))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tessera Error: {}", _0)]
pub struct TesseraError(Box<TesseraErrorKind>);

impl TesseraError {
    /// Create a new error from a kind.
    pub fn new(kind: TesseraErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TesseraErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to TesseraErrorKind
impl<T> From<T> for TesseraError
where
    T: Into<TesseraErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Tessera operations.
///
/// # Examples
///
/// ```
/// use tessera_error::{TesseraResult, IngestError, IngestErrorKind};
///
/// fn ingest() -> TesseraResult<String> {
///     Err(IngestError::new(IngestErrorKind::NoJsonFound { length: 0 }))?
/// }
/// ```
pub type TesseraResult<T> = std::result::Result<T, TesseraError>;
