//! Ingestion error types.

/// Specific error conditions for response ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum IngestErrorKind {
    /// No JSON payload could be located in the response text
    #[display("No JSON found in response (length: {})", length)]
    NoJsonFound {
        /// Length of the inspected response text
        length: usize,
    },
    /// The located payload failed to parse as JSON
    #[display("Failed to parse JSON: {}", _0)]
    Parse(String),
    /// Every repair transform was applied and none produced parseable JSON
    #[display(
        "Response unrecoverable after {} repair transforms: {}",
        attempts,
        message
    )]
    RepairExhausted {
        /// Number of repair transforms attempted
        attempts: usize,
        /// Final parse error message
        message: String,
    },
    /// The parsed payload had the wrong top-level shape
    #[display("Expected a JSON {}, found {}", expected, found)]
    WrongShape {
        /// Expected top-level JSON type
        expected: &'static str,
        /// Actual top-level JSON type
        found: &'static str,
    },
}

/// Error type for response ingestion.
///
/// # Examples
///
/// ```
/// use tessera_error::{IngestError, IngestErrorKind};
///
/// let err = IngestError::new(IngestErrorKind::NoJsonFound { length: 17 });
/// assert!(format!("{}", err).contains("No JSON found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Ingest Error: {} at line {} in {}", kind, line, file)]
pub struct IngestError {
    /// The specific error condition
    pub kind: IngestErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl IngestError {
    /// Create a new IngestError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: IngestErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
