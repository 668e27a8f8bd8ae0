//! Schema migration error types.

/// Specific error conditions for schema migration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum MigrationErrorKind {
    /// The declared or detected source version is not registered
    #[display("Unknown schema version '{}'", _0)]
    UnknownVersion(String),
    /// No chain of migrations connects the two versions
    #[display("No migration path from '{}' to '{}'", from, to)]
    NoPath {
        /// Source schema version
        from: String,
        /// Destination schema version
        to: String,
    },
    /// A migration step failed while transforming the data
    #[display("Migration step '{}' failed: {}", step, message)]
    StepFailed {
        /// Name of the failing migration step
        step: String,
        /// Failure detail
        message: String,
    },
    /// The source version could not be detected from structural cues
    #[display("Could not detect schema version from data shape")]
    DetectionFailed,
}

/// Error type for schema migration.
///
/// # Examples
///
/// ```
/// use tessera_error::{MigrationError, MigrationErrorKind};
///
/// let err = MigrationError::new(MigrationErrorKind::NoPath {
///     from: "v1".to_string(),
///     to: "v3".to_string(),
/// });
/// assert!(format!("{}", err).contains("No migration path"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Migration Error: {} at line {} in {}", kind, line, file)]
pub struct MigrationError {
    /// The specific error condition
    pub kind: MigrationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl MigrationError {
    /// Create a new MigrationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MigrationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
