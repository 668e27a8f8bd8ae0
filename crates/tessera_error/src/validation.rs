//! Validation error types.

/// Specific error conditions for schema validation.
///
/// Every variant carries a JSON-pointer-like `path` locating the offending
/// field, e.g. `/characters/3/name`.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum ValidationErrorKind {
    /// A required field is absent
    #[display("Missing required field at {}", path)]
    MissingField {
        /// JSON-pointer-like path to the field
        path: String,
    },
    /// A field holds a value of the wrong JSON type
    #[display("Wrong type at {}: expected {}, found {}", path, expected, found)]
    WrongType {
        /// JSON-pointer-like path to the field
        path: String,
        /// Expected JSON type
        expected: &'static str,
        /// Actual JSON type
        found: &'static str,
    },
    /// A string field holds a value outside the allowed enum set
    #[display("Invalid value '{}' at {}: expected one of {}", value, path, allowed)]
    InvalidEnum {
        /// JSON-pointer-like path to the field
        path: String,
        /// The offending value
        value: String,
        /// Comma-separated allowed values
        allowed: String,
    },
    /// A numeric field is outside its permitted range
    #[display("Value {} out of range [{}, {}] at {}", value, min, max, path)]
    OutOfRange {
        /// JSON-pointer-like path to the field
        path: String,
        /// The offending value
        value: f64,
        /// Minimum permitted value
        min: f64,
        /// Maximum permitted value
        max: f64,
    },
}

impl ValidationErrorKind {
    /// The JSON-pointer-like path carried by this condition.
    pub fn path(&self) -> &str {
        match self {
            Self::MissingField { path }
            | Self::WrongType { path, .. }
            | Self::InvalidEnum { path, .. }
            | Self::OutOfRange { path, .. } => path,
        }
    }
}

/// Error type for schema validation.
///
/// # Examples
///
/// ```
/// use tessera_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::MissingField {
///     path: "/characters/0/name".to_string(),
/// });
/// assert!(format!("{}", err).contains("/characters/0/name"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The specific error condition
    pub kind: ValidationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
