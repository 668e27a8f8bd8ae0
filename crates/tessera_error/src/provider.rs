//! Arbitration provider error types.

/// Specific error conditions for LLM arbitration calls.
///
/// Provider failures never abort reconciliation; callers degrade to the
/// heuristic path and log the error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// The arbitration call exceeded its deadline
    #[display("Arbitration call timed out after {}ms", _0)]
    Timeout(u64),
    /// The provider returned an error
    #[display("Provider call failed: {}", _0)]
    Failed(String),
    /// The provider returned an empty response
    #[display("Provider returned an empty response")]
    EmptyResponse,
    /// The provider response could not be mapped to a verdict
    #[display("Could not parse verdict from response: {}", _0)]
    UnparseableVerdict(String),
}

impl ProviderErrorKind {
    /// Whether this failure is worth retrying.
    ///
    /// Timeouts and transport failures are transient; an unparseable verdict
    /// from a healthy provider is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Failed(_))
    }
}

/// Error type for arbitration provider calls.
///
/// # Examples
///
/// ```
/// use tessera_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new(ProviderErrorKind::Timeout(5000));
/// assert!(format!("{}", err).contains("timed out"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The specific error condition
    pub kind: ProviderErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
