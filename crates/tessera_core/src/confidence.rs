//! Clamped confidence scores.

use serde::{Deserialize, Serialize};

/// A confidence or similarity score clamped to `[0.0, 1.0]`.
///
/// Construction clamps out-of-range values rather than rejecting them;
/// extraction responses routinely report scores like `1.2` or `-0.1` and the
/// pipeline treats them as saturated rather than malformed.
///
/// # Examples
///
/// ```
/// use tessera_core::Confidence;
///
/// let c = Confidence::new(1.7);
/// assert_eq!(c.value(), 1.0);
///
/// let gap = Confidence::new(0.9).gap(Confidence::new(0.4));
/// assert!((gap - 0.5).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Confidence(f32);

impl Confidence {
    /// Zero confidence.
    pub const ZERO: Confidence = Confidence(0.0);
    /// Full confidence.
    pub const FULL: Confidence = Confidence(1.0);

    /// Create a new confidence score, clamping to `[0.0, 1.0]`.
    ///
    /// NaN clamps to zero.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// The raw score.
    pub fn value(&self) -> f32 {
        self.0
    }

    /// Absolute difference between two scores.
    pub fn gap(&self, other: Confidence) -> f32 {
        (self.0 - other.0).abs()
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self(0.5)
    }
}

impl From<f32> for Confidence {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Confidence> for f32 {
    fn from(value: Confidence) -> Self {
        value.0
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
