//! Reconciler configuration.

use serde::{Deserialize, Serialize};
use tessera_merge::{ContradictionConfig, DedupConfig};
use tessera_timeline::{CausalConfig, CoverageConfig};

/// Every tunable of a reconciliation run, bundled.
///
/// Defaults match the per-stage defaults; callers override the pieces they
/// care about.
///
/// # Examples
///
/// ```
/// use tessera_engine::ReconcilerConfig;
///
/// let mut config = ReconcilerConfig::default();
/// config.dedup.merge_threshold = 0.8;
/// assert_eq!(config.contradiction.page_tolerance, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconcilerConfig {
    /// Deduplication weights and thresholds
    pub dedup: DedupConfig,
    /// Contradiction detection and resolution thresholds
    pub contradiction: ContradictionConfig,
    /// Causal link inference tuning
    pub causal: CausalConfig,
    /// Gap/overlap analysis tuning
    pub coverage: CoverageConfig,
    /// Position difference tolerated between reading and chronological order
    pub ordering_tolerance: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            dedup: DedupConfig::default(),
            contradiction: ContradictionConfig::default(),
            causal: CausalConfig::default(),
            coverage: CoverageConfig::default(),
            ordering_tolerance: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stage_defaults() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.dedup, DedupConfig::default());
        assert_eq!(config.ordering_tolerance, 2);
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = ReconcilerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ReconcilerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
