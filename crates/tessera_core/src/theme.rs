//! Theme entities.

use crate::Confidence;
use serde::{Deserialize, Serialize};

/// A recurring theme extracted from one batch of pages.
///
/// Cross-batch identity is name-based: "found family" from batch 2 and
/// "Found Family" from batch 5 are the same theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Stable unique identifier
    pub id: String,
    /// Theme name; the cross-batch canonical key
    pub name: String,
    /// Free-text description
    pub description: String,
    /// How strongly the theme registers in this span
    #[serde(default)]
    pub strength: Confidence,
    /// Characters the theme centers on
    #[serde(default)]
    pub related_characters: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip() {
        let theme = Theme {
            id: "theme-1".to_string(),
            name: "Found family".to_string(),
            description: "The team becomes a family.".to_string(),
            strength: Confidence::new(0.8),
            related_characters: vec!["Rei".to_string()],
        };
        let json = serde_json::to_string(&theme).unwrap();
        let back: Theme = serde_json::from_str(&json).unwrap();
        assert_eq!(theme, back);
    }
}
