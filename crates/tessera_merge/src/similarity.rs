//! Pairwise similarity scoring.
//!
//! Scores blend name/title overlap, alias overlap, description overlap, and
//! narrative proximity. All functions are pure and clamp to `[0, 1]`.

use crate::DedupConfig;
use std::collections::HashSet;
use tessera_core::{Character, Relationship, Theme, TimelineEvent};

/// Lowercased alphanumeric tokens of a text.
fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Jaccard similarity over the token sets of two texts.
///
/// # Examples
///
/// ```
/// use tessera_merge::token_jaccard;
///
/// assert_eq!(token_jaccard("Rei Ayama", "Rei Ayama"), 1.0);
/// assert_eq!(token_jaccard("Rei", "Rei Ayama"), 0.5);
/// assert_eq!(token_jaccard("Rei", "Kaito"), 0.0);
/// ```
pub fn token_jaccard(a: &str, b: &str) -> f32 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    intersection as f32 / union as f32
}

/// Overlap coefficient over the token sets of two texts.
///
/// `|A ∩ B| / min(|A|, |B|)`: a short name fully contained in a longer one
/// scores 1.0, which is exactly the "Rei" vs "Rei Ayama" case.
pub fn token_overlap(a: &str, b: &str) -> f32 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    let smaller = tokens_a.len().min(tokens_b.len());
    if smaller == 0 {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    intersection as f32 / smaller as f32
}

/// Overlap coefficient over two name sets, case-insensitive exact names.
fn name_set_overlap(a: &[&str], b: &[&str]) -> f32 {
    let set_a: HashSet<String> = a.iter().map(|n| n.to_lowercase()).collect();
    let set_b: HashSet<String> = b.iter().map(|n| n.to_lowercase()).collect();
    let smaller = set_a.len().min(set_b.len());
    if smaller == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f32 / smaller as f32
}

/// Inverse page distance, decaying linearly to 0 past `window` pages.
///
/// # Examples
///
/// ```
/// use tessera_merge::narrative_proximity;
///
/// assert_eq!(narrative_proximity(10, 10, 30), 1.0);
/// assert_eq!(narrative_proximity(10, 40, 30), 0.0);
/// assert!((narrative_proximity(10, 25, 30) - 0.5).abs() < 1e-6);
/// ```
pub fn narrative_proximity(page_a: u32, page_b: u32, window: u32) -> f32 {
    if window == 0 {
        return if page_a == page_b { 1.0 } else { 0.0 };
    }
    let distance = page_a.abs_diff(page_b);
    if distance >= window {
        return 0.0;
    }
    1.0 - distance as f32 / window as f32
}

/// Weighted similarity between two characters.
///
/// Name similarity takes the stronger of Jaccard and overlap coefficient so
/// partial names ("Rei" vs "Rei Ayama") register fully; the alias component
/// compares the full known-name sets.
pub fn character_similarity(a: &Character, b: &Character, config: &DedupConfig) -> f32 {
    let name = token_jaccard(&a.name, &b.name).max(token_overlap(&a.name, &b.name));
    let alias = name_set_overlap(&a.known_names(), &b.known_names());
    let description = token_jaccard(&a.description, &b.description);
    let proximity = narrative_proximity(a.first_appearance, b.first_appearance, config.proximity_window);

    blend(config, name, alias, description, proximity)
}

/// Weighted similarity between two timeline events.
///
/// The alias component is character-set overlap; events have no aliases.
pub fn event_similarity(a: &TimelineEvent, b: &TimelineEvent, config: &DedupConfig) -> f32 {
    let title = token_jaccard(&a.title, &b.title).max(token_overlap(&a.title, &b.title));
    let cast_a: Vec<&str> = a.characters.iter().map(String::as_str).collect();
    let cast_b: Vec<&str> = b.characters.iter().map(String::as_str).collect();
    let cast = name_set_overlap(&cast_a, &cast_b);
    let description = token_jaccard(&a.description, &b.description);
    let proximity = narrative_proximity(a.page_number, b.page_number, config.proximity_window);

    blend(config, title, cast, description, proximity)
}

/// Weighted similarity between two themes (name-based identity).
pub fn theme_similarity(a: &Theme, b: &Theme, config: &DedupConfig) -> f32 {
    let name = token_jaccard(&a.name, &b.name).max(token_overlap(&a.name, &b.name));
    let cast_a: Vec<&str> = a.related_characters.iter().map(String::as_str).collect();
    let cast_b: Vec<&str> = b.related_characters.iter().map(String::as_str).collect();
    let cast = name_set_overlap(&cast_a, &cast_b);
    let description = token_jaccard(&a.description, &b.description);

    // Themes have no page anchor; fold proximity weight into the name term.
    let weights = config.name_weight + config.proximity_weight;
    clamp(
        name * weights
            + cast * config.alias_weight
            + description * config.description_weight,
    )
}

/// Similarity between two relationships (pair-and-kind identity).
///
/// An exact pair-key match dominates; otherwise the blend of pair overlap and
/// description similarity.
pub fn relationship_similarity(a: &Relationship, b: &Relationship, config: &DedupConfig) -> f32 {
    if a.pair_key() == b.pair_key() {
        return 1.0;
    }
    let pair_a = [a.character_a.as_str(), a.character_b.as_str()];
    let pair_b = [b.character_a.as_str(), b.character_b.as_str()];
    let pair = name_set_overlap(&pair_a, &pair_b);
    let kind = token_jaccard(&a.kind, &b.kind);
    let description = token_jaccard(&a.description, &b.description);

    clamp(
        pair * (config.name_weight + config.proximity_weight)
            + kind * config.alias_weight
            + description * config.description_weight,
    )
}

fn blend(config: &DedupConfig, name: f32, alias: f32, description: f32, proximity: f32) -> f32 {
    clamp(
        name * config.name_weight
            + alias * config.alias_weight
            + description * config.description_weight
            + proximity * config.proximity_weight,
    )
}

fn clamp(score: f32) -> f32 {
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Confidence, Importance, Significance};

    fn character(name: &str, aliases: &[&str], description: &str, page: u32) -> Character {
        Character {
            id: tessera_core::mint_id("char"),
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            description: description.to_string(),
            first_appearance: page,
            importance: Importance::Supporting,
            appearance: None,
            personality: None,
        }
    }

    #[test]
    fn test_identical_characters_score_high() {
        let config = DedupConfig::default();
        let a = character("Rei Ayama", &["Rei"], "A quiet transfer student.", 3);
        let score = character_similarity(&a, &a.clone(), &config);
        assert!(score > 0.95);
    }

    #[test]
    fn test_partial_name_with_shared_alias() {
        let config = DedupConfig::default();
        let a = character("Rei", &[], "A quiet transfer student.", 5);
        let b = character("Rei Ayama", &["Rei"], "Quiet transfer student with a secret.", 18);
        let score = character_similarity(&a, &b, &config);
        assert!(score > config.merge_threshold, "score {} too low", score);
    }

    #[test]
    fn test_unrelated_characters_score_low() {
        let config = DedupConfig::default();
        let a = character("Rei Ayama", &[], "A quiet transfer student.", 5);
        let b = character("Coach Tanaka", &[], "The gruff kendo instructor.", 60);
        let score = character_similarity(&a, &b, &config);
        assert!(score < config.low_floor, "score {} too high", score);
    }

    #[test]
    fn test_event_similarity_uses_cast_overlap() {
        let config = DedupConfig::default();
        let a = TimelineEvent {
            id: "e1".to_string(),
            page_number: 16,
            chapter_number: None,
            title: "Rooftop confrontation".to_string(),
            description: "Rei confronts the captain.".to_string(),
            characters: vec!["Rei".to_string(), "Captain".to_string()],
            significance: Significance::Major,
            is_flashback: false,
            chronological_order: None,
        };
        let mut b = a.clone();
        b.id = "e2".to_string();
        b.page_number = 17;
        b.title = "Confrontation on the rooftop".to_string();
        assert!(event_similarity(&a, &b, &config) > 0.8);
    }

    #[test]
    fn test_relationship_pair_key_dominates() {
        let config = DedupConfig::default();
        let a = Relationship {
            id: "r1".to_string(),
            character_a: "Rei".to_string(),
            character_b: "Kaito".to_string(),
            kind: "rivals".to_string(),
            description: "Sparring partners.".to_string(),
            strength: Confidence::default(),
            first_page: 4,
        };
        let mut b = a.clone();
        b.id = "r2".to_string();
        b.character_a = "Kaito".to_string();
        b.character_b = "Rei".to_string();
        b.description = "They compete constantly.".to_string();
        assert_eq!(relationship_similarity(&a, &b, &config), 1.0);
    }
}
