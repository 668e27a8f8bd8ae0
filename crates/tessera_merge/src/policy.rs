//! The merge policy: how two records of the same entity combine.
//!
//! All merges are winner/loser oriented: the caller picks the survivor (the
//! richer record) and the loser's information folds into it. No field is
//! dropped silently; disagreements resolve toward the more informative value.

use std::collections::HashSet;
use tessera_core::{Character, Confidence, Relationship, Theme, TimelineEvent};

/// Combine two free-text descriptions.
///
/// If either description subsumes the other at the token level, the longer
/// one stands alone; otherwise both are kept, joined into one text.
///
/// # Examples
///
/// ```
/// use tessera_merge::merge_descriptions;
///
/// assert_eq!(
///     merge_descriptions("A quiet student.", "A quiet student."),
///     "A quiet student."
/// );
/// let merged = merge_descriptions("Captain of the kendo team.", "Hiding an injury.");
/// assert!(merged.contains("kendo") && merged.contains("injury"));
/// ```
pub fn merge_descriptions(a: &str, b: &str) -> String {
    let (longer, shorter) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if shorter.trim().is_empty() || subsumes(longer, shorter) {
        return longer.to_string();
    }
    let mut merged = longer.trim_end().to_string();
    if !merged.ends_with(['.', '!', '?']) {
        merged.push('.');
    }
    merged.push(' ');
    merged.push_str(shorter.trim());
    merged
}

/// Whether every token of `b` appears in `a`.
fn subsumes(a: &str, b: &str) -> bool {
    let tokens_a: HashSet<String> = tokens(a);
    tokens(b).iter().all(|t| tokens_a.contains(t))
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Fold `loser` into `winner`.
///
/// The winner keeps its primary name; the loser's name and aliases become
/// aliases. First appearance is the earliest of the two, importance the
/// higher, and optional fields prefer whichever side has a value.
pub fn merge_characters(winner: Character, loser: Character) -> Character {
    let mut aliases = winner.aliases.clone();
    let mut push_alias = |candidate: &str| {
        let duplicate = candidate.eq_ignore_ascii_case(&winner.name)
            || aliases.iter().any(|a| a.eq_ignore_ascii_case(candidate));
        if !duplicate && !candidate.is_empty() {
            aliases.push(candidate.to_string());
        }
    };
    push_alias(&loser.name);
    for alias in &loser.aliases {
        push_alias(alias);
    }

    Character {
        id: winner.id,
        name: winner.name.clone(),
        aliases,
        description: merge_descriptions(&winner.description, &loser.description),
        first_appearance: winner.first_appearance.min(loser.first_appearance),
        importance: winner.importance.max(loser.importance),
        appearance: winner.appearance.or(loser.appearance),
        personality: winner.personality.or(loser.personality),
    }
}

/// Fold `loser` into `winner`.
///
/// Page is the earliest sighting, the cast is the union, significance the
/// higher, and the event is a flashback if either record says so.
pub fn merge_events(winner: TimelineEvent, loser: TimelineEvent) -> TimelineEvent {
    let mut characters = winner.characters.clone();
    for name in &loser.characters {
        if !characters.iter().any(|c| c.eq_ignore_ascii_case(name)) {
            characters.push(name.clone());
        }
    }

    TimelineEvent {
        id: winner.id,
        page_number: winner.page_number.min(loser.page_number),
        chapter_number: winner.chapter_number.or(loser.chapter_number),
        title: winner.title,
        description: merge_descriptions(&winner.description, &loser.description),
        characters,
        significance: winner.significance.max(loser.significance),
        is_flashback: winner.is_flashback || loser.is_flashback,
        chronological_order: match (winner.chronological_order, loser.chronological_order) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        },
    }
}

/// Fold `loser` into `winner`: union of related characters, strongest
/// observed strength.
pub fn merge_themes(winner: Theme, loser: Theme) -> Theme {
    let mut related = winner.related_characters.clone();
    for name in &loser.related_characters {
        if !related.iter().any(|c| c.eq_ignore_ascii_case(name)) {
            related.push(name.clone());
        }
    }
    Theme {
        id: winner.id,
        name: winner.name,
        description: merge_descriptions(&winner.description, &loser.description),
        strength: max_confidence(winner.strength, loser.strength),
        related_characters: related,
    }
}

/// Fold `loser` into `winner`: earliest sighting, strongest observed
/// strength.
pub fn merge_relationships(winner: Relationship, loser: Relationship) -> Relationship {
    Relationship {
        id: winner.id,
        character_a: winner.character_a,
        character_b: winner.character_b,
        kind: winner.kind,
        description: merge_descriptions(&winner.description, &loser.description),
        strength: max_confidence(winner.strength, loser.strength),
        first_page: winner.first_page.min(loser.first_page),
    }
}

/// The stronger of two confidence scores.
pub(crate) fn max_confidence(a: Confidence, b: Confidence) -> Confidence {
    if a >= b { a } else { b }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{Importance, Significance};

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
    fn test_loser_name_becomes_alias() {
        let winner = character("Rei Ayama", &[], "Transfer student.", 18);
        let loser = character("Rei", &[], "Transfer student.", 5);
        let merged = merge_characters(winner, loser);
        assert_eq!(merged.name, "Rei Ayama");
        assert_eq!(merged.aliases, vec!["Rei".to_string()]);
        assert_eq!(merged.first_appearance, 5);
    }

    #[test]
    fn test_aliases_deduplicate_case_insensitively() {
        let winner = character("Rei Ayama", &["Rei"], "Transfer student.", 5);
        let loser = character("rei", &["REI AYAMA"], "Transfer student.", 7);
        let merged = merge_characters(winner, loser);
        assert_eq!(merged.aliases, vec!["Rei".to_string()]);
    }

    #[test]
    fn test_importance_keeps_higher() {
        let mut winner = character("Rei", &[], "Student.", 5);
        let mut loser = character("Rei", &[], "Student.", 5);
        winner.importance = Importance::Minor;
        loser.importance = Importance::Major;
        assert_eq!(
            merge_characters(winner, loser).importance,
            Importance::Major
        );
    }

    #[test]
    fn test_optional_fields_prefer_present() {
        let winner = character("Rei", &[], "Student.", 5);
        let mut loser = character("Rei", &[], "Student.", 5);
        loser.personality = Some("Reserved".to_string());
        assert_eq!(
            merge_characters(winner, loser).personality.as_deref(),
            Some("Reserved")
        );
    }

    #[test]
    fn test_descriptions_concatenate_when_disjoint() {
        let merged = merge_descriptions("Captain of the kendo team.", "Hiding a knee injury.");
        assert!(merged.contains("kendo"));
        assert!(merged.contains("injury"));
    }

    #[test]
    fn test_subsumed_description_not_repeated() {
        let merged = merge_descriptions("A quiet transfer student with a secret.", "A quiet student");
        assert_eq!(merged, "A quiet transfer student with a secret.");
    }

    fn event(title: &str, page: u32, cast: &[&str]) -> TimelineEvent {
        TimelineEvent {
            id: tessera_core::mint_id("event"),
            page_number: page,
            chapter_number: None,
            title: title.to_string(),
            description: format!("{}.", title),
            characters: cast.iter().map(|c| c.to_string()).collect(),
            significance: Significance::Moderate,
            is_flashback: false,
            chronological_order: None,
        }
    }

    #[test]
    fn test_event_merge_unions_cast_and_keeps_earliest_page() {
        let winner = event("Rooftop confrontation", 41, &["Rei", "Captain"]);
        let loser = event("Confrontation", 40, &["Rei", "Kaito"]);
        let merged = merge_events(winner, loser);
        assert_eq!(merged.page_number, 40);
        assert_eq!(merged.characters.len(), 3);
    }

    #[test]
    fn test_event_flashback_is_sticky() {
        let winner = event("Memory", 12, &["Rei"]);
        let mut loser = event("Memory", 12, &["Rei"]);
        loser.is_flashback = true;
        assert!(merge_events(winner, loser).is_flashback);
    }

    #[test]
    fn test_theme_keeps_max_strength() {
        let winner = Theme {
            id: "t1".to_string(),
            name: "Found family".to_string(),
            description: "The team becomes a family.".to_string(),
            strength: Confidence::new(0.4),
            related_characters: vec!["Rei".to_string()],
        };
        let mut loser = winner.clone();
        loser.id = "t2".to_string();
        loser.strength = Confidence::new(0.9);
        loser.related_characters = vec!["Kaito".to_string()];
        let merged = merge_themes(winner, loser);
        assert_eq!(merged.strength, Confidence::new(0.9));
        assert_eq!(merged.related_characters.len(), 2);
    }

    #[test]
    fn test_relationship_keeps_earliest_page() {
        let winner = Relationship {
            id: "r1".to_string(),
            character_a: "Rei".to_string(),
            character_b: "Kaito".to_string(),
            kind: "rivals".to_string(),
            description: "Sparring partners.".to_string(),
            strength: Confidence::new(0.6),
            first_page: 14,
        };
        let mut loser = winner.clone();
        loser.id = "r2".to_string();
        loser.first_page = 4;
        loser.strength = Confidence::new(0.8);
        let merged = merge_relationships(winner, loser);
        assert_eq!(merged.first_page, 4);
        assert_eq!(merged.strength, Confidence::new(0.8));
    }
}
