//! Prompt construction for arbitration queries.
//!
//! Queries ask for a single-line answer so [`tessera_interface::Verdict`]
//! can parse the response; deterministic settings keep arbitration repeatable.

use tessera_core::{CompletionRequest, Contradiction, Message};

const ARBITER_ROLE: &str = "You are reconciling entity extractions from sequential batches of a \
     single manga. Answer on one line only, in the exact format requested.";

/// Build a query asking whether two entity records describe the same entity.
///
/// The expected answer format is `yes <confidence>` or `no <confidence>`.
pub fn same_entity_query(a: &str, b: &str) -> CompletionRequest {
    let question = format!(
        "Two batches produced these records. Do they describe the same entity?\n\n\
         Record A: {a}\n\
         Record B: {b}\n\n\
         Answer with exactly one line: `yes <confidence>` or `no <confidence>`, \
         where confidence is a decimal between 0 and 1."
    );
    CompletionRequest {
        messages: vec![Message::system(ARBITER_ROLE), Message::user(&question)],
        max_tokens: Some(16),
        temperature: Some(0.0),
    }
}

/// Build a query asking which side of a contradiction to trust.
///
/// The expected answer format is `a`, `b`, or `merge`, followed by a
/// confidence.
pub fn resolve_query(contradiction: &Contradiction, a: &str, b: &str) -> CompletionRequest {
    let question = format!(
        "Two batches disagree about the same {} fact ({} severity): {}\n\n\
         Side A: {a}\n\
         Side B: {b}\n\n\
         Which side should the reconciled storyline trust? Answer with exactly \
         one line: `a <confidence>`, `b <confidence>`, or `merge <confidence>`.",
        contradiction.kind, contradiction.severity, contradiction.description,
    );
    CompletionRequest {
        messages: vec![Message::system(ARBITER_ROLE), Message::user(&question)],
        max_tokens: Some(16),
        temperature: Some(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{ContradictionKind, Severity};

    #[test]
    fn test_same_entity_query_carries_both_records() {
        let request = same_entity_query("name: Rei", "name: Rei Ayama");
        assert_eq!(request.temperature, Some(0.0));
        let user = &request.messages[1].content;
        assert!(user.contains("Record A: name: Rei"));
        assert!(user.contains("Record B: name: Rei Ayama"));
    }

    #[test]
    fn test_resolve_query_names_kind_and_severity() {
        let contradiction = Contradiction {
            id: "contra-1".to_string(),
            kind: ContradictionKind::Timeline,
            element_a: "event-1".to_string(),
            element_b: "event-2".to_string(),
            description: "Pages 40 and 46 disagree.".to_string(),
            severity: Severity::Major,
        };
        let request = resolve_query(&contradiction, "page 40", "page 46");
        let user = &request.messages[1].content;
        assert!(user.contains("timeline"));
        assert!(user.contains("major"));
    }
}
