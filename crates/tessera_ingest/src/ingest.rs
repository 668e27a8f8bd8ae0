//! The top-level ingestion pipeline: locate, repair, migrate, validate,
//! decode.

use crate::{
    IngestWarning, extract_json, migrate, repair, schema::detect_version, validate_batch,
};
use serde_json::Value;
use tessera_core::{BatchResult, Confidence, mint_id};
use tessera_error::{
    IngestError, TesseraResult, ValidationError, ValidationErrorKind,
};

/// A successfully parsed payload plus the warnings accumulated getting there.
#[derive(Debug, Clone)]
pub struct Ingested {
    /// The parsed JSON value, migrated to the current schema
    pub data: Value,
    /// Non-fatal issues observed along the way
    pub warnings: Vec<IngestWarning>,
}

/// Page metadata for a batch, supplied by the caller alongside the raw text.
///
/// Extraction responses do not reliably echo their own page range, so the
/// orchestrator carries it separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("batch {} [{}, {}]", batch_index, start_page, end_page)]
pub struct BatchMeta {
    /// Position of this batch in the overall sequence
    pub batch_index: u32,
    /// First page covered
    pub start_page: u32,
    /// Last page covered
    pub end_page: u32,
}

/// A fully ingested batch.
///
/// `errors` being non-empty means some entities were excluded and the batch
/// should be treated as degraded, not dropped.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The decoded batch
    pub batch: BatchResult,
    /// Non-fatal quality warnings
    pub warnings: Vec<IngestWarning>,
    /// Hard validation failures for excluded entities
    pub errors: Vec<ValidationError>,
}

impl IngestOutcome {
    /// Whether any entity failed validation.
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse raw model text into a current-schema JSON value.
///
/// Attempts, in order: payload location (direct parse, fenced block, balanced
/// span, labelled prefix), then the textual repair sequence, then schema
/// migration to the current version.
///
/// # Errors
///
/// Returns [`IngestError`] when no payload is found or every repair fails.
///
/// # Examples
///
/// ```
/// use tessera_ingest::ingest;
///
/// let ingested = ingest(r#"```json
/// {"characters": [], "events": []}
/// ```"#).unwrap();
/// assert!(ingested.data.is_object());
/// ```
#[tracing::instrument(skip_all, fields(length = raw.len()))]
pub fn ingest(raw: &str) -> Result<Ingested, IngestError> {
    let candidate = extract_json(raw)?;
    let mut warnings = Vec::new();

    let data = match serde_json::from_str(&candidate) {
        Ok(value) => value,
        Err(parse_error) => {
            tracing::debug!(error = %parse_error, "Located payload unparseable, entering repair");
            let outcome = repair(&candidate)?;
            warnings.extend(outcome.applied.into_iter().map(|transform| {
                IngestWarning::RepairApplied {
                    transform: transform.to_string(),
                }
            }));
            outcome.value
        }
    };

    Ok(Ingested { data, warnings })
}

/// Ingest raw model text all the way to a typed [`BatchResult`].
///
/// Entities that fail validation are excluded from the decoded batch and
/// reported in `errors`; the batch itself survives. Missing entity ids are
/// minted.
///
/// # Errors
///
/// Fails only on unrecoverable parse failure or a missing migration path;
/// validation problems degrade the outcome instead.
#[tracing::instrument(skip(raw), fields(%meta))]
pub fn ingest_batch(raw: &str, meta: &BatchMeta) -> TesseraResult<IngestOutcome> {
    let Ingested { data, mut warnings } = ingest(raw)?;

    let version = detect_version(&data)?;
    let data = if version == crate::CURRENT_VERSION {
        data
    } else {
        warnings.push(IngestWarning::Migrated {
            from: version.to_string(),
        });
        migrate(data)?
    };

    let report = validate_batch(&data);
    warnings.extend(report.warnings);
    let mut errors = report.errors;

    let confidence = data
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| Confidence::new(c as f32))
        .unwrap_or_default();

    let batch = BatchResult {
        batch_index: meta.batch_index,
        start_page: meta.start_page,
        end_page: meta.end_page,
        characters: decode_entities(&data, "characters", "char", &mut errors),
        events: decode_entities(&data, "events", "event", &mut errors),
        themes: decode_entities(&data, "themes", "theme", &mut errors),
        relationships: decode_entities(&data, "relationships", "rel", &mut errors),
        confidence,
    };

    tracing::debug!(
        entities = batch.entity_count(),
        warnings = warnings.len(),
        errors = errors.len(),
        "Batch ingested"
    );

    Ok(IngestOutcome {
        batch,
        warnings,
        errors,
    })
}

/// Decode one entity array, skipping items that already failed validation and
/// minting ids where absent.
fn decode_entities<T: serde::de::DeserializeOwned>(
    data: &Value,
    field: &str,
    id_prefix: &str,
    errors: &mut Vec<ValidationError>,
) -> Vec<T> {
    let Some(items) = data.get(field).and_then(Value::as_array) else {
        return Vec::new();
    };

    let failed_paths: Vec<String> = errors.iter().map(|e| e.kind.path().to_string()).collect();
    let mut decoded = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let path = format!("/{}/{}", field, i);
        if failed_paths.iter().any(|p| p.starts_with(&path)) {
            continue;
        }

        let mut item = item.clone();
        if let Some(obj) = item.as_object_mut() {
            if !obj.contains_key("id") {
                obj.insert("id".to_string(), Value::String(mint_id(id_prefix)));
            }
        }

        match serde_json::from_value(item) {
            Ok(entity) => decoded.push(entity),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Entity failed to decode, excluding");
                errors.push(ValidationError::new(ValidationErrorKind::WrongType {
                    path,
                    expected: "decodable entity record",
                    found: "object",
                }));
            }
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Character;

    fn meta() -> BatchMeta {
        BatchMeta {
            batch_index: 0,
            start_page: 1,
            end_page: 20,
        }
    }

    #[test]
    fn test_round_trip_valid_batch() {
        let batch = BatchResult {
            batch_index: 0,
            start_page: 1,
            end_page: 20,
            characters: vec![Character {
                id: "char-1".to_string(),
                name: "Rei Ayama".to_string(),
                aliases: vec!["Rei".to_string()],
                description: "A transfer student hiding her past.".to_string(),
                first_appearance: 3,
                importance: tessera_core::Importance::Major,
                appearance: None,
                personality: None,
            }],
            events: vec![],
            themes: vec![],
            relationships: vec![],
            confidence: Confidence::new(0.9),
        };

        let raw = serde_json::to_string(&batch).unwrap();
        let outcome = ingest_batch(&raw, &meta()).unwrap();
        assert_eq!(outcome.batch, batch);
        assert!(!outcome.is_degraded());
    }

    #[test]
    fn test_ingest_batch_from_fenced_response() {
        let raw = r#"
Here is the extraction:

```json
{
  "characters": [
    {"name": "Rei", "aliases": [], "description": "A quiet transfer student.", "firstAppearance": 3, "importance": "major"}
  ],
  "events": [],
  "confidence": 0.8
}
```
"#;
        let outcome = ingest_batch(raw, &meta()).unwrap();
        assert_eq!(outcome.batch.characters.len(), 1);
        // No id in the payload, so one was minted
        assert!(outcome.batch.characters[0].id.starts_with("char-"));
        assert!(outcome
            .warnings
            .iter()
            .any(|w| matches!(w, IngestWarning::MintedId { .. })));
    }

    #[test]
    fn test_ingest_batch_migrates_old_shape() {
        let raw = r#"{
            "characters": [{"name": "Rei", "description": "A quiet transfer student.", "firstAppearance": 3, "importance": "major"}],
            "events": [{"page": 4, "title": "Arrival", "description": "Rei arrives at school.", "characters": ["Rei"]}]
        }"#;
        let outcome = ingest_batch(raw, &meta()).unwrap();
        assert_eq!(outcome.batch.events[0].page_number, 4);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| matches!(w, IngestWarning::Migrated { from } if from == "v1")));
    }

    #[test]
    fn test_invalid_entity_excluded_not_fatal() {
        let raw = r#"{
            "characters": [
                {"name": "Rei", "aliases": [], "description": "A quiet transfer student.", "firstAppearance": 3, "importance": "major"},
                {"name": "Broken", "aliases": [], "description": "No appearance page.", "importance": "minor"}
            ],
            "events": [{"pageNumber": 4, "title": "Arrival", "description": "Rei arrives.", "significance": "minor", "isFlashback": false}]
        }"#;
        let outcome = ingest_batch(raw, &meta()).unwrap();
        assert_eq!(outcome.batch.characters.len(), 1);
        assert!(outcome.is_degraded());
    }

    #[test]
    fn test_unrecoverable_text_is_parse_error() {
        assert!(ingest_batch("nothing structured here", &meta()).is_err());
    }

    #[test]
    fn test_repaired_response_reports_transforms() {
        let raw = r#"{"characters": [], "events": [],}"#;
        let ingested = ingest(raw).unwrap();
        assert!(ingested
            .warnings
            .iter()
            .any(|w| matches!(w, IngestWarning::RepairApplied { .. })));
    }
}
