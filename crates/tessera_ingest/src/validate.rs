//! Field-by-field validation of migrated payloads.
//!
//! Validation separates hard failures from quality issues: a missing title is
//! a [`ValidationError`] that excludes the entity from decoding, while an
//! empty description is an [`IngestWarning`] the batch carries forward.

use serde_json::Value;
use tessera_error::{ValidationError, ValidationErrorKind};

/// A non-fatal data-quality issue observed during ingestion.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum IngestWarning {
    /// A repair transform was needed before the payload parsed
    #[display("repair transform applied: {}", transform)]
    RepairApplied {
        /// Name of the transform
        transform: String,
    },
    /// The payload arrived in an older schema version
    #[display("migrated from schema {}", from)]
    Migrated {
        /// Detected source version
        from: String,
    },
    /// A string field was present but empty
    #[display("empty field at {}", path)]
    EmptyField {
        /// JSON-pointer-like path
        path: String,
    },
    /// A description too short to be useful for similarity scoring
    #[display("short description at {} ({} chars)", path, length)]
    ShortDescription {
        /// JSON-pointer-like path
        path: String,
        /// Observed length
        length: usize,
    },
    /// An entity arrived without an id; one was minted
    #[display("minted id for entity at {}", path)]
    MintedId {
        /// JSON-pointer-like path
        path: String,
    },
}

/// The outcome of validating one payload.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Hard failures; entities at these paths are excluded from decoding
    pub errors: Vec<ValidationError>,
    /// Non-fatal quality issues
    pub warnings: Vec<IngestWarning>,
}

impl ValidationReport {
    /// Whether the payload passed with no hard failures.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Descriptions shorter than this draw a quality warning.
const MIN_DESCRIPTION_CHARS: usize = 10;

const IMPORTANCE_VALUES: &[&str] = &["major", "supporting", "minor"];
const SIGNIFICANCE_VALUES: &[&str] = &["minor", "moderate", "major", "critical"];

/// Validate a current-schema batch payload field by field.
///
/// # Examples
///
/// ```
/// use tessera_ingest::validate_batch;
///
/// let data = serde_json::json!({
///     "characters": [{"name": "", "description": "x", "firstAppearance": 1, "importance": "major"}]
/// });
/// let report = validate_batch(&data);
/// assert!(report.is_clean());
/// assert!(!report.warnings.is_empty());
/// ```
#[tracing::instrument(skip_all)]
pub fn validate_batch(data: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(obj) = data.as_object() else {
        report.errors.push(ValidationError::new(ValidationErrorKind::WrongType {
            path: "/".to_string(),
            expected: "object",
            found: json_type(data),
        }));
        return report;
    };

    if let Some(confidence) = obj.get("confidence") {
        check_unit_range(confidence, "/confidence", &mut report);
    }

    if let Some(characters) = obj.get("characters") {
        check_array(characters, "/characters", &mut report, validate_character);
    }
    if let Some(events) = obj.get("events") {
        check_array(events, "/events", &mut report, validate_event);
    }
    if let Some(themes) = obj.get("themes") {
        check_array(themes, "/themes", &mut report, validate_theme);
    }
    if let Some(relationships) = obj.get("relationships") {
        check_array(relationships, "/relationships", &mut report, validate_relationship);
    }

    if !report.errors.is_empty() {
        tracing::warn!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Validation found hard failures"
        );
    }
    report
}

fn validate_character(character: &Value, path: &str, report: &mut ValidationReport) {
    require_string(character, path, "name", report);
    require_string(character, path, "description", report);
    require_number(character, path, "firstAppearance", report);
    require_enum(character, path, "importance", IMPORTANCE_VALUES, report);
    check_description_quality(character, path, report);
    check_id(character, path, report);
}

fn validate_event(event: &Value, path: &str, report: &mut ValidationReport) {
    require_string(event, path, "title", report);
    require_string(event, path, "description", report);
    require_number(event, path, "pageNumber", report);
    require_enum(event, path, "significance", SIGNIFICANCE_VALUES, report);
    if let Some(flag) = event.get("isFlashback") {
        if !flag.is_boolean() {
            report.errors.push(ValidationError::new(ValidationErrorKind::WrongType {
                path: format!("{}/isFlashback", path),
                expected: "boolean",
                found: json_type(flag),
            }));
        }
    }
    check_description_quality(event, path, report);
    check_id(event, path, report);
}

fn validate_theme(theme: &Value, path: &str, report: &mut ValidationReport) {
    require_string(theme, path, "name", report);
    require_string(theme, path, "description", report);
    if let Some(strength) = theme.get("strength") {
        check_unit_range(strength, &format!("{}/strength", path), report);
    }
    check_id(theme, path, report);
}

fn validate_relationship(relationship: &Value, path: &str, report: &mut ValidationReport) {
    require_string(relationship, path, "characterA", report);
    require_string(relationship, path, "characterB", report);
    require_string(relationship, path, "type", report);
    if let Some(strength) = relationship.get("strength") {
        check_unit_range(strength, &format!("{}/strength", path), report);
    }
    check_id(relationship, path, report);
}

fn check_array(
    value: &Value,
    path: &str,
    report: &mut ValidationReport,
    validate_item: fn(&Value, &str, &mut ValidationReport),
) {
    let Some(items) = value.as_array() else {
        report.errors.push(ValidationError::new(ValidationErrorKind::WrongType {
            path: path.to_string(),
            expected: "array",
            found: json_type(value),
        }));
        return;
    };
    for (i, item) in items.iter().enumerate() {
        let item_path = format!("{}/{}", path, i);
        if !item.is_object() {
            report.errors.push(ValidationError::new(ValidationErrorKind::WrongType {
                path: item_path,
                expected: "object",
                found: json_type(item),
            }));
            continue;
        }
        validate_item(item, &item_path, report);
    }
}

fn require_string(entity: &Value, path: &str, field: &str, report: &mut ValidationReport) {
    let field_path = format!("{}/{}", path, field);
    match entity.get(field) {
        None => report.errors.push(ValidationError::new(ValidationErrorKind::MissingField {
            path: field_path,
        })),
        Some(Value::String(s)) => {
            if s.trim().is_empty() {
                report.warnings.push(IngestWarning::EmptyField { path: field_path });
            }
        }
        Some(other) => report.errors.push(ValidationError::new(ValidationErrorKind::WrongType {
            path: field_path,
            expected: "string",
            found: json_type(other),
        })),
    }
}

fn require_number(entity: &Value, path: &str, field: &str, report: &mut ValidationReport) {
    let field_path = format!("{}/{}", path, field);
    match entity.get(field) {
        None => report.errors.push(ValidationError::new(ValidationErrorKind::MissingField {
            path: field_path,
        })),
        Some(value) if value.is_u64() => {}
        Some(other) => report.errors.push(ValidationError::new(ValidationErrorKind::WrongType {
            path: field_path,
            expected: "non-negative integer",
            found: json_type(other),
        })),
    }
}

fn require_enum(
    entity: &Value,
    path: &str,
    field: &str,
    allowed: &[&str],
    report: &mut ValidationReport,
) {
    let field_path = format!("{}/{}", path, field);
    match entity.get(field) {
        None => report.errors.push(ValidationError::new(ValidationErrorKind::MissingField {
            path: field_path,
        })),
        Some(Value::String(s)) if allowed.contains(&s.as_str()) => {}
        Some(Value::String(s)) => {
            report.errors.push(ValidationError::new(ValidationErrorKind::InvalidEnum {
                path: field_path,
                value: s.clone(),
                allowed: allowed.join(", "),
            }))
        }
        Some(other) => report.errors.push(ValidationError::new(ValidationErrorKind::WrongType {
            path: field_path,
            expected: "string",
            found: json_type(other),
        })),
    }
}

fn check_unit_range(value: &Value, path: &str, report: &mut ValidationReport) {
    match value.as_f64() {
        Some(n) if (0.0..=1.0).contains(&n) => {}
        Some(n) => report.errors.push(ValidationError::new(ValidationErrorKind::OutOfRange {
            path: path.to_string(),
            value: n,
            min: 0.0,
            max: 1.0,
        })),
        None => report.errors.push(ValidationError::new(ValidationErrorKind::WrongType {
            path: path.to_string(),
            expected: "number",
            found: json_type(value),
        })),
    }
}

fn check_description_quality(entity: &Value, path: &str, report: &mut ValidationReport) {
    if let Some(Value::String(description)) = entity.get("description") {
        let length = description.trim().chars().count();
        if length > 0 && length < MIN_DESCRIPTION_CHARS {
            report.warnings.push(IngestWarning::ShortDescription {
                path: format!("{}/description", path),
                length,
            });
        }
    }
}

fn check_id(entity: &Value, path: &str, report: &mut ValidationReport) {
    if entity.get("id").and_then(Value::as_str).is_none() {
        report.warnings.push(IngestWarning::MintedId {
            path: path.to_string(),
        });
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_payload() {
        let data = json!({
            "confidence": 0.9,
            "characters": [{
                "id": "char-1",
                "name": "Rei Ayama",
                "description": "A transfer student hiding her past.",
                "firstAppearance": 3,
                "importance": "major"
            }]
        });
        let report = validate_batch(&data);
        assert!(report.is_clean());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_field_carries_path() {
        let data = json!({"events": [{"title": "Duel", "description": "First duel between rivals", "significance": "major"}]});
        let report = validate_batch(&data);
        assert!(!report.is_clean());
        assert!(report.errors.iter().any(|e| e.kind.path() == "/events/0/pageNumber"));
    }

    #[test]
    fn test_invalid_enum_rejected() {
        let data = json!({"characters": [{
            "name": "Rei", "description": "A transfer student.", "firstAppearance": 1, "importance": "legendary"
        }]});
        let report = validate_batch(&data);
        assert!(report.errors.iter().any(|e| matches!(
            &e.kind,
            ValidationErrorKind::InvalidEnum { value, .. } if value == "legendary"
        )));
    }

    #[test]
    fn test_confidence_out_of_range() {
        let data = json!({"confidence": 1.4});
        let report = validate_batch(&data);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_short_description_is_warning_not_error() {
        let data = json!({"characters": [{
            "id": "c", "name": "Rei", "description": "girl", "firstAppearance": 1, "importance": "minor"
        }]});
        let report = validate_batch(&data);
        assert!(report.is_clean());
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, IngestWarning::ShortDescription { .. })));
    }
}
