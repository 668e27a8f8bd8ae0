//! Versioned response schemas and migration between them.
//!
//! Extraction prompts have gone through three response shapes:
//!
//! - `v1`: events carry `page` instead of `pageNumber`; characters have no
//!   `aliases`; events have no `isFlashback`.
//! - `v2`: current field names, but events have no `significance` and themes
//!   have no `strength`.
//! - `v3`: the current shape decoded by [`tessera_core`].
//!
//! Migrations are pure value-to-value transforms registered per version;
//! a breadth-first search over the version graph finds the step chain, so
//! adding a version only requires registering its outgoing steps.

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use tessera_error::{MigrationError, MigrationErrorKind};

/// The schema version the rest of the pipeline decodes.
pub const CURRENT_VERSION: &str = "v3";

/// A single migration step between two adjacent schema versions.
struct MigrationStep {
    name: &'static str,
    from: &'static str,
    to: &'static str,
    apply: fn(Value) -> Result<Value, String>,
}

/// Registry of known schema versions and the migrations between them.
///
/// # Examples
///
/// ```
/// use tessera_ingest::SchemaRegistry;
///
/// let registry = SchemaRegistry::standard();
/// assert!(registry.path("v1", "v3").is_some());
/// assert!(registry.path("v3", "v1").is_none());
/// ```
pub struct SchemaRegistry {
    versions: Vec<&'static str>,
    steps: Vec<MigrationStep>,
}

impl SchemaRegistry {
    /// The registry covering every shape the extraction prompts have emitted.
    pub fn standard() -> Self {
        Self {
            versions: vec!["v1", "v2", "v3"],
            steps: vec![
                MigrationStep {
                    name: "rename-page-add-aliases",
                    from: "v1",
                    to: "v2",
                    apply: migrate_v1_to_v2,
                },
                MigrationStep {
                    name: "add-significance-and-strength",
                    from: "v2",
                    to: "v3",
                    apply: migrate_v2_to_v3,
                },
            ],
        }
    }

    /// Whether `version` is a registered schema version.
    pub fn knows(&self, version: &str) -> bool {
        self.versions.contains(&version)
    }

    /// Find a migration path as a list of step indices, breadth-first.
    ///
    /// Returns `None` when the versions are unconnected. A same-version
    /// "path" is the empty list.
    pub fn path(&self, from: &str, to: &str) -> Option<Vec<usize>> {
        if from == to {
            return Some(Vec::new());
        }

        // Adjacency: version -> outgoing step indices
        let mut adjacency: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, step) in self.steps.iter().enumerate() {
            adjacency.entry(step.from).or_default().push(i);
        }

        let mut queue = VecDeque::from([from]);
        let mut came_from: HashMap<&str, usize> = HashMap::new();
        while let Some(version) = queue.pop_front() {
            for &step_index in adjacency.get(version).into_iter().flatten() {
                let next = self.steps[step_index].to;
                if next == from || came_from.contains_key(next) {
                    continue;
                }
                came_from.insert(next, step_index);
                if next == to {
                    // Walk back to reconstruct the chain
                    let mut chain = Vec::new();
                    let mut cursor = to;
                    while cursor != from {
                        let step_index = came_from[cursor];
                        chain.push(step_index);
                        cursor = self.steps[step_index].from;
                    }
                    chain.reverse();
                    return Some(chain);
                }
                queue.push_back(next);
            }
        }
        None
    }

    /// Migrate `data` from `from_version` to the current schema.
    ///
    /// # Errors
    ///
    /// Returns a [`MigrationError`] when the version is unknown, no path
    /// exists, or a step fails on the data.
    #[tracing::instrument(skip(self, data), fields(from = from_version))]
    pub fn migrate(&self, data: Value, from_version: &str) -> Result<Value, MigrationError> {
        if !self.knows(from_version) {
            return Err(MigrationError::new(MigrationErrorKind::UnknownVersion(
                from_version.to_string(),
            )));
        }

        let chain = self.path(from_version, CURRENT_VERSION).ok_or_else(|| {
            MigrationError::new(MigrationErrorKind::NoPath {
                from: from_version.to_string(),
                to: CURRENT_VERSION.to_string(),
            })
        })?;

        let mut current = data;
        for step_index in chain {
            let step = &self.steps[step_index];
            tracing::debug!(step = step.name, from = step.from, to = step.to, "Applying migration step");
            current = (step.apply)(current).map_err(|message| {
                MigrationError::new(MigrationErrorKind::StepFailed {
                    step: step.name.to_string(),
                    message,
                })
            })?;
        }
        Ok(current)
    }
}

/// Detect the schema version of `data` from structural cues.
///
/// # Errors
///
/// Returns `DetectionFailed` when the value is not an object.
///
/// # Examples
///
/// ```
/// use tessera_ingest::detect_version;
///
/// let data = serde_json::json!({
///     "events": [{"page": 4, "title": "Duel"}]
/// });
/// assert_eq!(detect_version(&data).unwrap(), "v1");
/// ```
pub fn detect_version(data: &Value) -> Result<&'static str, MigrationError> {
    let obj = data
        .as_object()
        .ok_or_else(|| MigrationError::new(MigrationErrorKind::DetectionFailed))?;

    let events = obj.get("events").and_then(Value::as_array);
    let characters = obj.get("characters").and_then(Value::as_array);

    let any_event_has = |field: &str| {
        events
            .map(|list| list.iter().any(|e| e.get(field).is_some()))
            .unwrap_or(false)
    };
    let any_character_lacks_aliases = characters
        .map(|list| list.iter().any(|c| c.is_object() && c.get("aliases").is_none()))
        .unwrap_or(false);

    if any_event_has("page") || any_character_lacks_aliases {
        return Ok("v1");
    }
    let has_events = events.map(|list| !list.is_empty()).unwrap_or(false);
    if has_events && !any_event_has("significance") {
        return Ok("v2");
    }
    Ok(CURRENT_VERSION)
}

/// Migrate a payload to the current schema, auto-detecting the version.
///
/// # Errors
///
/// Returns a [`MigrationError`] on detection failure or a failing step.
pub fn migrate(data: Value) -> Result<Value, MigrationError> {
    let version = detect_version(&data)?;
    SchemaRegistry::standard().migrate(data, version)
}

fn migrate_v1_to_v2(mut data: Value) -> Result<Value, String> {
    let obj = data.as_object_mut().ok_or("expected an object")?;

    if let Some(events) = obj.get_mut("events").and_then(Value::as_array_mut) {
        for event in events.iter_mut() {
            let event = event.as_object_mut().ok_or("event is not an object")?;
            if let Some(page) = event.remove("page") {
                event.insert("pageNumber".to_string(), page);
            }
            event
                .entry("isFlashback")
                .or_insert(Value::Bool(false));
        }
    }

    if let Some(characters) = obj.get_mut("characters").and_then(Value::as_array_mut) {
        for character in characters.iter_mut() {
            let character = character
                .as_object_mut()
                .ok_or("character is not an object")?;
            character
                .entry("aliases")
                .or_insert_with(|| Value::Array(Vec::new()));
        }
    }

    Ok(data)
}

fn migrate_v2_to_v3(mut data: Value) -> Result<Value, String> {
    let obj = data.as_object_mut().ok_or("expected an object")?;

    if let Some(events) = obj.get_mut("events").and_then(Value::as_array_mut) {
        for event in events.iter_mut() {
            let event = event.as_object_mut().ok_or("event is not an object")?;
            event
                .entry("significance")
                .or_insert_with(|| Value::String("moderate".to_string()));
        }
    }

    if let Some(themes) = obj.get_mut("themes").and_then(Value::as_array_mut) {
        for theme in themes.iter_mut() {
            let theme = theme.as_object_mut().ok_or("theme is not an object")?;
            theme
                .entry("strength")
                .or_insert_with(|| serde_json::json!(0.5));
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detects_v1_from_page_field() {
        let data = json!({"events": [{"page": 4, "title": "Duel"}]});
        assert_eq!(detect_version(&data).unwrap(), "v1");
    }

    #[test]
    fn test_detects_v2_from_missing_significance() {
        let data = json!({"events": [{"pageNumber": 4, "title": "Duel", "isFlashback": false}]});
        assert_eq!(detect_version(&data).unwrap(), "v2");
    }

    #[test]
    fn test_detects_current_version() {
        let data = json!({
            "events": [{"pageNumber": 4, "title": "Duel", "significance": "major", "isFlashback": false}],
            "characters": [{"name": "Rei", "aliases": []}]
        });
        assert_eq!(detect_version(&data).unwrap(), "v3");
    }

    #[test]
    fn test_full_migration_from_v1() {
        let data = json!({
            "characters": [{"name": "Rei", "description": "Transfer student", "firstAppearance": 3, "importance": "major"}],
            "events": [{"page": 4, "title": "Duel", "description": "First duel", "characters": ["Rei"]}]
        });
        let migrated = migrate(data).unwrap();
        assert_eq!(migrated["events"][0]["pageNumber"], 4);
        assert_eq!(migrated["events"][0]["significance"], "moderate");
        assert_eq!(migrated["events"][0]["isFlashback"], false);
        assert_eq!(migrated["characters"][0]["aliases"], json!([]));
    }

    #[test]
    fn test_no_reverse_path() {
        let registry = SchemaRegistry::standard();
        assert!(registry.path("v3", "v1").is_none());
    }

    #[test]
    fn test_unknown_version_errors() {
        let registry = SchemaRegistry::standard();
        assert!(registry.migrate(json!({}), "v9").is_err());
    }

    #[test]
    fn test_same_version_is_empty_path() {
        let registry = SchemaRegistry::standard();
        assert_eq!(registry.path("v3", "v3").unwrap().len(), 0);
    }
}
