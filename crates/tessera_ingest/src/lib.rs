//! Response ingestion for the Tessera reconciliation engine.
//!
//! Extraction calls return semi-structured text: JSON wrapped in markdown
//! fences, prefixed with prose, truncated mid-array, or salted with trailing
//! commas and smart quotes. This crate turns that text into validated,
//! current-schema [`tessera_core::BatchResult`] values:
//!
//! 1. **Locate** a JSON payload (direct parse, fenced block, balanced span,
//!    labelled prefix).
//! 2. **Repair** unparseable payloads with a fixed transform sequence,
//!    re-attempting a parse after each transform.
//! 3. **Migrate** older response shapes to the current schema version.
//! 4. **Validate** field-by-field, producing structured errors with
//!    JSON-pointer-like paths and non-fatal quality warnings.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extract;
mod ingest;
mod repair;
mod schema;
mod validate;

pub use extract::{extract_json, locate_payload};
pub use ingest::{BatchMeta, IngestOutcome, Ingested, ingest, ingest_batch};
pub use repair::{repair, RepairOutcome};
pub use schema::{CURRENT_VERSION, SchemaRegistry, detect_version, migrate};
pub use validate::{IngestWarning, ValidationReport, validate_batch};
