//! Error types for the Tessera reconciliation engine.
//!
//! This crate provides the foundation error types used throughout the Tessera
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use tessera_error::{TesseraResult, IngestError, IngestErrorKind};
//!
//! fn parse_response() -> TesseraResult<String> {
//!     Err(IngestError::new(IngestErrorKind::NoJsonFound { length: 42 }))?
//! }
//!
//! match parse_response() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod ingest;
mod migration;
mod provenance;
mod provider;
mod reconcile;
mod validation;

pub use error::{TesseraError, TesseraErrorKind, TesseraResult};
pub use ingest::{IngestError, IngestErrorKind};
pub use migration::{MigrationError, MigrationErrorKind};
pub use provenance::{ProvenanceError, ProvenanceErrorKind};
pub use provider::{ProviderError, ProviderErrorKind};
pub use reconcile::{ReconcileError, ReconcileErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
