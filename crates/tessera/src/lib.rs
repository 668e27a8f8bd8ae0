//! Tessera - Multi-Batch Narrative Reconciliation
//!
//! Tessera merges independent LLM extraction passes over sequential manga
//! page batches into one coherent narrative model. Each batch arrives as
//! semi-structured model output; Tessera repairs and validates it, migrates
//! older response schemas, deduplicates entities across batches, resolves
//! contradictory facts, analyzes page coverage, infers causal and
//! chronological structure, and records full provenance for every merged
//! entity.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tessera::{Reconciler, ReconcilerConfig};
//!
//! #[tokio::main]
//! async fn main() -> tessera::TesseraResult<()> {
//!     let mut reconciler = Reconciler::new(ReconcilerConfig::default());
//!     reconciler.add_raw(&response_text, 0, 1, 20)?;
//!     reconciler.add_raw(&later_response, 1, 21, 40)?;
//!     reconciler.reconcile().await?;
//!
//!     let storyline = reconciler.storyline();
//!     println!("{} characters merged", storyline.characters.len());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Tessera is organized as a workspace with focused crates:
//!
//! - `tessera_core` - The narrative domain model (batches, entities, storyline)
//! - `tessera_error` - Error types
//! - `tessera_interface` - `ArbiterDriver` trait and arbitration discipline
//! - `tessera_ingest` - Response extraction, repair, migration, validation
//! - `tessera_merge` - Deduplication and contradiction resolution
//! - `tessera_timeline` - Coverage analysis and causal/temporal ordering
//! - `tessera_provenance` - Audit trail and entity lineage
//! - `tessera_engine` - The reconciliation orchestrator
//!
//! This crate (`tessera`) re-exports everything for convenience.

#![forbid(unsafe_code)]

pub use tessera_core::*;
pub use tessera_engine::*;
pub use tessera_error::*;
pub use tessera_ingest::*;
pub use tessera_interface::*;
pub use tessera_merge::*;
pub use tessera_provenance::*;
pub use tessera_timeline::*;
