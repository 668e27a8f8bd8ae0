//! The reconciliation orchestrator.
//!
//! A [`Reconciler`] accepts extraction batches in any order, raw or typed,
//! ingests them concurrently, and runs a serialized merge pass producing a
//! [`tessera_core::Storyline`] with coverage metadata, a causal graph, an
//! ordering report, and a full audit trail. Projection views over the merged
//! state live in [`views`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod config;
mod reconciler;
pub mod views;

pub use cancel::CancelHandle;
pub use config::ReconcilerConfig;
pub use reconciler::{NoDriver, Reconciler};
