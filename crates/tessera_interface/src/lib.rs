//! Arbitration interface for the Tessera reconciliation engine.
//!
//! Deduplication and contradiction resolution occasionally need a judgment
//! call that heuristics cannot make confidently. This crate defines the
//! [`ArbiterDriver`] trait implemented by LLM providers, and the [`Arbiter`]
//! wrapper that adds the timeout and retry discipline every arbitration call
//! must carry.
//!
//! Provider calls happen only through this boundary; merge logic elsewhere in
//! the workspace is pure and never suspends on I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod arbiter;
mod driver;
mod verdict;

pub use arbiter::Arbiter;
pub use driver::ArbiterDriver;
pub use verdict::{Verdict, VerdictChoice};
