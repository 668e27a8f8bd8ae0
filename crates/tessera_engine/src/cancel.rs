//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared flag for cancelling a reconciliation run between stages.
///
/// Cancellation is cooperative: the merge pass checks the flag at stage
/// boundaries and stops with valid intermediate state, leaving the audit
/// trail open (`completed_at` unset).
///
/// # Examples
///
/// ```
/// use tessera_engine::CancelHandle;
///
/// let handle = CancelHandle::new();
/// let observer = handle.clone();
/// assert!(!observer.is_cancelled());
/// handle.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Create a fresh, uncancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this handle.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let a = CancelHandle::new();
        let b = a.clone();
        a.cancel();
        assert!(b.is_cancelled());
    }
}
