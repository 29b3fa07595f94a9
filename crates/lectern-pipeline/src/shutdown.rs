//! Cooperative shutdown signal
//!
//! There is no global cancellation primitive: triggering the flag lets
//! already-dispatched oracle calls finish and persist their results, while
//! units still waiting for a pool permit are recorded as failed instead of
//! being dispatched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag checked by worker pools before dispatching each unit.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    /// Create an untriggered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
