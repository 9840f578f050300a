//! Cooperative cancellation for the remote-solver call and the pass loop
//! that drives it (§5: "the remote-solver call uses an abort signal...").
//!
//! Checked at coarse boundaries, not mid-HTTP-call: the 5-minute
//! [`crate::remote::REMOTE_SOLVE_TIMEOUT`] still bounds worst-case latency
//! if a caller never trips the token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply-cloned cancellation flag shared between a caller and the
/// orchestrator pass it started.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Trip the token. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
