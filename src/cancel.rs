//! Cooperative cancellation (spec §5).
//!
//! A pipeline polls a [`CancellationToken`] between instructions (sequential
//! pipelines) or between trajectories (the trajectory pipeline). Tripping
//! the token is best-effort: the pipeline drops its in-flight state and
//! returns `SimError::Cancelled` rather than rolling anything back, because
//! there is nothing to roll back (no filesystem/network effects, spec §5).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
