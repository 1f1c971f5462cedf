//! Cooperative cancellation for a running workflow

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Clone-able cancellation flag polled by the engine between node attempts.
///
/// Cancellation never interrupts a node that is already executing; the engine
/// observes the flag before attempting the next node.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cooperative stop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
