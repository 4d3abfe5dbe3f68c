//! Cooperative cancellation.
//!
//! A shared atomic flag passed explicitly into every scanning pass; the
//! loops poll it once per block and stop before starting a new iteration.
//! The SIGINT hook lives here so the core stays testable without real
//! signal handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag polled by the scan loops
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cooperative stop; the iteration in flight still completes
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Set this flag when the process receives SIGINT
    pub fn hook_interrupt(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || flag.cancel())
    }
}
