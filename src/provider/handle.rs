//! Cancellable handle to a running fetch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::AbortHandle;

/// Handle to the fetch started by one `reload()` call.
///
/// Cancelling aborts the task at its next await point and marks the
/// generation dead, so a completion already sitting in the provider's
/// queue is discarded too. Cancelling twice, or after completion, does
/// nothing.
#[derive(Debug, Clone)]
pub struct FetchHandle {
    generation: u64,
    abort: AbortHandle,
    cancelled: Arc<AtomicBool>,
}

impl FetchHandle {
    pub(crate) fn new(generation: u64, abort: AbortHandle) -> Self {
        Self {
            generation,
            abort,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sequence number of the reload that produced this handle.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            tracing::debug!(generation = self.generation, "Fetch cancelled");
        }
        self.abort.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Whether the underlying task has stopped running, for any reason.
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}
