//! Cooperative cancellation.
//!
//! A single token is observed by the producer, every worker and the
//! consumer. Each stage polls at the top of its loop and before blocking
//! channel operations; cancellation bounds how much further output is
//! produced, it does not undo output already written.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::types::StreamError;

#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Safe to call from any thread, any number of
    /// times.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Poll point: `Err(Cancelled)` once the signal is set.
    pub fn check(&self) -> Result<(), StreamError> {
        if self.is_cancelled() {
            Err(StreamError::Cancelled)
        } else {
            Ok(())
        }
    }
}
