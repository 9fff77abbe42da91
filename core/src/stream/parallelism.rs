//! Parallelism configuration.
//!
//! One profile drives both pipeline directions: worker count, bounded
//! channel capacity, reorder window cap and the buffer arena budget all
//! derive from the same numbers, so encrypt and decrypt apply identical
//! backpressure.

use crate::constants::{
    DEFAULT_WINDOW_CAP, MIN_REORDER_WINDOW, MIN_WORKERS, QUEUE_CAP_PER_WORKER,
};
use crate::pool::ArenaLimits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelismProfile {
    /// Crypto worker thread count.
    pub workers: usize,
    /// Capacity of the job and result channels.
    pub queue_cap: usize,
    /// Hard cap on reorder window growth.
    pub window_cap: usize,
}

impl ParallelismProfile {
    /// Profile for `requested` workers, clamped to
    /// `max(MIN_WORKERS, min(available cores, requested))`.
    pub fn new(requested: usize) -> Self {
        let workers = num_cpus::get().min(requested).max(MIN_WORKERS);
        Self::with_workers(workers)
    }

    /// Profile with an exact worker count; used by tests that need a
    /// degenerate pool or deterministic scheduling.
    pub fn with_workers(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            workers,
            queue_cap: workers * QUEUE_CAP_PER_WORKER,
            window_cap: DEFAULT_WINDOW_CAP,
        }
    }

    /// Initial reorder window size: `clamp(workers * 4, 4, window_cap)`.
    pub fn initial_window(&self) -> usize {
        (self.workers * QUEUE_CAP_PER_WORKER)
            .max(MIN_REORDER_WINDOW)
            .min(self.window_cap)
    }

    /// Arena budget covering every buffer a healthy run can hold at once:
    /// both channels full, every worker holding an input and an output
    /// buffer, the producer and consumer one each, plus a reorder backlog
    /// grown to the window cap. Hitting these caps therefore indicates a
    /// buffer leak, not load.
    pub fn arena_limits(&self, chunk_size: usize) -> ArenaLimits {
        let max_count = self.window_cap + 2 * self.queue_cap + 2 * self.workers + 8;
        ArenaLimits {
            max_count,
            max_bytes: max_count.saturating_mul(chunk_size),
        }
    }
}
