//! Bounded reusable-buffer arena.
//!
//! Design notes:
//! - Accounting tracks rented buffers with atomic counters; the free set
//!   holds capacity only. A rent that would push the live count or live
//!   bytes over the caps fails and restores its accounting before returning.
//! - A `PooledBuf` exclusively owns its bytes until it drops; dropping is
//!   the recycle. Every termination path of the pipeline therefore returns
//!   buffers exactly once, with no bookkeeping at the call sites.
//! - `dispose` zeroes every free buffer once and is idempotent. Handles that
//!   outlive the arena value zero their bytes on drop instead of re-entering
//!   the free set.
//! - The arena never blocks a caller; cap overflow is a hard error, not
//!   backpressure. Backpressure belongs to the bounded channels.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use zeroize::Zeroize;

/// Hard caps on concurrently rented buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaLimits {
    pub max_count: usize,
    pub max_bytes: usize,
}

#[derive(Debug, Error)]
pub enum PoolError {
    /// Renting `requested` more bytes would exceed the arena caps.
    #[error(
        "buffer arena capacity exceeded: requested {requested} bytes with \
         {live_count}/{max_count} buffers and {live_bytes}/{max_bytes} bytes live"
    )]
    CapacityExceeded {
        requested: usize,
        live_count: usize,
        max_count: usize,
        live_bytes: usize,
        max_bytes: usize,
    },
}

struct ArenaShared {
    limits: ArenaLimits,
    live_count: AtomicUsize,
    live_bytes: AtomicUsize,
    free: Mutex<Vec<Vec<u8>>>,
    disposed: AtomicBool,
}

impl ArenaShared {
    /// Zero a buffer across its full capacity, including bytes a `truncate`
    /// left beyond the current length.
    fn scrub(mut buf: Vec<u8>) {
        let cap = buf.capacity();
        buf.resize(cap, 0);
        buf.zeroize();
    }
}

/// Shared pool of reusable byte buffers with strict count/byte caps.
pub struct BufferArena {
    shared: Arc<ArenaShared>,
}

impl BufferArena {
    pub fn new(limits: ArenaLimits) -> Self {
        Self {
            shared: Arc::new(ArenaShared {
                limits,
                live_count: AtomicUsize::new(0),
                live_bytes: AtomicUsize::new(0),
                free: Mutex::new(Vec::new()),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Rent a zero-initialized buffer of exactly `min_len` logical bytes,
    /// reusing a free buffer when one has enough capacity.
    pub fn rent(&self, min_len: usize) -> Result<PooledBuf, PoolError> {
        let shared = &self.shared;

        let count = shared.live_count.fetch_add(1, Ordering::AcqRel) + 1;
        if count > shared.limits.max_count {
            shared.live_count.fetch_sub(1, Ordering::AcqRel);
            return Err(self.capacity_error(min_len));
        }

        let bytes = shared.live_bytes.fetch_add(min_len, Ordering::AcqRel) + min_len;
        if bytes > shared.limits.max_bytes {
            shared.live_bytes.fetch_sub(min_len, Ordering::AcqRel);
            shared.live_count.fetch_sub(1, Ordering::AcqRel);
            return Err(self.capacity_error(min_len));
        }

        let mut data = {
            let mut free = shared.free.lock().unwrap();
            match free.iter().position(|b| b.capacity() >= min_len) {
                Some(pos) => free.swap_remove(pos),
                None => Vec::with_capacity(min_len),
            }
        };
        data.clear();
        data.resize(min_len, 0);

        Ok(PooledBuf {
            data,
            charged: min_len,
            shared: Arc::clone(shared),
        })
    }

    /// Zero every free buffer and return it to the allocator. Idempotent;
    /// buffers still rented are scrubbed when their handles drop.
    pub fn dispose(&self) {
        if self.shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut free = self.shared.free.lock().unwrap();
        for buf in free.drain(..) {
            ArenaShared::scrub(buf);
        }
    }

    /// Number of buffers currently rented.
    pub fn live_count(&self) -> usize {
        self.shared.live_count.load(Ordering::Acquire)
    }

    /// Bytes currently charged to rented buffers.
    pub fn live_bytes(&self) -> usize {
        self.shared.live_bytes.load(Ordering::Acquire)
    }

    fn capacity_error(&self, requested: usize) -> PoolError {
        PoolError::CapacityExceeded {
            requested,
            live_count: self.live_count(),
            max_count: self.shared.limits.max_count,
            live_bytes: self.live_bytes(),
            max_bytes: self.shared.limits.max_bytes,
        }
    }
}

impl Drop for BufferArena {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Exclusively owned rented buffer. Dropping recycles it into the arena.
pub struct PooledBuf {
    data: Vec<u8>,
    charged: usize,
    shared: Arc<ArenaShared>,
}

impl std::fmt::Debug for PooledBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuf")
            .field("len", &self.data.len())
            .field("charged", &self.charged)
            .finish()
    }
}

impl PooledBuf {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Shrink the logical length after a short read. Accounting keeps the
    /// originally charged size so rent/recycle stay symmetric.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }
}

impl Deref for PooledBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for PooledBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        let data = std::mem::take(&mut self.data);

        self.shared.live_bytes.fetch_sub(self.charged, Ordering::AcqRel);
        self.shared.live_count.fetch_sub(1, Ordering::AcqRel);

        if self.shared.disposed.load(Ordering::Acquire) {
            ArenaShared::scrub(data);
        } else {
            self.shared.free.lock().unwrap().push(data);
        }
    }
}
