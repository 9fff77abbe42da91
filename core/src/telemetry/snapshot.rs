//! Immutable run summary built from counters at pipeline end.

use std::time::Instant;

use serde::Serialize;

use crate::telemetry::counters::PipelineCounters;

/// Wall-clock timer for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct RunTimer {
    started: Instant,
}

impl RunTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_ns(&self) -> u64 {
        self.started.elapsed().as_nanos() as u64
    }
}

/// Totals for a completed encrypt or decrypt run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSnapshot {
    pub chunks: u64,
    pub bytes_plaintext: u64,
    pub bytes_ciphertext: u64,
    pub bytes_overhead: u64,
    pub elapsed_ns: u64,
}

impl RunSnapshot {
    pub fn from_counters(counters: &PipelineCounters, timer: &RunTimer) -> Self {
        Self {
            chunks: counters.chunks,
            bytes_plaintext: counters.bytes_plaintext,
            bytes_ciphertext: counters.bytes_ciphertext,
            bytes_overhead: counters.bytes_overhead,
            elapsed_ns: timer.elapsed_ns(),
        }
    }

    /// JSON rendering for logs and test fixtures.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("snapshot serializes")
    }
}
