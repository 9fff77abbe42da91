//! Mutable counters collected during a pipeline run.
//!
//! Workers attach per-chunk deltas to their results; only the single
//! consumer merges them, so there are no locks or atomics on the hot path.

/// Deterministic counters collected during stream processing.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineCounters {
    pub chunks: u64,
    pub bytes_plaintext: u64,
    pub bytes_ciphertext: u64,
    /// File and chunk header bytes.
    pub bytes_overhead: u64,
}

impl PipelineCounters {
    /// Record the file header as overhead.
    pub fn add_file_header(&mut self, header_len: usize) {
        self.bytes_overhead += header_len as u64;
    }

    /// Record one framed chunk.
    pub fn add_chunk(&mut self, plaintext_len: usize, header_len: usize) {
        self.chunks += 1;
        self.bytes_plaintext += plaintext_len as u64;
        self.bytes_ciphertext += plaintext_len as u64;
        self.bytes_overhead += header_len as u64;
    }

    pub fn merge(&mut self, other: &PipelineCounters) {
        self.chunks += other.chunks;
        self.bytes_plaintext += other.bytes_plaintext;
        self.bytes_ciphertext += other.bytes_ciphertext;
        self.bytes_overhead += other.bytes_overhead;
    }
}
