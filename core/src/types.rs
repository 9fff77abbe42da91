//! Unified stream error covering I/O, framing, crypto, reorder, pool and
//! cancellation failures.
//!
//! - `From<T>` impls enable `?` across the pipeline.
//! - Every variant is fatal for the running operation; partial output already
//!   written is not rolled back.

use std::io;

use thiserror::Error;

use crate::crypto::{CryptoError, NonceError};
use crate::headers::HeaderError;
use crate::pool::PoolError;
use crate::stream::reorder::ReorderError;

#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O error on the input or output stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Header-level error (framing, validation or parse).
    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    /// Cryptographic error (AEAD seal/open, key policy).
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Nonce composition error (counter exhaustion).
    #[error("nonce error: {0}")]
    Nonce(#[from] NonceError),

    /// Reorder window integrity error.
    #[error("reorder error: {0}")]
    Reorder(#[from] ReorderError),

    /// Buffer arena error (capacity caps).
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    /// The stream ended inside a declared structure.
    #[error("unexpected end of stream: expected {expected} bytes, got {got}")]
    UnexpectedEnd { expected: usize, got: usize },

    /// Decrypted byte total disagrees with the recorded total.
    #[error("length mismatch: header records {expected} plaintext bytes, wrote {actual}")]
    LengthMismatch { expected: u64, actual: u64 },

    /// External cancellation observed.
    #[error("operation cancelled")]
    Cancelled,

    /// Pipeline wiring failure (a stage exited before its peers).
    #[error("pipeline error: {0}")]
    Pipeline(&'static str),

    /// Parameter validation with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}

impl StreamError {
    /// True when the failure is an AEAD authentication failure, on either the
    /// wrapped file key or a chunk.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, StreamError::Crypto(CryptoError::TagMismatch))
    }
}
