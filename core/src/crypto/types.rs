//! Stable sizes and error types for the crypto layer.

use thiserror::Error;

/// Key length for the master key and every file key.
pub const KEY_LEN_32: usize = 32;

/// Standard 12-byte nonce length for AES-256-GCM.
pub const NONCE_LEN_12: usize = 12;

/// Fixed AEAD tag length (bytes).
pub const TAG_LEN_16: usize = 16;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Invalid key length provided to the cipher.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLen { expected: usize, actual: usize },

    /// AEAD tag mismatch (authentication failure). Raised for both a chunk
    /// that fails to open and a wrapped file key that fails to unwrap. No
    /// plaintext is released for the failing unit.
    #[error("AEAD tag mismatch")]
    TagMismatch,

    /// Seal failed for a reason other than authentication (oversized input).
    #[error("AEAD seal failed: {0}")]
    SealFailure(&'static str),
}

#[derive(Debug, Error)]
pub enum NonceError {
    /// The chunk counter reached its terminal value. Index `u64::MAX` is
    /// reserved and must never be turned into a nonce.
    #[error("chunk counter exhausted")]
    CounterExhausted,
}
