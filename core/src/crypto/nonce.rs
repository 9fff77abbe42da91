//! Deterministic nonce composition from the stream nonce prefix and chunk
//! index.
//!
//! Layout: `nonce_prefix (4 B LE) || chunk_index (8 B LE)`, 12 bytes total.
//! The prefix is random per stream, the index is the zero-based chunk number,
//! so nonces are pairwise distinct within a stream and across streams with
//! overwhelming probability. This schedule must be identical for encrypt and
//! decrypt; do not change endianness or field order without new test vectors.

use crate::crypto::types::{NonceError, NONCE_LEN_12};

/// Compose the 12-byte chunk nonce into `dst`.
///
/// Deterministic mapping: same `(nonce_prefix, chunk_index)` gives the same
/// nonce. Index `u64::MAX` is rejected so the counter can never wrap into a
/// reused nonce.
#[inline]
pub fn compose_nonce(
    dst: &mut [u8; NONCE_LEN_12],
    nonce_prefix: u32,
    chunk_index: u64,
) -> Result<(), NonceError> {
    if chunk_index == u64::MAX {
        return Err(NonceError::CounterExhausted);
    }

    dst[..4].copy_from_slice(&nonce_prefix.to_le_bytes());
    dst[4..].copy_from_slice(&chunk_index.to_le_bytes());
    Ok(())
}
