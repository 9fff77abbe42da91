//! AES-256-GCM chunk cipher.
//!
//! Design notes:
//! - One `ChunkCipher` per worker, created once so the key schedule is
//!   amortized over every chunk the worker seals or opens.
//! - Detached-tag mode: ciphertext occupies exactly the plaintext length and
//!   the 16-byte tag travels in the chunk header, not in the payload.
//! - Tag verification fails closed; an opened buffer is only valid when
//!   `open_in_place` returned `Ok`.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce, Tag};

use crate::crypto::types::{CryptoError, KEY_LEN_32, NONCE_LEN_12, TAG_LEN_16};

/// AES-256-GCM instance keyed once for a stream's file key (or, for the
/// header wrap, the master key).
#[derive(Clone)]
pub struct ChunkCipher {
    cipher: Aes256Gcm,
}

impl ChunkCipher {
    pub fn new(key: &[u8; KEY_LEN_32]) -> Self {
        let key: &Key<Aes256Gcm> = key.into();
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Construct from an untyped slice; rejects anything but 32 bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self, CryptoError> {
        let key: &[u8; KEY_LEN_32] =
            key.try_into().map_err(|_| CryptoError::InvalidKeyLen {
                expected: KEY_LEN_32,
                actual: key.len(),
            })?;
        Ok(Self::new(key))
    }

    /// Encrypt `buf` in place and return the detached tag.
    pub fn seal_in_place(
        &self,
        nonce: &[u8; NONCE_LEN_12],
        aad: &[u8],
        buf: &mut [u8],
    ) -> Result<[u8; TAG_LEN_16], CryptoError> {
        let tag = self
            .cipher
            .encrypt_in_place_detached(Nonce::from_slice(nonce), aad, buf)
            .map_err(|_| CryptoError::SealFailure("plaintext exceeds AES-GCM bounds"))?;

        let mut out = [0u8; TAG_LEN_16];
        out.copy_from_slice(&tag);
        Ok(out)
    }

    /// Decrypt `buf` in place, verifying `tag` over the ciphertext and `aad`.
    /// On failure the buffer contents are unspecified and must be discarded.
    pub fn open_in_place(
        &self,
        nonce: &[u8; NONCE_LEN_12],
        aad: &[u8],
        buf: &mut [u8],
        tag: &[u8; TAG_LEN_16],
    ) -> Result<(), CryptoError> {
        self.cipher
            .decrypt_in_place_detached(Nonce::from_slice(nonce), aad, buf, Tag::from_slice(tag))
            .map_err(|_| CryptoError::TagMismatch)
    }
}
