//! File key generation and wrapping.
//!
//! Every stream gets a fresh random 32-byte file key. The file key is sealed
//! under the caller's long-lived master key with its own random 12-byte nonce
//! and carried in the file header; the master key itself never touches the
//! wire. Key bytes are zeroed when dropped.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::crypto::aad::key_wrap_aad;
use crate::crypto::aead::ChunkCipher;
use crate::crypto::types::{CryptoError, KEY_LEN_32, NONCE_LEN_12, TAG_LEN_16};

/// Per-stream symmetric key, zeroed on drop.
pub struct FileKey(Zeroizing<[u8; KEY_LEN_32]>);

impl FileKey {
    /// Fresh random key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LEN_32]);
        OsRng.fill_bytes(key.as_mut());
        Self(key)
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN_32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN_32] {
        &self.0
    }
}

impl fmt::Debug for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileKey").field(&"[REDACTED]").finish()
    }
}

/// Wrapped form of a file key as carried in the file header.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct WrappedFileKey {
    pub nonce: [u8; NONCE_LEN_12],
    pub tag: [u8; TAG_LEN_16],
    pub key: [u8; KEY_LEN_32],
}

impl fmt::Debug for WrappedFileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedFileKey")
            .field("nonce", &hex::encode(self.nonce))
            .field("tag", &hex::encode(self.tag))
            .field("key", &hex::encode(self.key))
            .finish()
    }
}

/// Seal `file_key` under `master_key` with a fresh random nonce and the
/// key-wrap AAD for `key_id`.
pub fn wrap_file_key(
    master_key: &[u8; KEY_LEN_32],
    key_id: u32,
    file_key: &FileKey,
) -> Result<WrappedFileKey, CryptoError> {
    let mut nonce = [0u8; NONCE_LEN_12];
    OsRng.fill_bytes(&mut nonce);
    wrap_file_key_with_nonce(master_key, key_id, file_key, nonce)
}

/// Deterministic wrap used by `wrap_file_key` and by golden-vector tests.
pub fn wrap_file_key_with_nonce(
    master_key: &[u8; KEY_LEN_32],
    key_id: u32,
    file_key: &FileKey,
    nonce: [u8; NONCE_LEN_12],
) -> Result<WrappedFileKey, CryptoError> {
    let aad = key_wrap_aad(key_id);
    let cipher = ChunkCipher::new(master_key);

    let mut sealed = *file_key.as_bytes();
    let tag = cipher.seal_in_place(&nonce, &aad, &mut sealed)?;

    Ok(WrappedFileKey {
        nonce,
        tag,
        key: sealed,
    })
}

/// Open a wrapped file key. Fails with `TagMismatch` when the master key,
/// key id, nonce, tag or wrapped bytes do not line up.
pub fn unwrap_file_key(
    master_key: &[u8; KEY_LEN_32],
    key_id: u32,
    wrapped: &WrappedFileKey,
) -> Result<FileKey, CryptoError> {
    let aad = key_wrap_aad(key_id);
    let cipher = ChunkCipher::new(master_key);

    let mut opened = Zeroizing::new(wrapped.key);
    cipher.open_in_place(&wrapped.nonce, &aad, &mut opened[..], &wrapped.tag)?;

    Ok(FileKey(opened))
}
