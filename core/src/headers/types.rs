//! Header structs and validation.
//!
//! Both headers are fixed length with little-endian integer fields.
//!
//! File header (84 bytes; the length field counts the 76 bytes that follow
//! it):
//! ```text
//! off 0   4 B  magic           "CTN1"
//! off 4   4 B  header_length   76
//! off 8   8 B  total_plaintext u64, 0 when unknown
//! off 16  4 B  key_id          in [1, i32::MAX]
//! off 20  4 B  nonce_prefix
//! off 24 12 B  file_key_nonce
//! off 36 16 B  file_key_tag
//! off 52 32 B  wrapped_file_key
//! ```
//!
//! Chunk header (36 bytes; the length field counts the 32 bytes that follow
//! the magic), followed by exactly `plaintext_len` ciphertext bytes:
//! ```text
//! off 0   4 B  magic           "CTN1"
//! off 4   4 B  header_length   32
//! off 8   8 B  plaintext_len   u64 in (0, max_chunk]
//! off 16  4 B  key_id          matches the file header
//! off 20 16 B  tag
//! ```

use thiserror::Error;

use crate::constants::{
    CHUNK_HEADER_LEN, FILE_HEADER_LEN, MAGIC_CTN1, MAX_KEY_ID, MIN_KEY_ID,
};
use crate::crypto::{WrappedFileKey, NONCE_LEN_12, TAG_LEN_16};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    /// Total plaintext length, or 0 when the input was not measurable.
    pub total_plaintext: u64,
    pub key_id: u32,
    pub nonce_prefix: u32,
    pub file_key_nonce: [u8; NONCE_LEN_12],
    pub file_key_tag: [u8; TAG_LEN_16],
    pub wrapped_file_key: [u8; 32],
}

impl FileHeader {
    pub const LEN: usize = FILE_HEADER_LEN;

    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.key_id < MIN_KEY_ID || self.key_id > MAX_KEY_ID {
            return Err(HeaderError::InvalidKeyId { have: self.key_id });
        }
        Ok(())
    }

    /// The wrapped file key fields viewed as one value.
    pub fn wrapped_key(&self) -> WrappedFileKey {
        WrappedFileKey {
            nonce: self.file_key_nonce,
            tag: self.file_key_tag,
            key: self.wrapped_file_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Plaintext length of this chunk; the ciphertext has the same length.
    pub plaintext_len: u64,
    pub key_id: u32,
    pub tag: [u8; TAG_LEN_16],
}

impl ChunkHeader {
    pub const LEN: usize = CHUNK_HEADER_LEN;

    /// Validate against the stream the chunk claims to belong to.
    pub fn validate(&self, expect_key_id: u32, max_chunk: usize) -> Result<(), HeaderError> {
        if self.key_id != expect_key_id {
            return Err(HeaderError::KeyIdMismatch {
                have: self.key_id,
                need: expect_key_id,
            });
        }
        if self.plaintext_len == 0 || self.plaintext_len > max_chunk as u64 {
            return Err(HeaderError::InvalidChunkLength {
                have: self.plaintext_len,
                max: max_chunk as u64,
            });
        }
        Ok(())
    }
}

/// Render protocol bytes as ASCII when printable, hex otherwise.
pub fn fmt_bytes(b: &[u8]) -> String {
    if b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        format!("0x{}", hex::encode(b))
    }
}

#[derive(Debug, Error)]
pub enum HeaderError {
    /// Buffer too short for the structure being encoded or decoded.
    #[error("header buffer too short: {have} < {need}")]
    BufferTooShort { have: usize, need: usize },

    /// Invalid magic marker (expected "CTN1").
    #[error("invalid magic: expected {}, got {}", fmt_bytes(&MAGIC_CTN1), fmt_bytes(.have))]
    InvalidMagic { have: [u8; 4] },

    /// File header declares a length other than 76.
    #[error("invalid file header length: expected {need}, got {have}")]
    InvalidHeaderLength { have: u32, need: u32 },

    /// Chunk header declares a length other than 32.
    #[error("invalid chunk header length: expected {need}, got {have}")]
    InvalidChunkHeaderLength { have: u32, need: u32 },

    /// Only 16-byte tags are representable in this format.
    #[error("unsupported tag size: {have}")]
    UnsupportedTagSize { have: usize },

    /// Key id outside [1, i32::MAX].
    #[error("invalid key id: {have}")]
    InvalidKeyId { have: u32 },

    /// Chunk header names a key id other than the file header's.
    #[error("key id mismatch: chunk declares {have}, stream uses {need}")]
    KeyIdMismatch { have: u32, need: u32 },

    /// Declared chunk plaintext length outside (0, max].
    #[error("invalid chunk length: {have} not in (0, {max}]")]
    InvalidChunkLength { have: u64, max: u64 },
}
