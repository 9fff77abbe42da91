//! Per-chunk AAD assembly.
//!
//! The 32-byte AAD is built from stream-level invariants plus immutable
//! per-chunk fields known before encryption:
//!
//! ```text
//! off  0  4 B  magic
//! off  4  4 B  version = 1      (u32 LE)
//! off  8  4 B  key_id           (u32 LE)
//! off 12  8 B  chunk_index      (u64 LE)
//! off 20  8 B  plaintext_len    (u64 LE)
//! off 28  4 B  reserved = 0     (u32 LE)
//! ```
//!
//! Bytes 0..12 are fixed for the whole stream, so workers initialize the
//! prefix once and rewrite only the tail per chunk. The file-key wrap uses
//! the same layout with the mutable region zeroed.

use crate::constants::{AAD_LEN, FORMAT_VERSION, MAGIC_CTN1};

/// Set the immutable prefix (magic, version, key id) in bytes 0..12.
#[inline]
pub fn init_aad_prefix(dst: &mut [u8; AAD_LEN], key_id: u32) {
    dst[..4].copy_from_slice(&MAGIC_CTN1);
    dst[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
    dst[8..12].copy_from_slice(&key_id.to_le_bytes());
}

/// Rewrite the per-chunk tail (index, length, reserved) in bytes 12..32.
/// The prefix must already be initialized.
#[inline]
pub fn fill_aad_mutable(dst: &mut [u8; AAD_LEN], chunk_index: u64, plaintext_len: u64) {
    dst[12..20].copy_from_slice(&chunk_index.to_le_bytes());
    dst[20..28].copy_from_slice(&plaintext_len.to_le_bytes());
    dst[28..32].copy_from_slice(&0u32.to_le_bytes());
}

/// AAD used to wrap and unwrap the file key: the stream prefix with the
/// mutable region zeroed.
#[inline]
pub fn key_wrap_aad(key_id: u32) -> [u8; AAD_LEN] {
    let mut aad = [0u8; AAD_LEN];
    init_aad_prefix(&mut aad, key_id);
    aad
}
