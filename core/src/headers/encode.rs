//! Header encoding.
//!
//! Design notes:
//! - Fixed layouts, little-endian, written with local cursor helpers.
//! - Writes exactly `FILE_HEADER_LEN` / `CHUNK_HEADER_LEN` bytes into the
//!   caller's slice; never allocates.
//! - The length fields carry the format constants 76 and 32 so readers can
//!   reject foreign or truncated framing before touching key material.

use crate::constants::{
    CHUNK_HEADER_DECLARED_LEN, CHUNK_HEADER_LEN, FILE_HEADER_DECLARED_LEN, FILE_HEADER_LEN,
    MAGIC_CTN1,
};
use crate::crypto::{NONCE_LEN_12, TAG_LEN_16};
use crate::headers::types::HeaderError;

fn put_u32(out: &mut [u8], i: &mut usize, v: u32) {
    out[*i..*i + 4].copy_from_slice(&v.to_le_bytes());
    *i += 4;
}

fn put_u64(out: &mut [u8], i: &mut usize, v: u64) {
    out[*i..*i + 8].copy_from_slice(&v.to_le_bytes());
    *i += 8;
}

fn put_bytes(out: &mut [u8], i: &mut usize, b: &[u8]) {
    out[*i..*i + b.len()].copy_from_slice(b);
    *i += b.len();
}

/// Serialize the file header into `dst`.
///
/// `file_key_tag` must be exactly 16 bytes; the format has no room for any
/// other tag size.
pub fn encode_file_header(
    dst: &mut [u8],
    key_id: u32,
    nonce_prefix: u32,
    file_key_nonce: &[u8; NONCE_LEN_12],
    file_key_tag: &[u8],
    wrapped_file_key: &[u8; 32],
    total_plaintext: u64,
) -> Result<(), HeaderError> {
    if dst.len() < FILE_HEADER_LEN {
        return Err(HeaderError::BufferTooShort {
            have: dst.len(),
            need: FILE_HEADER_LEN,
        });
    }
    if file_key_tag.len() != TAG_LEN_16 {
        return Err(HeaderError::UnsupportedTagSize {
            have: file_key_tag.len(),
        });
    }

    let mut i = 0usize;
    put_bytes(dst, &mut i, &MAGIC_CTN1);                  // 0..4   magic
    put_u32(dst, &mut i, FILE_HEADER_DECLARED_LEN);       // 4..8   header length
    put_u64(dst, &mut i, total_plaintext);                // 8..16  total plaintext
    put_u32(dst, &mut i, key_id);                         // 16..20 key id
    put_u32(dst, &mut i, nonce_prefix);                   // 20..24 nonce prefix
    put_bytes(dst, &mut i, file_key_nonce);               // 24..36 file key nonce
    put_bytes(dst, &mut i, file_key_tag);                 // 36..52 file key tag
    put_bytes(dst, &mut i, wrapped_file_key);             // 52..84 wrapped key
    debug_assert_eq!(i, FILE_HEADER_LEN);

    Ok(())
}

/// Serialize the chunk header into `dst`.
pub fn encode_chunk_header(
    dst: &mut [u8],
    key_id: u32,
    tag: &[u8],
    plaintext_len: u64,
) -> Result<(), HeaderError> {
    if dst.len() < CHUNK_HEADER_LEN {
        return Err(HeaderError::BufferTooShort {
            have: dst.len(),
            need: CHUNK_HEADER_LEN,
        });
    }
    if tag.len() != TAG_LEN_16 {
        return Err(HeaderError::UnsupportedTagSize { have: tag.len() });
    }

    let mut i = 0usize;
    put_bytes(dst, &mut i, &MAGIC_CTN1);                  // 0..4   magic
    put_u32(dst, &mut i, CHUNK_HEADER_DECLARED_LEN);      // 4..8   header length
    put_u64(dst, &mut i, plaintext_len);                  // 8..16  plaintext length
    put_u32(dst, &mut i, key_id);                         // 16..20 key id
    put_bytes(dst, &mut i, tag);                          // 20..36 tag
    debug_assert_eq!(i, CHUNK_HEADER_LEN);

    Ok(())
}
