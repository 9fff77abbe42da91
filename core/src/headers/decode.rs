//! Header decoding.
//!
//! Design notes:
//! - Field order must match `encode.rs` exactly.
//! - Magic and the declared length are checked before anything else so a
//!   foreign stream is rejected without parsing further.
//! - `decode_file_header` validates structure only; the wrapped file key is
//!   verified separately against the master key.

use crate::constants::{
    CHUNK_HEADER_DECLARED_LEN, CHUNK_HEADER_LEN, FILE_HEADER_DECLARED_LEN, FILE_HEADER_LEN,
    MAGIC_CTN1,
};
use crate::headers::types::{ChunkHeader, FileHeader, HeaderError};

fn get_u32(buf: &[u8], i: &mut usize) -> u32 {
    let v = u32::from_le_bytes(buf[*i..*i + 4].try_into().unwrap());
    *i += 4;
    v
}

fn get_u64(buf: &[u8], i: &mut usize) -> u64 {
    let v = u64::from_le_bytes(buf[*i..*i + 8].try_into().unwrap());
    *i += 8;
    v
}

fn get_bytes<const N: usize>(buf: &[u8], i: &mut usize) -> [u8; N] {
    let mut dst = [0u8; N];
    dst.copy_from_slice(&buf[*i..*i + N]);
    *i += N;
    dst
}

/// Deserialize and validate a file header.
pub fn decode_file_header(buf: &[u8]) -> Result<FileHeader, HeaderError> {
    if buf.len() < FILE_HEADER_LEN {
        return Err(HeaderError::BufferTooShort {
            have: buf.len(),
            need: FILE_HEADER_LEN,
        });
    }

    let mut i = 0usize;

    let magic = get_bytes::<4>(buf, &mut i);              // 0..4   magic
    if magic != MAGIC_CTN1 {
        return Err(HeaderError::InvalidMagic { have: magic });
    }

    let declared = get_u32(buf, &mut i);                  // 4..8   header length
    if declared != FILE_HEADER_DECLARED_LEN {
        return Err(HeaderError::InvalidHeaderLength {
            have: declared,
            need: FILE_HEADER_DECLARED_LEN,
        });
    }

    let header = FileHeader {
        total_plaintext: get_u64(buf, &mut i),            // 8..16  total plaintext
        key_id: get_u32(buf, &mut i),                     // 16..20 key id
        nonce_prefix: get_u32(buf, &mut i),               // 20..24 nonce prefix
        file_key_nonce: get_bytes::<12>(buf, &mut i),     // 24..36 file key nonce
        file_key_tag: get_bytes::<16>(buf, &mut i),       // 36..52 file key tag
        wrapped_file_key: get_bytes::<32>(buf, &mut i),   // 52..84 wrapped key
    };
    debug_assert_eq!(i, FILE_HEADER_LEN);

    header.validate()?;
    Ok(header)
}

/// Deserialize a chunk header. Stream-level validation (key id, chunk length
/// bound) is the caller's via `ChunkHeader::validate`.
pub fn decode_chunk_header(buf: &[u8]) -> Result<ChunkHeader, HeaderError> {
    if buf.len() < CHUNK_HEADER_LEN {
        return Err(HeaderError::BufferTooShort {
            have: buf.len(),
            need: CHUNK_HEADER_LEN,
        });
    }

    let mut i = 0usize;

    let magic = get_bytes::<4>(buf, &mut i);              // 0..4   magic
    if magic != MAGIC_CTN1 {
        return Err(HeaderError::InvalidMagic { have: magic });
    }

    let declared = get_u32(buf, &mut i);                  // 4..8   header length
    if declared != CHUNK_HEADER_DECLARED_LEN {
        return Err(HeaderError::InvalidChunkHeaderLength {
            have: declared,
            need: CHUNK_HEADER_DECLARED_LEN,
        });
    }

    let header = ChunkHeader {
        plaintext_len: get_u64(buf, &mut i),              // 8..16  plaintext length
        key_id: get_u32(buf, &mut i),                     // 16..20 key id
        tag: get_bytes::<16>(buf, &mut i),                // 20..36 tag
    };
    debug_assert_eq!(i, CHUNK_HEADER_LEN);

    Ok(header)
}
