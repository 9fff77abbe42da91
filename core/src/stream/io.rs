//! Framed stream I/O.
//!
//! Reading is tolerant of split reads: `read_full` keeps reading until the
//! buffer is full or the stream ends. A chunk frame boundary is only legal
//! at a frame start, so a partial chunk header or a short payload is
//! `UnexpectedEnd`, while zero bytes at a frame start is a clean end of
//! stream.

use std::io::{Read, Write};

use crate::constants::CHUNK_HEADER_LEN;
use crate::headers::{decode_chunk_header, encode_chunk_header, ChunkHeader};
use crate::pool::{BufferArena, PooledBuf};
use crate::types::StreamError;

/// Fill `buf` from `r`, tolerating short reads. Returns the number of bytes
/// read, which is less than `buf.len()` only at end of stream.
pub fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<usize, StreamError> {
    let mut off = 0;
    while off < buf.len() {
        let n = r.read(&mut buf[off..])?;
        if n == 0 {
            break;
        }
        off += n;
    }
    Ok(off)
}

/// Read one chunk frame: a 36-byte header, then exactly `plaintext_len`
/// ciphertext bytes into a rented buffer.
///
/// Returns `None` at a clean end of stream. A frame truncated anywhere,
/// header or payload, is `UnexpectedEnd`. The header is validated against
/// the stream's key id and chunk bound before the payload is read, so a
/// hostile length never drives the allocation.
pub fn read_chunk_frame<R: Read>(
    r: &mut R,
    expect_key_id: u32,
    max_chunk: usize,
    arena: &BufferArena,
) -> Result<Option<(ChunkHeader, PooledBuf)>, StreamError> {
    let mut header_buf = [0u8; CHUNK_HEADER_LEN];
    let got = read_full(r, &mut header_buf)?;
    if got == 0 {
        return Ok(None);
    }
    if got < CHUNK_HEADER_LEN {
        return Err(StreamError::UnexpectedEnd {
            expected: CHUNK_HEADER_LEN,
            got,
        });
    }

    let header = decode_chunk_header(&header_buf)?;
    header.validate(expect_key_id, max_chunk)?;

    let len = header.plaintext_len as usize;
    let mut payload = arena.rent(len)?;
    let got = read_full(r, &mut payload)?;
    if got < len {
        return Err(StreamError::UnexpectedEnd {
            expected: len,
            got,
        });
    }

    Ok(Some((header, payload)))
}

/// Write one chunk frame: header, then the ciphertext.
pub fn write_chunk_frame<W: Write>(
    w: &mut W,
    key_id: u32,
    tag: &[u8; 16],
    ciphertext: &[u8],
) -> Result<(), StreamError> {
    let mut header_buf = [0u8; CHUNK_HEADER_LEN];
    encode_chunk_header(&mut header_buf, key_id, tag, ciphertext.len() as u64)?;
    w.write_all(&header_buf)?;
    w.write_all(ciphertext)?;
    Ok(())
}
