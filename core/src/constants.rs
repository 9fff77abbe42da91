//! Wire-format and pipeline constants.
//!
//! The magic is a protocol field of exactly four bytes, so it is typed as
//! `[u8; 4]` and compares directly against the header struct field.

/// Magic number for this container version.
/// "CTN1" = encrypted container, format 1.
pub const MAGIC_CTN1: [u8; 4] = *b"CTN1";

/// Format version, bound into every AAD as a u32 little-endian field.
pub const FORMAT_VERSION: u32 = 1;

/// Fixed file header size in bytes.
pub const FILE_HEADER_LEN: usize = 84;

/// Value of the file header's length field: the 76 bytes that follow it.
pub const FILE_HEADER_DECLARED_LEN: u32 = 76;

/// Fixed chunk header size in bytes.
pub const CHUNK_HEADER_LEN: usize = 36;

/// Value of the chunk header's length field: the 32 bytes that follow the
/// magic.
pub const CHUNK_HEADER_DECLARED_LEN: u32 = 32;

/// Fixed AAD size in bytes. Never serialized; bound into every seal/open.
pub const AAD_LEN: usize = 32;

/// Smallest chunk the encoder accepts (64 KiB).
pub const MIN_CHUNK_SIZE: usize = 64 * 1024;

/// Largest chunk either side accepts (1 GiB). The decoder enforces the same
/// bound on declared chunk lengths before allocating.
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024 * 1024;

/// Default chunk size when the caller has no preference (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Key identifiers live in [1, i32::MAX] so they survive signed 32-bit
/// readers of the wire format.
pub const MIN_KEY_ID: u32 = 1;
pub const MAX_KEY_ID: u32 = i32::MAX as u32;

/// Lower bound on the default worker pool. Profiles built by tests may still
/// request a single worker explicitly.
pub const MIN_WORKERS: usize = 2;

/// Job and result channels hold `workers * QUEUE_CAP_PER_WORKER` entries.
pub const QUEUE_CAP_PER_WORKER: usize = 4;

/// Smallest reorder window ever allocated.
pub const MIN_REORDER_WINDOW: usize = 4;

/// Hard cap on reorder window growth. An insert further than this ahead of
/// the next expected index is a pipeline integrity error.
pub const DEFAULT_WINDOW_CAP: usize = 1024;
