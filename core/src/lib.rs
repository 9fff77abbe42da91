//! cryptainer-core
//!
//! Parallel, chunked, authenticated streaming cipher over AES-256-GCM.
//! A self-describing container wraps a fresh per-file key under a
//! caller-held master key, seals fixed-size chunks on a worker pool, and
//! reassembles output in strict chunk order.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;

// Building blocks
pub mod crypto;
pub mod headers;
pub mod pool;
pub mod telemetry;

// Pipelines and facade
pub mod cipher;
pub mod stream;

pub use cipher::{DecryptOptions, EncryptOptions, FileKeyMaterial, StreamCipher};
pub use stream::cancel::CancellationToken;
pub use telemetry::RunSnapshot;
pub use types::StreamError;
