//! Stream cipher facade.
//!
//! Owns the caller's master key and key id, validates parameters, and
//! composes the codec, arena and pipelines into the two public operations.
//! Every encryption generates a fresh file key and nonce prefix from the OS
//! CSPRNG; the file key exists in memory only for the duration of the
//! operation and the master key never leaves this struct.

use std::fmt;
use std::io::{Read, Write};
use std::thread;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::constants::{
    DEFAULT_CHUNK_SIZE, FILE_HEADER_LEN, MAX_CHUNK_SIZE, MAX_KEY_ID, MIN_CHUNK_SIZE, MIN_KEY_ID,
};
use crate::crypto::{
    unwrap_file_key, wrap_file_key_with_nonce, FileKey, KEY_LEN_32, NONCE_LEN_12,
};
use crate::headers::{decode_file_header, FileHeader, HeaderError};
use crate::pool::BufferArena;
use crate::stream::cancel::CancellationToken;
use crate::stream::io::read_full;
use crate::stream::parallelism::ParallelismProfile;
use crate::stream::pipe::{pipe, PipeReader};
use crate::stream::pipeline::{run_decrypt_pipeline, run_encrypt_pipeline};
use crate::telemetry::RunSnapshot;
use crate::types::StreamError;

/// Encryption parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptOptions {
    /// Plaintext bytes per chunk, in `[MIN_CHUNK_SIZE, MAX_CHUNK_SIZE]`.
    pub chunk_size: usize,
    /// Total plaintext length when the input is measurable; recorded in the
    /// file header. `None` records 0 (unknown).
    pub total_len: Option<u64>,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            total_len: None,
        }
    }
}

impl EncryptOptions {
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            ..Self::default()
        }
    }

    pub fn sized(chunk_size: usize, total_len: u64) -> Self {
        Self {
            chunk_size,
            total_len: Some(total_len),
        }
    }

    fn validate(&self) -> Result<(), StreamError> {
        if self.chunk_size < MIN_CHUNK_SIZE || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(StreamError::Validation(format!(
                "chunk size {} outside [{MIN_CHUNK_SIZE}, {MAX_CHUNK_SIZE}]",
                self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Decryption parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptOptions {
    /// Fail with `LengthMismatch` when the header records a nonzero total
    /// and the decrypted byte count differs.
    pub strict_length: bool,
    /// Upper bound accepted for declared chunk lengths. Tightening this also
    /// tightens the arena byte budget.
    pub max_chunk_size: usize,
}

impl Default for DecryptOptions {
    fn default() -> Self {
        Self {
            strict_length: false,
            max_chunk_size: MAX_CHUNK_SIZE,
        }
    }
}

impl DecryptOptions {
    pub fn strict() -> Self {
        Self {
            strict_length: true,
            ..Self::default()
        }
    }
}

/// Everything random about one encrypted stream: the file key, the chunk
/// nonce prefix and the file-key wrap nonce. Encryption is a pure function
/// of (master key, key id, material, plaintext), which is what the
/// deterministic entry point and the golden-vector tests rely on.
#[derive(Debug)]
pub struct FileKeyMaterial {
    pub file_key: FileKey,
    pub nonce_prefix: u32,
    pub file_key_nonce: [u8; NONCE_LEN_12],
}

impl FileKeyMaterial {
    /// Fresh material from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut file_key_nonce = [0u8; NONCE_LEN_12];
        OsRng.fill_bytes(&mut file_key_nonce);
        Self {
            file_key: FileKey::generate(),
            nonce_prefix: OsRng.next_u32(),
            file_key_nonce,
        }
    }
}

/// Parallel chunked AES-256-GCM stream cipher bound to one master key and
/// key id.
#[derive(Clone)]
pub struct StreamCipher {
    master_key: Zeroizing<[u8; KEY_LEN_32]>,
    key_id: u32,
    profile: ParallelismProfile,
}

impl fmt::Debug for StreamCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamCipher")
            .field("master_key", &"[REDACTED]")
            .field("key_id", &self.key_id)
            .field("profile", &self.profile)
            .finish()
    }
}

impl StreamCipher {
    /// Cipher with the default worker count (every available core, at least
    /// two workers).
    pub fn new(master_key: [u8; KEY_LEN_32], key_id: u32) -> Result<Self, StreamError> {
        Self::with_threads(master_key, key_id, num_cpus::get())
    }

    /// Cipher with `max(2, min(available cores, threads))` workers.
    pub fn with_threads(
        master_key: [u8; KEY_LEN_32],
        key_id: u32,
        threads: usize,
    ) -> Result<Self, StreamError> {
        if !(MIN_KEY_ID..=MAX_KEY_ID).contains(&key_id) {
            return Err(StreamError::Header(HeaderError::InvalidKeyId {
                have: key_id,
            }));
        }
        Ok(Self {
            master_key: Zeroizing::new(master_key),
            key_id,
            profile: ParallelismProfile::new(threads),
        })
    }

    pub fn key_id(&self) -> u32 {
        self.key_id
    }

    pub fn profile(&self) -> &ParallelismProfile {
        &self.profile
    }

    /// Encrypt `input` into `output` with fresh random key material.
    pub fn encrypt<R, W>(
        &self,
        input: &mut R,
        output: &mut W,
        opts: &EncryptOptions,
        cancel: &CancellationToken,
    ) -> Result<RunSnapshot, StreamError>
    where
        R: Read + Send,
        W: Write,
    {
        self.encrypt_with_material(FileKeyMaterial::generate(), input, output, opts, cancel)
    }

    /// Encrypt with caller-supplied key material. The output is byte-for-byte
    /// deterministic for fixed material, independent of the worker count.
    pub fn encrypt_with_material<R, W>(
        &self,
        material: FileKeyMaterial,
        input: &mut R,
        output: &mut W,
        opts: &EncryptOptions,
        cancel: &CancellationToken,
    ) -> Result<RunSnapshot, StreamError>
    where
        R: Read + Send,
        W: Write,
    {
        opts.validate()?;
        cancel.check()?;

        let wrapped = wrap_file_key_with_nonce(
            &self.master_key,
            self.key_id,
            &material.file_key,
            material.file_key_nonce,
        )?;
        let header = FileHeader {
            total_plaintext: opts.total_len.unwrap_or(0),
            key_id: self.key_id,
            nonce_prefix: material.nonce_prefix,
            file_key_nonce: wrapped.nonce,
            file_key_tag: wrapped.tag,
            wrapped_file_key: wrapped.key,
        };

        let arena = BufferArena::new(self.profile.arena_limits(opts.chunk_size));
        run_encrypt_pipeline(
            input,
            output,
            &material.file_key,
            &header,
            opts.chunk_size,
            &self.profile,
            &arena,
            cancel,
        )
    }

    /// Decrypt `input` into `output`, verifying the wrapped file key and
    /// every chunk.
    pub fn decrypt<R, W>(
        &self,
        input: &mut R,
        output: &mut W,
        opts: &DecryptOptions,
        cancel: &CancellationToken,
    ) -> Result<RunSnapshot, StreamError>
    where
        R: Read + Send,
        W: Write,
    {
        cancel.check()?;

        let mut header_buf = [0u8; FILE_HEADER_LEN];
        let got = read_full(input, &mut header_buf)?;
        if got < FILE_HEADER_LEN {
            return Err(StreamError::UnexpectedEnd {
                expected: FILE_HEADER_LEN,
                got,
            });
        }

        let header = decode_file_header(&header_buf)?;
        if header.key_id != self.key_id {
            return Err(StreamError::Header(HeaderError::KeyIdMismatch {
                have: header.key_id,
                need: self.key_id,
            }));
        }

        let file_key = unwrap_file_key(&self.master_key, self.key_id, &header.wrapped_key())?;
        debug!(key_id = self.key_id, "file key unwrapped");

        let arena = BufferArena::new(self.profile.arena_limits(opts.max_chunk_size));
        run_decrypt_pipeline(
            input,
            output,
            &file_key,
            &header,
            opts.max_chunk_size,
            opts.strict_length,
            &self.profile,
            &arena,
            cancel,
        )
    }

    /// Encrypt on background threads and return a reader over the produced
    /// ciphertext. Pipeline failures surface from the reader as `io::Error`.
    pub fn encrypt_reader<R>(
        &self,
        mut input: R,
        opts: EncryptOptions,
        cancel: CancellationToken,
    ) -> PipeReader
    where
        R: Read + Send + 'static,
    {
        let (mut writer, reader) = pipe(self.profile.queue_cap);
        let cipher = self.clone();
        thread::spawn(move || {
            if let Err(e) = cipher.encrypt(&mut input, &mut writer, &opts, &cancel) {
                writer.fail(e);
            }
        });
        reader
    }

    /// Decrypt on background threads and return a reader over the recovered
    /// plaintext. Pipeline failures surface from the reader as `io::Error`.
    pub fn decrypt_reader<R>(
        &self,
        mut input: R,
        opts: DecryptOptions,
        cancel: CancellationToken,
    ) -> PipeReader
    where
        R: Read + Send + 'static,
    {
        let (mut writer, reader) = pipe(self.profile.queue_cap);
        let cipher = self.clone();
        thread::spawn(move || {
            if let Err(e) = cipher.decrypt(&mut input, &mut writer, &opts, &cancel) {
                writer.fail(e);
            }
        });
        reader
    }
}
