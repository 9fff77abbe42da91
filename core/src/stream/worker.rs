//! Crypto workers: seal or open chunks pulled from the job channel.
//!
//! Each worker owns one AES-GCM instance plus a nonce scratch and an AAD
//! scratch whose stream prefix is written once, so the per-chunk work is
//! two small writes and the AEAD call. Workers never touch the output
//! stream; results go to the consumer over the bounded result channel.
//!
//! A worker failure (including authentication failure) is delivered through
//! the result channel and ends that worker; buffers travel inside jobs and
//! results, so abandoned items recycle on drop wherever they are.

use crossbeam::channel::{Receiver, Sender};
use tracing::warn;

use crate::constants::AAD_LEN;
use crate::crypto::aad::{fill_aad_mutable, init_aad_prefix};
use crate::crypto::nonce::compose_nonce;
use crate::crypto::{ChunkCipher, FileKey, NONCE_LEN_12, TAG_LEN_16};
use crate::pool::{BufferArena, PooledBuf};
use crate::stream::cancel::CancellationToken;
use crate::types::StreamError;

pub struct EncryptJob {
    pub index: u64,
    pub plaintext: PooledBuf,
}

pub struct EncryptDone {
    pub index: u64,
    pub tag: [u8; TAG_LEN_16],
    pub ciphertext: PooledBuf,
}

pub struct DecryptJob {
    pub index: u64,
    pub tag: [u8; TAG_LEN_16],
    pub ciphertext: PooledBuf,
}

pub struct DecryptDone {
    pub index: u64,
    pub plaintext: PooledBuf,
}

pub struct EncryptWorker {
    cipher: ChunkCipher,
    nonce_prefix: u32,
    nonce: [u8; NONCE_LEN_12],
    aad: [u8; AAD_LEN],
}

impl EncryptWorker {
    pub fn new(file_key: &FileKey, key_id: u32, nonce_prefix: u32) -> Self {
        let mut aad = [0u8; AAD_LEN];
        init_aad_prefix(&mut aad, key_id);
        Self {
            cipher: ChunkCipher::new(file_key.as_bytes()),
            nonce_prefix,
            nonce: [0u8; NONCE_LEN_12],
            aad,
        }
    }

    /// Consume jobs until the channel closes, an error occurs, or the
    /// operation is cancelled.
    pub fn run(
        mut self,
        rx: &Receiver<EncryptJob>,
        tx: &Sender<Result<EncryptDone, StreamError>>,
        arena: &BufferArena,
        cancel: &CancellationToken,
    ) {
        for job in rx.iter() {
            if cancel.is_cancelled() {
                let _ = tx.send(Err(StreamError::Cancelled));
                return;
            }
            match self.seal(job, arena) {
                Ok(done) => {
                    if tx.send(Ok(done)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    return;
                }
            }
        }
    }

    fn seal(&mut self, job: EncryptJob, arena: &BufferArena) -> Result<EncryptDone, StreamError> {
        compose_nonce(&mut self.nonce, self.nonce_prefix, job.index)?;
        fill_aad_mutable(&mut self.aad, job.index, job.plaintext.len() as u64);

        let mut ciphertext = arena.rent(job.plaintext.len())?;
        ciphertext.copy_from_slice(&job.plaintext);
        let tag = self
            .cipher
            .seal_in_place(&self.nonce, &self.aad, &mut ciphertext)?;

        Ok(EncryptDone {
            index: job.index,
            tag,
            ciphertext,
        })
    }
}

pub struct DecryptWorker {
    cipher: ChunkCipher,
    nonce_prefix: u32,
    nonce: [u8; NONCE_LEN_12],
    aad: [u8; AAD_LEN],
}

impl DecryptWorker {
    pub fn new(file_key: &FileKey, key_id: u32, nonce_prefix: u32) -> Self {
        let mut aad = [0u8; AAD_LEN];
        init_aad_prefix(&mut aad, key_id);
        Self {
            cipher: ChunkCipher::new(file_key.as_bytes()),
            nonce_prefix,
            nonce: [0u8; NONCE_LEN_12],
            aad,
        }
    }

    pub fn run(
        mut self,
        rx: &Receiver<DecryptJob>,
        tx: &Sender<Result<DecryptDone, StreamError>>,
        arena: &BufferArena,
        cancel: &CancellationToken,
    ) {
        for job in rx.iter() {
            if cancel.is_cancelled() {
                let _ = tx.send(Err(StreamError::Cancelled));
                return;
            }
            match self.open(job, arena) {
                Ok(done) => {
                    if tx.send(Ok(done)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e));
                    return;
                }
            }
        }
    }

    fn open(&mut self, job: DecryptJob, arena: &BufferArena) -> Result<DecryptDone, StreamError> {
        compose_nonce(&mut self.nonce, self.nonce_prefix, job.index)?;
        fill_aad_mutable(&mut self.aad, job.index, job.ciphertext.len() as u64);

        let mut plaintext = arena.rent(job.ciphertext.len())?;
        plaintext.copy_from_slice(&job.ciphertext);
        if let Err(e) = self
            .cipher
            .open_in_place(&self.nonce, &self.aad, &mut plaintext, &job.tag)
        {
            warn!(chunk = job.index, "chunk authentication failed");
            return Err(e.into());
        }

        Ok(DecryptDone {
            index: job.index,
            plaintext,
        })
    }
}
