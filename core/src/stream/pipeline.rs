//! Pipeline wiring: producer, crypto worker pool, in-order consumer.
//!
//! Both directions share one shape. The producer slices or parses the input
//! and numbers chunks from zero; workers seal or open chunks in any order;
//! the single consumer reorders by index and writes output strictly in
//! order. Bounded channels provide backpressure in both directions, and a
//! shared abort flag stops the producer promptly when a later stage fails.
//!
//! Buffer discipline: every plaintext and ciphertext buffer is a pooled
//! handle that recycles on drop, so success, failure and cancellation all
//! leave the arena balanced without per-path bookkeeping.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam::channel::bounded;
use tracing::{debug, trace};

use crate::constants::{CHUNK_HEADER_LEN, FILE_HEADER_LEN};
use crate::crypto::{FileKey, NonceError};
use crate::headers::{encode_file_header, FileHeader};
use crate::pool::BufferArena;
use crate::stream::cancel::CancellationToken;
use crate::stream::io::{read_chunk_frame, read_full, write_chunk_frame};
use crate::stream::parallelism::ParallelismProfile;
use crate::stream::reorder::ReorderWindow;
use crate::stream::worker::{
    DecryptDone, DecryptJob, DecryptWorker, EncryptDone, EncryptJob, EncryptWorker,
};
use crate::telemetry::{PipelineCounters, RunSnapshot, RunTimer};
use crate::types::StreamError;

/// Run the encryption pipeline: file header first, then framed chunks in
/// index order.
#[allow(clippy::too_many_arguments)]
pub fn run_encrypt_pipeline<R, W>(
    input: &mut R,
    output: &mut W,
    file_key: &FileKey,
    header: &FileHeader,
    chunk_size: usize,
    profile: &ParallelismProfile,
    arena: &BufferArena,
    cancel: &CancellationToken,
) -> Result<RunSnapshot, StreamError>
where
    R: Read + Send,
    W: Write,
{
    let timer = RunTimer::start();
    let mut counters = PipelineCounters::default();

    cancel.check()?;

    let mut header_buf = [0u8; FILE_HEADER_LEN];
    encode_file_header(
        &mut header_buf,
        header.key_id,
        header.nonce_prefix,
        &header.file_key_nonce,
        &header.file_key_tag,
        &header.wrapped_file_key,
        header.total_plaintext,
    )?;
    output.write_all(&header_buf)?;
    counters.add_file_header(FILE_HEADER_LEN);

    let key_id = header.key_id;
    let nonce_prefix = header.nonce_prefix;
    debug!(
        workers = profile.workers,
        chunk_size, key_id, "encrypt pipeline started"
    );

    let (job_tx, job_rx) = bounded::<EncryptJob>(profile.queue_cap);
    let (res_tx, res_rx) = bounded::<Result<EncryptDone, StreamError>>(profile.queue_cap);
    let abort = AtomicBool::new(false);

    let outcome: Result<(), StreamError> = thread::scope(|scope| {
        // ---- Producer: slice input into numbered jobs ----
        let producer = scope.spawn({
            let abort = &abort;
            let input = &mut *input;
            move || -> Result<(), StreamError> {
                let mut index = 0u64;
                loop {
                    cancel.check()?;
                    if abort.load(Ordering::Acquire) {
                        return Ok(());
                    }
                    if index == u64::MAX {
                        return Err(StreamError::Nonce(NonceError::CounterExhausted));
                    }

                    let mut buf = arena.rent(chunk_size)?;
                    let n = read_full(input, &mut buf)?;
                    if n == 0 {
                        trace!(chunks = index, "encrypt producer reached end of input");
                        return Ok(());
                    }
                    buf.truncate(n);

                    if job_tx
                        .send(EncryptJob {
                            index,
                            plaintext: buf,
                        })
                        .is_err()
                    {
                        // A later stage failed; its error reaches the caller
                        // through the consumer.
                        return Ok(());
                    }
                    index += 1;
                }
            }
        });

        // ---- Worker pool ----
        for _ in 0..profile.workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let worker = EncryptWorker::new(file_key, key_id, nonce_prefix);
            scope.spawn(move || worker.run(&rx, &tx, arena, cancel));
        }
        drop(job_rx);
        drop(res_tx);

        // ---- Consumer: reorder and write framed chunks ----
        let mut window =
            ReorderWindow::new(profile.initial_window(), profile.window_cap);
        let mut result: Result<(), StreamError> = Ok(());

        for res in res_rx.iter() {
            let step = cancel.check().and(res).and_then(|done| {
                let index = done.index;
                window.put(index, done)?;
                while let Some(ready) = window.pop_next() {
                    write_chunk_frame(output, key_id, &ready.tag, &ready.ciphertext)?;
                    counters.add_chunk(ready.ciphertext.len(), CHUNK_HEADER_LEN);
                }
                Ok(())
            });
            if let Err(e) = step {
                abort.store(true, Ordering::Release);
                result = Err(e);
                break;
            }
        }
        drop(res_rx);

        if result.is_ok() && !window.is_empty() {
            result = Err(StreamError::Pipeline("chunks missing at shutdown"));
        }
        // Leftover out-of-order items recycle as the window drops.
        drop(window);

        let produced = producer
            .join()
            .unwrap_or(Err(StreamError::Pipeline("encrypt producer panicked")));
        result.and(produced)
    });
    outcome?;

    output.flush()?;
    debug!(chunks = counters.chunks, "encrypt pipeline finished");
    Ok(RunSnapshot::from_counters(&counters, &timer))
}

/// Run the decryption pipeline over an input positioned just past the file
/// header. Plaintext is released only for chunks that authenticated, in
/// strict index order.
#[allow(clippy::too_many_arguments)]
pub fn run_decrypt_pipeline<R, W>(
    input: &mut R,
    output: &mut W,
    file_key: &FileKey,
    header: &FileHeader,
    max_chunk: usize,
    strict_length: bool,
    profile: &ParallelismProfile,
    arena: &BufferArena,
    cancel: &CancellationToken,
) -> Result<RunSnapshot, StreamError>
where
    R: Read + Send,
    W: Write,
{
    let timer = RunTimer::start();
    let mut counters = PipelineCounters::default();
    counters.add_file_header(FILE_HEADER_LEN);

    cancel.check()?;

    let key_id = header.key_id;
    let nonce_prefix = header.nonce_prefix;
    debug!(workers = profile.workers, key_id, "decrypt pipeline started");

    let (job_tx, job_rx) = bounded::<DecryptJob>(profile.queue_cap);
    let (res_tx, res_rx) = bounded::<Result<DecryptDone, StreamError>>(profile.queue_cap);
    let abort = AtomicBool::new(false);

    let outcome: Result<(), StreamError> = thread::scope(|scope| {
        // ---- Producer: parse chunk frames into numbered jobs ----
        let producer = scope.spawn({
            let abort = &abort;
            let input = &mut *input;
            move || -> Result<(), StreamError> {
                let mut index = 0u64;
                loop {
                    cancel.check()?;
                    if abort.load(Ordering::Acquire) {
                        return Ok(());
                    }
                    if index == u64::MAX {
                        return Err(StreamError::Nonce(NonceError::CounterExhausted));
                    }

                    let frame = read_chunk_frame(input, key_id, max_chunk, arena)?;
                    let (chunk_header, payload) = match frame {
                        Some(frame) => frame,
                        None => {
                            trace!(chunks = index, "decrypt producer reached end of stream");
                            return Ok(());
                        }
                    };

                    if job_tx
                        .send(DecryptJob {
                            index,
                            tag: chunk_header.tag,
                            ciphertext: payload,
                        })
                        .is_err()
                    {
                        return Ok(());
                    }
                    index += 1;
                }
            }
        });

        // ---- Worker pool ----
        for _ in 0..profile.workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let worker = DecryptWorker::new(file_key, key_id, nonce_prefix);
            scope.spawn(move || worker.run(&rx, &tx, arena, cancel));
        }
        drop(job_rx);
        drop(res_tx);

        // ---- Consumer: reorder and write plaintext ----
        let mut window =
            ReorderWindow::new(profile.initial_window(), profile.window_cap);
        let mut result: Result<(), StreamError> = Ok(());

        for res in res_rx.iter() {
            let step = cancel.check().and(res).and_then(|done| {
                let index = done.index;
                window.put(index, done)?;
                while let Some(ready) = window.pop_next() {
                    output.write_all(&ready.plaintext)?;
                    counters.add_chunk(ready.plaintext.len(), CHUNK_HEADER_LEN);
                }
                Ok(())
            });
            if let Err(e) = step {
                abort.store(true, Ordering::Release);
                result = Err(e);
                break;
            }
        }
        drop(res_rx);

        if result.is_ok() && !window.is_empty() {
            result = Err(StreamError::Pipeline("chunks missing at shutdown"));
        }
        drop(window);

        let produced = producer
            .join()
            .unwrap_or(Err(StreamError::Pipeline("decrypt producer panicked")));
        result.and(produced)
    });
    outcome?;

    if strict_length && header.total_plaintext != 0 {
        // A recorded total of zero means the length was unknown at encrypt
        // time; nothing to verify against.
        if counters.bytes_plaintext != header.total_plaintext {
            return Err(StreamError::LengthMismatch {
                expected: header.total_plaintext,
                actual: counters.bytes_plaintext,
            });
        }
    }

    output.flush()?;
    debug!(chunks = counters.chunks, "decrypt pipeline finished");
    Ok(RunSnapshot::from_counters(&counters, &timer))
}
