//! Bounded in-process byte pipe.
//!
//! Carries output from a pipeline running on background threads to a
//! caller-held reader. The channel is bounded, so a slow reader applies
//! backpressure all the way to the producer. A pipeline failure is sent
//! down the same channel and surfaces from `read` as an `io::Error` whose
//! source is the underlying `StreamError`; dropping the reader closes the
//! channel and aborts the writer side with `BrokenPipe`.

use std::io::{self, Read, Write};

use crossbeam::channel::{bounded, Receiver, Sender};

use crate::types::StreamError;

type Message = Result<Vec<u8>, StreamError>;

/// Write half, held by the background pipeline.
pub struct PipeWriter {
    tx: Sender<Message>,
}

/// Read half, handed to the caller.
pub struct PipeReader {
    rx: Receiver<Message>,
    buf: Vec<u8>,
    pos: usize,
}

/// Create a pipe holding at most `cap` in-flight blocks.
pub fn pipe(cap: usize) -> (PipeWriter, PipeReader) {
    let (tx, rx) = bounded(cap.max(1));
    (
        PipeWriter { tx },
        PipeReader {
            rx,
            buf: Vec::new(),
            pos: 0,
        },
    )
}

impl PipeWriter {
    /// Deliver a terminal pipeline error to the reader. Consumes the writer;
    /// nothing may follow an error.
    pub fn fail(self, err: StreamError) {
        let _ = self.tx.send(Err(err));
    }
}

impl Write for PipeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        self.tx
            .send(Ok(data.to_vec()))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "pipe reader dropped"))?;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        while self.pos == self.buf.len() {
            match self.rx.recv() {
                Ok(Ok(block)) => {
                    self.buf = block;
                    self.pos = 0;
                }
                Ok(Err(err)) => {
                    return Err(io::Error::new(io::ErrorKind::Other, err));
                }
                // Writer dropped: clean end of stream.
                Err(_) => return Ok(0),
            }
        }

        let n = (self.buf.len() - self.pos).min(out.len());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
