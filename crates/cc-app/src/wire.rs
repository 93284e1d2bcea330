//! Envelope I/O over a byte stream.
//!
//! Envelopes are self-delimiting, so there is no frame header: the reader
//! accumulates whatever the stream delivers and retries decoding after
//! every read until a whole value is buffered. Large payloads routinely
//! arrive split across several reads.

use anyhow::Result;
use cc_core::{Envelope, ProtocolError};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{trace, warn};

/// Upper bound for a single read from the stream (1 MiB).
pub const READ_CHUNK_BYTES: usize = 1024 * 1024;

/// Maximum buffered size of one envelope (64 MiB).
pub const MAX_ENVELOPE_BYTES: usize = 64 * 1024 * 1024;

pub struct EnvelopeStream<S> {
    inner: S,
    buf: Vec<u8>,
    chunk: Vec<u8>,
}

impl<S> EnvelopeStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            chunk: Vec::new(),
        }
    }

    /// Bytes received but not yet consumed by a decoded envelope.
    #[cfg(test)]
    fn buffered(&self) -> usize {
        self.buf.len()
    }

    fn try_decode(&mut self) -> Result<Option<Envelope>, ProtocolError> {
        let Some(start) = self.buf.iter().position(|b| !b.is_ascii_whitespace()) else {
            self.buf.clear();
            return Ok(None);
        };

        let mut values =
            serde_json::Deserializer::from_slice(&self.buf[start..]).into_iter::<Envelope>();
        match values.next() {
            None => Ok(None),
            Some(Ok(envelope)) => {
                let consumed = start + values.byte_offset();
                self.buf.drain(..consumed);
                Ok(Some(envelope))
            }
            // Incomplete value: wait for more bytes.
            Some(Err(e)) if e.is_eof() => Ok(None),
            Some(Err(e)) => Err(ProtocolError::Malformed(e)),
        }
    }
}

impl<S> EnvelopeStream<S>
where
    S: AsyncRead + Unpin,
{
    /// Read the next envelope.
    ///
    /// Returns `Ok(None)` once the peer closes the stream; bytes of an
    /// unfinished envelope are discarded at that point.
    pub async fn receive(&mut self) -> Result<Option<Envelope>> {
        if self.chunk.is_empty() {
            self.chunk = vec![0u8; READ_CHUNK_BYTES];
        }

        loop {
            if let Some(envelope) = self.try_decode()? {
                trace!(kind = envelope.name(), "received envelope");
                return Ok(Some(envelope));
            }

            let n = self.inner.read(&mut self.chunk).await?;
            if n == 0 {
                if !self.buf.is_empty() {
                    warn!(
                        discarded = self.buf.len(),
                        "peer closed mid-envelope, discarding partial bytes"
                    );
                    self.buf.clear();
                }
                return Ok(None);
            }

            trace!(read = n, buffered = self.buf.len() + n, "read chunk");
            self.buf.extend_from_slice(&self.chunk[..n]);
            if self.buf.len() > MAX_ENVELOPE_BYTES {
                return Err(ProtocolError::TooLarge {
                    size: self.buf.len(),
                    max: MAX_ENVELOPE_BYTES,
                }
                .into());
            }
        }
    }
}

impl<S> EnvelopeStream<S>
where
    S: AsyncWrite + Unpin,
{
    pub async fn send(&mut self, envelope: &Envelope) -> Result<()> {
        let bytes = envelope.to_wire().map_err(ProtocolError::from)?;
        trace!(kind = envelope.name(), len = bytes.len(), "sending envelope");
        self.inner.write_all(&bytes).await?;
        self.inner.flush().await?;
        Ok(())
    }
}
