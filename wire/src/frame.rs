//! Frame buffering for byte streams.
//!
//! Bytes arrive from a socket in arbitrary chunks. [`FrameBuffer`] keeps a
//! small state machine over a `BytesMut`:
//! - `WaitingForHeader`: need the 24-byte preamble
//! - `WaitingForPayload`: preamble parsed, need `payload_len` more bytes
//!
//! A bad preamble (wrong magic, inconsistent lengths, oversized frame) is
//! reported once and the buffered bytes are dropped; the stream cannot be
//! resynchronised reliably after that. Frames completed before the bad
//! preamble are still handed out.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::error::{DecodeError, FrameResult, LimitKind, WireResult, WriterResult};
use crate::header::{encode_frame, FrameHeader, HEADER_SIZE};
use crate::limits::Limits;
use crate::reader::PacketReader;

/// One complete frame: preamble fields plus the payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: Bytes,
}

impl Frame {
    /// Creates a frame from a decoded preamble and its payload.
    #[must_use]
    pub fn new(header: FrameHeader, payload: Bytes) -> Self {
        Self { header, payload }
    }

    /// A reader over the payload enforcing `limits`.
    #[must_use]
    pub fn reader(&self, limits: &Limits) -> PacketReader<'_> {
        PacketReader::with_limits(&self.payload, limits)
    }

    /// Re-encodes the frame to its wire bytes.
    pub fn encode(&self) -> WriterResult<Vec<u8>> {
        encode_frame(
            self.header.connection_type,
            self.header.packet_type,
            &self.payload,
        )
    }
}

/// What one [`FrameBuffer::push`] produced.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Pushed {
    /// Frames completed by this push, in stream order.
    pub frames: Vec<Frame>,
    /// The bad preamble that stopped extraction and reset the buffer.
    pub error: Option<DecodeError>,
}

impl Pushed {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    WaitingForHeader,
    WaitingForPayload { header: FrameHeader },
}

/// Accumulates stream bytes and yields complete frames.
#[derive(Debug)]
pub struct FrameBuffer {
    buffer: BytesMut,
    state: State,
    limits: Limits,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl FrameBuffer {
    /// Creates an empty buffer enforcing `limits`.
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            state: State::WaitingForHeader,
            limits,
        }
    }

    /// Appends `data` and extracts every frame it completes.
    ///
    /// Partial frames stay buffered for the next push. On a malformed
    /// preamble the buffer is reset and the error returned alongside the
    /// frames completed before it.
    pub fn push(&mut self, data: &[u8]) -> Pushed {
        self.buffer.extend_from_slice(data);

        let mut pushed = Pushed::default();
        loop {
            match self.try_extract_one() {
                Ok(Some(frame)) => pushed.frames.push(frame),
                Ok(None) => return pushed,
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        completed = pushed.frames.len(),
                        discarded = self.buffer.len(),
                        "malformed frame, resetting buffer"
                    );
                    self.clear();
                    pushed.error = Some(err);
                    return pushed;
                }
            }
        }
    }

    /// Number of buffered bytes not yet part of a returned frame.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && matches!(self.state, State::WaitingForHeader)
    }

    /// Drops buffered bytes and any half-parsed frame.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    fn try_extract_one(&mut self) -> WireResult<Option<Frame>> {
        match self.state {
            State::WaitingForHeader => {
                if self.buffer.len() < HEADER_SIZE {
                    return Ok(None);
                }

                let header = FrameHeader::decode(&self.buffer[..HEADER_SIZE])?;
                if header.frame_len() > self.limits.max_packet_bytes {
                    return Err(DecodeError::LimitsExceeded {
                        kind: LimitKind::PacketBytes,
                        limit: self.limits.max_packet_bytes,
                        actual: header.frame_len(),
                    });
                }

                let _ = self.buffer.split_to(HEADER_SIZE);
                self.state = State::WaitingForPayload { header };
                self.try_extract_one()
            }
            State::WaitingForPayload { header } => {
                let len = header.payload_len as usize;
                if self.buffer.len() < len {
                    return Ok(None);
                }

                let payload = self.buffer.split_to(len).freeze();
                self.state = State::WaitingForHeader;
                Ok(Some(Frame::new(header, payload)))
            }
        }
    }
}

/// Pulls frames off a blocking reader one at a time.
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
    buffer: FrameBuffer,
    ready: VecDeque<Frame>,
    failed: Option<DecodeError>,
    chunk: Vec<u8>,
}

impl<R: Read> FrameReader<R> {
    /// Wraps `inner` with default limits.
    pub fn new(inner: R) -> Self {
        Self::with_limits(inner, Limits::default())
    }

    /// Wraps `inner` enforcing `limits`.
    pub fn with_limits(inner: R, limits: Limits) -> Self {
        Self {
            inner,
            buffer: FrameBuffer::new(limits),
            ready: VecDeque::new(),
            failed: None,
            chunk: vec![0; 8 * 1024],
        }
    }

    /// Reads until one frame is complete.
    ///
    /// Returns `Ok(None)` at end of stream. A trailing partial frame is
    /// discarded. A malformed preamble is reported after the frames that
    /// preceded it.
    pub fn read_frame(&mut self) -> FrameResult<Option<Frame>> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Ok(Some(frame));
            }
            if let Some(err) = self.failed.take() {
                return Err(err.into());
            }

            let read = match self.inner.read(&mut self.chunk) {
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            if read == 0 {
                if !self.buffer.is_empty() {
                    tracing::warn!(
                        discarded = self.buffer.len(),
                        "stream ended inside a frame"
                    );
                    self.buffer.clear();
                }
                return Ok(None);
            }

            let pushed = self.buffer.push(&self.chunk[..read]);
            self.ready.extend(pushed.frames);
            self.failed = pushed.error;
        }
    }

    /// Consumes the reader, returning the wrapped stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = FrameResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}
