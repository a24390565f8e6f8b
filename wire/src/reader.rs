//! Cursor over a framed payload.

use bitfield::{BitField, Flag, FlagSchema};

use crate::error::{DecodeError, LimitKind, WireResult};
use crate::limits::Limits;

/// Reads little-endian primitives from a payload.
///
/// Every read is bounds-checked; running past the end yields
/// [`DecodeError::UnexpectedEof`] with the offset of the failed read rather
/// than zero-filling.
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    buf: &'a [u8],
    pos: usize,
    max_string_chars: usize,
}

impl<'a> PacketReader<'a> {
    /// Creates a reader with default limits.
    #[must_use]
    pub fn new(payload: &'a [u8]) -> Self {
        Self::with_limits(payload, &Limits::default())
    }

    /// Creates a reader enforcing `limits`.
    #[must_use]
    pub const fn with_limits(payload: &'a [u8], limits: &Limits) -> Self {
        Self {
            buf: payload,
            pos: 0,
            max_string_chars: limits.max_string_chars,
        }
    }

    /// Current offset into the payload.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns `true` if any bytes are left.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.pos < self.buf.len()
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&self) -> WireResult<u8> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.eof(1))
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> WireResult<u8> {
        Ok(self.take::<1>()?[0])
    }

    /// Reads a little-endian `i16`.
    pub fn read_i16(&mut self) -> WireResult<i16> {
        self.take().map(i16::from_le_bytes)
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> WireResult<u16> {
        self.take().map(u16::from_le_bytes)
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> WireResult<i32> {
        self.take().map(i32::from_le_bytes)
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> WireResult<u32> {
        self.take().map(u32::from_le_bytes)
    }

    /// Reads an IEEE-754 `f32` from its raw little-endian bits.
    pub fn read_f32(&mut self) -> WireResult<f32> {
        self.read_u32().map(f32::from_bits)
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> WireResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(self.eof(len));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads the rest of the payload.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        rest
    }

    /// Reads an object record's presence bit field.
    pub fn read_bit_field<F: Flag>(&mut self, schema: FlagSchema<F>) -> WireResult<BitField<F>> {
        let bytes = self.read_bytes(schema.byte_len())?;
        Ok(BitField::read_from(schema, bytes)?)
    }

    /// Reads a length-prefixed UTF-16LE string.
    ///
    /// The prefix counts UTF-16 units including the trailing null. Units after
    /// the first null inside the counted run are skipped.
    pub fn read_string(&mut self) -> WireResult<String> {
        let offset = self.pos;
        let count = self.read_i32()?;
        let count = usize::try_from(count)
            .ok()
            .filter(|count| *count > 0)
            .ok_or(DecodeError::InvalidString {
                offset,
                reason: "length prefix must count the terminator",
            })?;

        let chars = count - 1;
        if chars > self.max_string_chars {
            return Err(DecodeError::LimitsExceeded {
                kind: LimitKind::StringChars,
                limit: self.max_string_chars,
                actual: chars,
            });
        }

        let raw = self.read_bytes(count.saturating_mul(2))?;
        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let end = units
            .iter()
            .position(|unit| *unit == 0)
            .ok_or(DecodeError::InvalidString {
                offset,
                reason: "missing null terminator",
            })?;

        String::from_utf16(&units[..end]).map_err(|_| DecodeError::InvalidString {
            offset,
            reason: "invalid UTF-16",
        })
    }

    fn take<const N: usize>(&mut self) -> WireResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    const fn eof(&self, requested: usize) -> DecodeError {
        DecodeError::UnexpectedEof {
            offset: self.pos,
            requested,
            available: self.buf.len() - self.pos,
        }
    }
}
