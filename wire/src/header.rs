//! Frame preamble types and constants.

use crate::error::{DecodeError, WireResult, WriterError, WriterResult};

/// Magic number opening every frame.
///
/// This value is fixed and must never change across versions.
pub const MAGIC: u32 = 0xDEAD_BEEF;

/// Preamble size in bytes (24 total).
pub const HEADER_SIZE: usize = 4 + 4 + 4 + 4 + 4 + 4;

/// Bytes counted by the `remaining` field that precede the payload.
const REMAINING_OVERHEAD: u32 = 4;

/// Which side of the connection sent a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionType {
    /// Server to client.
    Server,
    /// Client to server.
    Client,
}

impl ConnectionType {
    /// Parses the preamble's connection type field.
    pub fn from_raw(raw: u32) -> WireResult<Self> {
        match raw {
            1 => Ok(Self::Server),
            2 => Ok(Self::Client),
            found => Err(DecodeError::InvalidConnectionType { found }),
        }
    }

    /// The value written to the preamble.
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Server => 1,
            Self::Client => 2,
        }
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Server => "server",
            Self::Client => "client",
        })
    }
}

/// Decoded frame preamble.
///
/// The magic and the two redundant length fields are validated during
/// decoding and are not stored; only the payload length is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameHeader {
    /// Sender of the frame.
    pub connection_type: ConnectionType,
    /// 32-bit packet type tag.
    pub packet_type: u32,
    /// Payload length in bytes.
    pub payload_len: u32,
}

impl FrameHeader {
    /// Total frame length (preamble plus payload).
    #[must_use]
    pub const fn frame_len(&self) -> usize {
        HEADER_SIZE + self.payload_len as usize
    }

    /// Decodes a preamble from the first [`HEADER_SIZE`] bytes of `buf`.
    pub fn decode(buf: &[u8]) -> WireResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(DecodeError::UnexpectedEof {
                offset: 0,
                requested: HEADER_SIZE,
                available: buf.len(),
            });
        }

        let magic = read_u32_le(buf, 0);
        if magic != MAGIC {
            return Err(DecodeError::InvalidMagic { found: magic });
        }

        let total = read_u32_le(buf, 4);
        let connection_type = ConnectionType::from_raw(read_u32_le(buf, 8))?;
        // Offset 12 is padding; servers have always sent zero but it is not checked.
        let remaining = read_u32_le(buf, 16);
        let packet_type = read_u32_le(buf, 20);

        let header_len = HEADER_SIZE as u32;
        if total < header_len || remaining != total - header_len + REMAINING_OVERHEAD {
            return Err(DecodeError::InvalidLength { total, remaining });
        }

        Ok(Self {
            connection_type,
            packet_type,
            payload_len: total - header_len,
        })
    }

    /// Appends the 24-byte preamble to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let header_len = HEADER_SIZE as u32;
        out.reserve(HEADER_SIZE);
        out.extend_from_slice(&MAGIC.to_le_bytes());
        out.extend_from_slice(&(self.payload_len + header_len).to_le_bytes());
        out.extend_from_slice(&self.connection_type.raw().to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(self.payload_len + REMAINING_OVERHEAD).to_le_bytes());
        out.extend_from_slice(&self.packet_type.to_le_bytes());
    }
}

/// Builds a complete frame (preamble plus payload).
pub fn encode_frame(
    connection_type: ConnectionType,
    packet_type: u32,
    payload: &[u8],
) -> WriterResult<Vec<u8>> {
    let payload_len = u32::try_from(payload.len())
        .ok()
        .filter(|len| len.checked_add(HEADER_SIZE as u32).is_some())
        .ok_or(WriterError::PayloadTooLarge { len: payload.len() })?;

    let header = FrameHeader {
        connection_type,
        packet_type,
        payload_len,
    };
    let mut out = Vec::with_capacity(header.frame_len());
    header.encode_into(&mut out);
    out.extend_from_slice(payload);
    Ok(out)
}

fn read_u32_le(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}
