//! Error types for wire format operations.

use bitfield::BitFieldError;
use thiserror::Error;

/// Result type for wire decoding.
pub type WireResult<T> = Result<T, DecodeError>;

/// Result type for packet writing.
pub type WriterResult<T> = Result<T, WriterError>;

/// Result type for stream framing.
pub type FrameResult<T> = Result<T, FrameError>;

/// Malformed or truncated wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Preamble does not start with the protocol magic.
    #[error("invalid magic number: 0x{found:08X}")]
    InvalidMagic { found: u32 },

    /// Connection type field is neither server nor client.
    #[error("invalid connection type: {found}")]
    InvalidConnectionType { found: u32 },

    /// The two preamble length fields disagree or are too small.
    #[error("invalid frame length: total {total}, remaining {remaining}")]
    InvalidLength { total: u32, remaining: u32 },

    /// A configured limit was exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// A read ran past the end of the payload.
    #[error("unexpected end of payload at offset {offset}: need {requested} bytes, have {available}")]
    UnexpectedEof {
        offset: usize,
        requested: usize,
        available: usize,
    },

    /// A string field is not a valid terminated UTF-16 run.
    #[error("invalid string at offset {offset}: {reason}")]
    InvalidString { offset: usize, reason: &'static str },

    /// An object record's bit field could not be read.
    #[error("bit field: {0}")]
    BitField(#[from] BitFieldError),
}

impl DecodeError {
    /// Payload offset the error was detected at, when it has one.
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        match self {
            Self::UnexpectedEof { offset, .. } | Self::InvalidString { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    PacketBytes,
    StringChars,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PacketBytes => "packet bytes",
            Self::StringChars => "string chars",
        };
        write!(f, "{name}")
    }
}

/// Misuse of the packet writer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriterError {
    /// A payload write or flush happened with no packet open.
    #[error("{operation} requires start() first")]
    NotStarted { operation: &'static str },

    /// An object field named a flag its schema does not declare.
    #[error("object field: {0}")]
    BitField(#[from] BitFieldError),

    /// An object field was written at or before the last field written.
    #[error("object field {field} written after {after}; fields go in schema order")]
    FieldOutOfOrder {
        field: &'static str,
        after: &'static str,
    },

    /// A string is too long for its 32-bit length prefix.
    #[error("string of {chars} UTF-16 units does not fit a length prefix")]
    StringTooLong { chars: usize },

    /// A payload is too large for the 32-bit frame length fields.
    #[error("payload of {len} bytes does not fit the frame length fields")]
    PayloadTooLarge { len: usize },

    /// The output sink failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid protocol version construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VersionError {
    /// The legacy float encoding only covers versions before 2.1.
    #[error("legacy version encoding is not valid for {value} (2.1 and later use parts)")]
    LegacyOutOfRange { value: f32 },

    /// A legacy float that is negative or not finite.
    #[error("legacy version {value} is not a finite non-negative number")]
    LegacyNotFinite { value: f32 },
}

/// Failure while pulling frames off a byte stream.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The underlying reader failed.
    #[error("stream read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The stream carried a malformed preamble.
    #[error("malformed frame: {0}")]
    Decode(#[from] DecodeError),
}
