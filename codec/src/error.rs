//! Error types for codec operations.

use thiserror::Error;
use wire::{ConnectionType, DecodeError, VersionError, WriterError};
use world::WorldError;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type for registry construction.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors surfaced by dispatch, sessions and packet encoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// A bound decoder rejected the payload.
    #[error(
        "malformed {connection_type} packet 0x{packet_type:08x} (subtype {subtype:?}) at offset {offset}: {reason}"
    )]
    Malformed {
        connection_type: ConnectionType,
        packet_type: u32,
        subtype: Option<u8>,
        offset: usize,
        reason: MalformedReason,
    },

    /// Every candidate binding is version gated and no version is known yet.
    #[error("packet 0x{packet_type:08x} (subtype {subtype:?}) needs the server version, which is not known yet")]
    VersionUnknown {
        packet_type: u32,
        subtype: Option<u8>,
    },

    /// The byte stream is not valid framing.
    #[error("framing error: {0}")]
    Frame(#[from] DecodeError),

    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error(transparent)]
    World(#[from] WorldError),
}

impl CodecError {
    /// Returns `true` for payload-level failures that leave the stream usable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::VersionUnknown { .. })
    }
}

/// Why a decoder rejected a payload.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum MalformedReason {
    #[error(transparent)]
    Wire(#[from] DecodeError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("unexpected subtype {found} (expected one of {expected:?})")]
    UnexpectedSubtype {
        expected: &'static [i32],
        found: i32,
    },

    #[error("invalid {field}: {value}")]
    InvalidEnum { field: &'static str, value: i32 },

    #[error("unknown object kind tag {tag}")]
    UnknownObjectKind { tag: u8 },

    #[error("object update carries more than {limit} records")]
    TooManyObjects { limit: usize },

    #[error("object list terminator is {found:#010x}, expected zero")]
    InvalidTerminator { found: i32 },
}

impl MalformedReason {
    /// Byte offset reported by the underlying read, if any.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Wire(err) => err.offset(),
            _ => None,
        }
    }
}

/// Errors raised while building a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// Two bindings claim the same packet for overlapping versions.
    #[error(
        "{incoming} overlaps {existing} for {connection_type} packet 0x{packet_type:08x} (subtype {subtype:?})"
    )]
    Duplicate {
        connection_type: ConnectionType,
        packet_type: u32,
        subtype: Option<u8>,
        existing: &'static str,
        incoming: &'static str,
    },
}
