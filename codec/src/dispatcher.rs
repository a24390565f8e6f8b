//! Frame dispatch.

use std::sync::Arc;

use bytes::Bytes;
use wire::{DecodeError, Frame, FrameHeader, Limits, Version, HEADER_SIZE};

use crate::error::{CodecError, CodecResult};
use crate::limits::CodecLimits;
use crate::packet::{Dispatched, Packet, UnknownPacket};
use crate::registry::{Registry, Resolution};

/// Turns frames into packets for one connection.
///
/// The dispatcher remembers the server version once a version packet has
/// been decoded and uses it to pick between version-gated bindings. Until
/// then a packet whose only bindings are gated fails with
/// [`CodecError::VersionUnknown`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    version: Option<Version>,
    wire_limits: Limits,
    limits: CodecLimits,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_limits(registry, Limits::default(), CodecLimits::default())
    }

    #[must_use]
    pub fn with_limits(registry: Arc<Registry>, wire_limits: Limits, limits: CodecLimits) -> Self {
        Self {
            registry,
            version: None,
            wire_limits,
            limits,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The server version, once known.
    #[must_use]
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Sets the version without waiting for a version packet.
    pub fn set_version(&mut self, version: Version) {
        tracing::debug!(%version, "server version set");
        self.version = Some(version);
    }

    /// Forgets the version.
    pub fn reset(&mut self) {
        self.version = None;
    }

    #[must_use]
    pub const fn wire_limits(&self) -> &Limits {
        &self.wire_limits
    }

    /// Dispatches one complete frame given as raw bytes.
    ///
    /// Bytes past the end of the frame are ignored; use a
    /// [`wire::FrameBuffer`] to split a stream.
    pub fn dispatch_bytes(&mut self, bytes: &[u8]) -> CodecResult<Dispatched> {
        let header = FrameHeader::decode(bytes)?;
        let payload = bytes
            .get(HEADER_SIZE..header.frame_len())
            .ok_or(DecodeError::UnexpectedEof {
                offset: HEADER_SIZE,
                requested: header.payload_len as usize,
                available: bytes.len().saturating_sub(HEADER_SIZE),
            })?;
        if bytes.len() > header.frame_len() {
            tracing::debug!(
                trailing = bytes.len() - header.frame_len(),
                "ignoring bytes after frame"
            );
        }
        self.dispatch(&Frame::new(header, Bytes::copy_from_slice(payload)))
    }

    /// Decodes a frame with the binding the registry picks for it.
    pub fn dispatch(&mut self, frame: &Frame) -> CodecResult<Dispatched> {
        let FrameHeader {
            connection_type,
            packet_type,
            ..
        } = frame.header;
        let subtype = leading_subtype(&frame.payload);

        let binding = match self.registry.resolve(
            connection_type,
            packet_type,
            subtype,
            self.version.as_ref(),
        ) {
            Resolution::Bound(binding) => binding,
            Resolution::NeedsVersion => {
                tracing::warn!(
                    packet_type = format_args!("{packet_type:#010x}"),
                    ?subtype,
                    "version-gated packet before version packet"
                );
                return Err(CodecError::VersionUnknown {
                    packet_type,
                    subtype,
                });
            }
            Resolution::Unbound => {
                tracing::warn!(
                    %connection_type,
                    packet_type = format_args!("{packet_type:#010x}"),
                    len = frame.payload.len(),
                    "unknown packet"
                );
                return Ok(Dispatched::Unknown(UnknownPacket {
                    connection_type,
                    packet_type,
                    payload: frame.payload.clone(),
                }));
            }
        };

        let mut reader = frame.reader(&self.wire_limits);
        let packet = (binding.decode)(&mut reader, &self.limits).map_err(|reason| {
            CodecError::Malformed {
                connection_type,
                packet_type,
                subtype: binding.subtype,
                offset: reason.offset().unwrap_or_else(|| reader.position()),
                reason,
            }
        })?;
        if reader.has_more() {
            tracing::trace!(
                name = binding.name,
                trailing = reader.remaining(),
                "ignoring trailing payload bytes"
            );
        }
        tracing::debug!(name = binding.name, "dispatched");

        if let Packet::Version(announced) = &packet {
            if self.version.as_ref().is_some_and(|known| *known != announced.version) {
                tracing::warn!(version = %announced.version, "server version changed mid-session");
            }
            tracing::debug!(version = %announced.version, "captured server version");
            self.version = Some(announced.version.clone());
        }
        Ok(Dispatched::Packet(packet))
    }
}

/// The subtype key of a payload whose leading int is a subtype.
///
/// Subtypes are little-endian ints; only values that fit in the low byte can
/// name a subtype binding. A payload shorter than the int still offers its
/// first byte so the bound decoder reports the truncation.
fn leading_subtype(payload: &[u8]) -> Option<u8> {
    match payload {
        [low, high @ ..] if high.iter().take(3).all(|byte| *byte == 0) => Some(*low),
        _ => None,
    }
}
