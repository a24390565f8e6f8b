//! Capture inspection and decoding tools for the Artemis protocol.
//!
//! A capture is the raw byte stream of one connection: frames back to back,
//! in either direction. This crate provides utilities for looking inside one:
//!
//! - List frame preambles and sizes
//! - Decode every frame through the core protocol
//! - Replay object updates into a world table
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.
//! - **Keep going** - A bad payload is reported and the walk continues with the
//!   next frame; only broken framing stops it.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use codec::{CodecError, CoreProtocol, Dispatched, Registry, Session};
use serde::Serialize;
use wire::{ConnectionType, FrameHeader, Limits, Version};
use world::GameObject;

/// One frame's preamble and where it sits in the capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    pub offset: usize,
    pub connection_type: ConnectionType,
    pub packet_type: u32,
    pub payload_len: u32,
}

/// Preambles of a capture, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub frames: Vec<FrameSummary>,
    /// Bytes after the last complete frame.
    pub trailing_bytes: usize,
    /// Why the walk stopped early, if it did.
    pub error: Option<String>,
}

impl InspectReport {
    #[must_use]
    pub fn total_payload_bytes(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.payload_len)).sum()
    }
}

/// Walks the preambles of a capture without decoding payloads.
#[must_use]
pub fn inspect_capture(bytes: &[u8], limits: &Limits) -> InspectReport {
    let mut report = InspectReport::default();
    let mut offset = 0;
    while offset < bytes.len() {
        let rest = &bytes[offset..];
        let header = match FrameHeader::decode(rest) {
            Ok(header) => header,
            Err(_) if rest.len() < wire::HEADER_SIZE => break,
            Err(err) => {
                report.error = Some(format!("offset {offset}: {err}"));
                break;
            }
        };
        if header.frame_len() > limits.max_packet_bytes {
            report.error = Some(format!(
                "offset {offset}: frame of {} bytes exceeds limit {}",
                header.frame_len(),
                limits.max_packet_bytes
            ));
            break;
        }
        if rest.len() < header.frame_len() {
            break;
        }
        report.frames.push(FrameSummary {
            offset,
            connection_type: header.connection_type,
            packet_type: header.packet_type,
            payload_len: header.payload_len,
        });
        offset += header.frame_len();
    }
    report.trailing_bytes = if report.error.is_some() {
        0
    } else {
        bytes.len() - offset
    };
    report
}

/// What dispatch made of one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DecodedFrame {
    Decoded { index: usize, dispatched: Dispatched },
    Failed { index: usize, error: String },
}

/// Every frame of a capture, decoded, plus the version the server announced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeReport {
    pub version: Option<Version>,
    pub frames: Vec<DecodedFrame>,
    /// Broken framing that ended the capture after `frames`.
    pub framing_error: Option<String>,
}

impl DecodeReport {
    #[must_use]
    pub fn failures(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| matches!(f, DecodedFrame::Failed { .. }))
            .count()
    }
}

/// A session over the core protocol.
pub fn core_session(version: Option<Version>) -> Result<Session> {
    let registry = Registry::with_protocol(&CoreProtocol).context("register core protocol")?;
    let mut session = Session::new(Arc::new(registry));
    if let Some(version) = version {
        session.dispatcher_mut().set_version(version);
    }
    Ok(session)
}

/// Decodes every frame of a capture and replays it into a session.
///
/// Payload failures are recorded per frame. A framing failure ends the
/// capture; the frames ahead of it are kept and the failure is recorded in
/// [`DecodeReport::framing_error`].
pub fn decode_capture(bytes: &[u8], session: &mut Session) -> DecodeReport {
    let mut frames = Vec::new();
    let mut framing_error = None;
    for (index, result) in session.push(bytes).into_iter().enumerate() {
        match result {
            Ok(dispatched) => frames.push(DecodedFrame::Decoded { index, dispatched }),
            Err(CodecError::Frame(err)) => {
                framing_error = Some(format!("framing broke after {index} frames: {err}"));
            }
            Err(err) => frames.push(DecodedFrame::Failed {
                index,
                error: err.to_string(),
            }),
        }
    }
    let report = DecodeReport {
        version: session.version().cloned(),
        frames,
        framing_error,
    };
    tracing::debug!(
        frames = report.frames.len(),
        failures = report.failures(),
        framing_ok = report.framing_error.is_none(),
        "decoded capture"
    );
    report
}

/// Decodes a capture and returns the merged world.
pub fn world_from_capture(bytes: &[u8], version: Option<Version>) -> Result<Vec<GameObject>> {
    let mut session = core_session(version)?;
    let report = decode_capture(bytes, &mut session);
    if let Some(error) = &report.framing_error {
        tracing::warn!(%error, "world built from a truncated capture");
    }
    Ok(session.world().snapshot())
}

/// One line per frame.
#[must_use]
pub fn format_decode_pretty(report: &DecodeReport) -> String {
    let mut out = String::new();
    match &report.version {
        Some(version) => {
            let _ = writeln!(out, "server version: {version}");
        }
        None => out.push_str("server version: unknown\n"),
    }
    for frame in &report.frames {
        let _ = match frame {
            DecodedFrame::Decoded {
                index,
                dispatched: Dispatched::Packet(packet),
            } => writeln!(
                out,
                "#{index:<4} {:<6} {:<16} {packet:?}",
                packet.connection_type(),
                packet.name()
            ),
            DecodedFrame::Decoded {
                index,
                dispatched: Dispatched::Unknown(unknown),
            } => writeln!(
                out,
                "#{index:<4} {:<6} unknown 0x{:08x} ({} bytes)",
                unknown.connection_type,
                unknown.packet_type,
                unknown.payload.len()
            ),
            DecodedFrame::Failed { index, error } => writeln!(out, "#{index:<4} error: {error}"),
        };
    }
    if let Some(error) = &report.framing_error {
        let _ = writeln!(out, "stopped: {error}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::{ObjectLayout, ObjectUpdatePacket, Packet, ShipAction, VersionPacket};
    use world::{Mine, ObjectId};

    fn capture() -> Vec<u8> {
        let mut bytes = Packet::from(VersionPacket::new(Version::new([2, 1, 0])))
            .encode()
            .unwrap();
        bytes.extend(
            Packet::from(
                ObjectUpdatePacket::new(ObjectLayout::Modern).with(Mine {
                    x: Some(5.0),
                    ..Mine::new(ObjectId(1))
                }),
            )
            .encode()
            .unwrap(),
        );
        bytes.extend(Packet::from(ShipAction::Ready).encode().unwrap());
        bytes
    }

    #[test]
    fn inspect_lists_frames() {
        let bytes = capture();
        let report = inspect_capture(&bytes, &Limits::default());
        assert_eq!(report.frames.len(), 3);
        assert_eq!(report.frames[0].offset, 0);
        assert_eq!(report.frames[2].connection_type, ConnectionType::Client);
        assert_eq!(report.trailing_bytes, 0);
        assert!(report.error.is_none());
    }

    #[test]
    fn inspect_reports_partial_tail() {
        let mut bytes = capture();
        bytes.extend_from_slice(&[0xef, 0xbe]);
        let report = inspect_capture(&bytes, &Limits::default());
        assert_eq!(report.frames.len(), 3);
        assert_eq!(report.trailing_bytes, 2);
    }

    #[test]
    fn inspect_stops_at_bad_magic() {
        let mut bytes = vec![0u8; 24];
        bytes.extend(capture());
        let report = inspect_capture(&bytes, &Limits::default());
        assert!(report.frames.is_empty());
        assert!(report.error.unwrap().contains("offset 0"));
    }

    #[test]
    fn decode_and_world() {
        let bytes = capture();
        let mut session = core_session(None).unwrap();
        let report = decode_capture(&bytes, &mut session);
        assert_eq!(report.frames.len(), 3);
        assert!(report.framing_error.is_none());
        assert_eq!(report.failures(), 0);
        assert_eq!(report.version, Some(Version::new([2, 1])));

        let pretty = format_decode_pretty(&report);
        assert!(pretty.contains("server version: 2.1.0"), "{pretty}");
        assert!(pretty.contains("object_update"), "{pretty}");

        let world = world_from_capture(&bytes, None).unwrap();
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn decode_keeps_frames_ahead_of_broken_framing() {
        let mut bytes = capture();
        bytes.extend_from_slice(&[0u8; 24]);
        let mut session = core_session(None).unwrap();
        let report = decode_capture(&bytes, &mut session);
        assert_eq!(report.frames.len(), 3);
        assert_eq!(report.failures(), 0);
        assert_eq!(report.version, Some(Version::new([2, 1])));
        assert!(report.framing_error.unwrap().contains("after 3 frames"));

        let world = world_from_capture(&bytes, None).unwrap();
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn report_serializes_to_json() {
        let mut session = core_session(None).unwrap();
        let report = decode_capture(&capture(), &mut session);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["frames"][0]["outcome"], "decoded");
    }
}
