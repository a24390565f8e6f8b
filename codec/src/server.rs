//! Server-to-client packets.

use wire::{PacketReader, PacketWriter, Version, WriterResult};
use world::{ObjectId, ObjectKind};

use crate::error::MalformedReason;
use crate::limits::CodecLimits;
use crate::packet::Packet;

/// Announces the server's protocol version. Sent once, right after connect.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionPacket {
    pub unknown: i32,
    pub version: Version,
}

impl VersionPacket {
    pub const PACKET_TYPE: u32 = 0xe548_e74a;

    #[must_use]
    pub const fn new(version: Version) -> Self {
        Self {
            unknown: 0,
            version,
        }
    }

    pub(crate) fn write_payload(&self, writer: &mut PacketWriter) -> WriterResult<()> {
        writer.write_i32(self.unknown)?;
        self.version.write_to(writer)
    }
}

pub(crate) fn decode_version(
    reader: &mut PacketReader<'_>,
    _limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    let unknown = reader.read_i32()?;
    let legacy = reader.read_f32()?;
    let version = if reader.has_more() {
        Version::new([reader.read_u32()?, reader.read_u32()?, reader.read_u32()?])
    } else {
        Version::from_legacy(legacy)?
    };
    Ok(Packet::Version(VersionPacket { unknown, version }))
}

/// Shared type of the game start and jump status packets; the leading int
/// tells them apart.
pub const GAME_MESSAGE_TYPE: u32 = 0xf754_c8fe;

/// Sent when a game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameStartPacket {
    pub unknown: i32,
}

impl GameStartPacket {
    pub const PACKET_TYPE: u32 = GAME_MESSAGE_TYPE;
    pub const SUBTYPE: u8 = 0x08;

    pub(crate) fn write_payload(&self, writer: &mut PacketWriter) -> WriterResult<()> {
        writer
            .write_i32(i32::from(Self::SUBTYPE))?
            .write_i32(self.unknown)?;
        Ok(())
    }
}

pub(crate) fn decode_game_start(
    reader: &mut PacketReader<'_>,
    _limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    expect_subtype(reader, &[GameStartPacket::SUBTYPE as i32])?;
    let unknown = reader.read_i32()?;
    Ok(Packet::GameStart(GameStartPacket { unknown }))
}

/// Which edge of a jump a [`JumpStatusPacket`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JumpPhase {
    /// The jump countdown has started.
    Begin,
    /// The ship has arrived.
    End,
}

impl JumpPhase {
    #[must_use]
    pub const fn subtype(self) -> u8 {
        match self {
            Self::Begin => 0x0c,
            Self::End => 0x0d,
        }
    }
}

/// Start or end of a jump drive transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JumpStatusPacket {
    pub phase: JumpPhase,
}

impl JumpStatusPacket {
    pub const PACKET_TYPE: u32 = GAME_MESSAGE_TYPE;

    pub(crate) fn write_payload(&self, writer: &mut PacketWriter) -> WriterResult<()> {
        writer.write_i32(i32::from(self.phase.subtype()))?;
        Ok(())
    }
}

pub(crate) fn decode_jump_status(
    reader: &mut PacketReader<'_>,
    _limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    const BEGIN: i32 = JumpPhase::Begin.subtype() as i32;
    const END: i32 = JumpPhase::End.subtype() as i32;
    let phase = match expect_subtype(reader, &[BEGIN, END])? {
        BEGIN => JumpPhase::Begin,
        _ => JumpPhase::End,
    };
    Ok(Packet::JumpStatus(JumpStatusPacket { phase }))
}

/// State of a comms audio message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AudioMode {
    /// The server is playing the message.
    Playing,
    /// The message is available to be played.
    Incoming { title: String, file: String },
}

impl AudioMode {
    const PLAYING: i32 = 1;
    const INCOMING: i32 = 2;

    const fn raw(&self) -> i32 {
        match self {
            Self::Playing => Self::PLAYING,
            Self::Incoming { .. } => Self::INCOMING,
        }
    }
}

/// A comms audio message was announced or started playing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncomingAudioPacket {
    pub id: i32,
    pub mode: AudioMode,
}

impl IncomingAudioPacket {
    pub const PACKET_TYPE: u32 = 0xae88_e058;

    pub(crate) fn write_payload(&self, writer: &mut PacketWriter) -> WriterResult<()> {
        writer.write_i32(self.id)?.write_i32(self.mode.raw())?;
        if let AudioMode::Incoming { title, file } = &self.mode {
            writer.write_string(title)?.write_string(file)?;
        }
        Ok(())
    }
}

pub(crate) fn decode_incoming_audio(
    reader: &mut PacketReader<'_>,
    _limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    let id = reader.read_i32()?;
    let mode = match reader.read_i32()? {
        AudioMode::PLAYING => AudioMode::Playing,
        AudioMode::INCOMING => AudioMode::Incoming {
            title: reader.read_string()?,
            file: reader.read_string()?,
        },
        value => {
            return Err(MalformedReason::InvalidEnum {
                field: "audio mode",
                value,
            })
        }
    };
    Ok(Packet::IncomingAudio(IncomingAudioPacket { id, mode }))
}

/// An object left the world.
///
/// The world table is append-only for the session, so sessions report this
/// packet without removing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DestroyObjectPacket {
    pub kind: ObjectKind,
    pub id: ObjectId,
}

impl DestroyObjectPacket {
    pub const PACKET_TYPE: u32 = 0xcc5a_3e30;

    pub(crate) fn write_payload(&self, writer: &mut PacketWriter) -> WriterResult<()> {
        writer.write_u8(self.kind.tag())?.write_i32(self.id.0)?;
        Ok(())
    }
}

pub(crate) fn decode_destroy_object(
    reader: &mut PacketReader<'_>,
    _limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    let tag = reader.read_u8()?;
    let kind = ObjectKind::from_tag(tag).ok_or(MalformedReason::UnknownObjectKind { tag })?;
    let id = ObjectId(reader.read_i32()?);
    Ok(Packet::DestroyObject(DestroyObjectPacket { kind, id }))
}

/// Reads the leading subtype int and checks it against `expected`.
pub(crate) fn expect_subtype(
    reader: &mut PacketReader<'_>,
    expected: &'static [i32],
) -> Result<i32, MalformedReason> {
    let found = reader.read_i32()?;
    if expected.contains(&found) {
        Ok(found)
    } else {
        Err(MalformedReason::UnexpectedSubtype { expected, found })
    }
}
