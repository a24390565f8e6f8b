//! The closed set of typed packets, plus the opaque passthrough.

use bytes::Bytes;
use wire::{encode_frame, ConnectionType, PacketWriter, WriterResult};

use crate::client::{EngSetCoolantPacket, ShipAction};
use crate::error::CodecResult;
use crate::object::ObjectUpdatePacket;
use crate::server::{
    DestroyObjectPacket, GameStartPacket, IncomingAudioPacket, JumpStatusPacket, VersionPacket,
};

/// Every packet this crate understands.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Packet {
    Version(VersionPacket),
    GameStart(GameStartPacket),
    JumpStatus(JumpStatusPacket),
    IncomingAudio(IncomingAudioPacket),
    ObjectUpdate(ObjectUpdatePacket),
    DestroyObject(DestroyObjectPacket),
    ShipAction(ShipAction),
    EngSetCoolant(EngSetCoolantPacket),
}

impl Packet {
    /// Who sends this packet.
    #[must_use]
    pub const fn connection_type(&self) -> ConnectionType {
        match self {
            Self::ShipAction(_) | Self::EngSetCoolant(_) => ConnectionType::Client,
            _ => ConnectionType::Server,
        }
    }

    #[must_use]
    pub const fn packet_type(&self) -> u32 {
        match self {
            Self::Version(_) => VersionPacket::PACKET_TYPE,
            Self::GameStart(_) => GameStartPacket::PACKET_TYPE,
            Self::JumpStatus(_) => JumpStatusPacket::PACKET_TYPE,
            Self::IncomingAudio(_) => IncomingAudioPacket::PACKET_TYPE,
            Self::ObjectUpdate(_) => ObjectUpdatePacket::PACKET_TYPE,
            Self::DestroyObject(_) => DestroyObjectPacket::PACKET_TYPE,
            Self::ShipAction(_) => ShipAction::PACKET_TYPE,
            Self::EngSetCoolant(_) => EngSetCoolantPacket::PACKET_TYPE,
        }
    }

    /// Short name for logs and CLI output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Version(_) => "version",
            Self::GameStart(_) => "game_start",
            Self::JumpStatus(_) => "jump_status",
            Self::IncomingAudio(_) => "incoming_audio",
            Self::ObjectUpdate(_) => "object_update",
            Self::DestroyObject(_) => "destroy_object",
            Self::ShipAction(_) => "ship_action",
            Self::EngSetCoolant(_) => "eng_set_coolant",
        }
    }

    /// Starts a packet on `writer` and writes the payload, leaving the
    /// writer open for [`PacketWriter::flush`].
    pub fn write_to(&self, writer: &mut PacketWriter) -> WriterResult<()> {
        writer.start(self.connection_type(), self.packet_type());
        match self {
            Self::Version(packet) => packet.write_payload(writer),
            Self::GameStart(packet) => packet.write_payload(writer),
            Self::JumpStatus(packet) => packet.write_payload(writer),
            Self::IncomingAudio(packet) => packet.write_payload(writer),
            Self::ObjectUpdate(packet) => packet.write_payload(writer),
            Self::DestroyObject(packet) => packet.write_payload(writer),
            Self::ShipAction(packet) => packet.write_payload(writer),
            Self::EngSetCoolant(packet) => packet.write_payload(writer),
        }
    }

    /// Encodes the complete frame.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        let mut writer = PacketWriter::new();
        self.write_to(&mut writer)?;
        Ok(writer.flush()?)
    }
}

macro_rules! impl_from_packet {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Packet {
                fn from(packet: $ty) -> Self {
                    Self::$variant(packet)
                }
            }
        )*
    };
}

impl_from_packet!(
    Version(VersionPacket),
    GameStart(GameStartPacket),
    JumpStatus(JumpStatusPacket),
    IncomingAudio(IncomingAudioPacket),
    ObjectUpdate(ObjectUpdatePacket),
    DestroyObject(DestroyObjectPacket),
    ShipAction(ShipAction),
    EngSetCoolant(EngSetCoolantPacket),
);

/// A well-framed packet no binding claimed. The payload is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnknownPacket {
    pub connection_type: ConnectionType,
    pub packet_type: u32,
    pub payload: Bytes,
}

impl UnknownPacket {
    /// Re-encodes the frame; identical to the bytes it was read from.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        Ok(encode_frame(
            self.connection_type,
            self.packet_type,
            &self.payload,
        )?)
    }
}

/// Outcome of dispatching one frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dispatched {
    Packet(Packet),
    Unknown(UnknownPacket),
}

impl Dispatched {
    #[must_use]
    pub const fn packet_type(&self) -> u32 {
        match self {
            Self::Packet(packet) => packet.packet_type(),
            Self::Unknown(unknown) => unknown.packet_type,
        }
    }

    #[must_use]
    pub const fn packet(&self) -> Option<&Packet> {
        match self {
            Self::Packet(packet) => Some(packet),
            Self::Unknown(_) => None,
        }
    }

    /// Encodes the frame again.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        match self {
            Self::Packet(packet) => packet.encode(),
            Self::Unknown(unknown) => unknown.encode(),
        }
    }
}
