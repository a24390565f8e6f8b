//! Client-to-server packets.

use wire::{PacketReader, PacketWriter, WriterResult};

use crate::error::MalformedReason;
use crate::limits::CodecLimits;
use crate::packet::Packet;
use crate::server::expect_subtype;

/// Beam frequency, A to E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BeamFrequency {
    A,
    B,
    C,
    D,
    E,
}

impl BeamFrequency {
    pub const ALL: [Self; 5] = [Self::A, Self::B, Self::C, Self::D, Self::E];

    #[must_use]
    pub const fn ordinal(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_ordinal(value: i32) -> Option<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

/// Ship systems that engineering can allocate energy and coolant to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShipSystem {
    Beams,
    Torpedoes,
    Sensors,
    Maneuvering,
    Impulse,
    WarpJump,
    ForeShields,
    AftShields,
}

impl ShipSystem {
    pub const ALL: [Self; 8] = [
        Self::Beams,
        Self::Torpedoes,
        Self::Sensors,
        Self::Maneuvering,
        Self::Impulse,
        Self::WarpJump,
        Self::ForeShields,
        Self::AftShields,
    ];

    #[must_use]
    pub const fn ordinal(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_ordinal(value: i32) -> Option<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

/// A ship action: one packet type, told apart by a leading subtype int
/// followed by a single int argument.
///
/// Subtypes without a typed variant decode as [`ShipAction::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShipAction {
    SetBeamFreq(BeamFrequency),
    RequestDock,
    Ready,
    Other { subtype: i32, arg: i32 },
}

impl ShipAction {
    pub const PACKET_TYPE: u32 = 0x4c82_1d3c;

    pub const SET_BEAM_FREQ: u8 = 0x0b;
    pub const REQUEST_DOCK: u8 = 0x07;
    pub const READY: u8 = 0x0f;

    /// The leading subtype int.
    #[must_use]
    pub const fn subtype(&self) -> i32 {
        match self {
            Self::SetBeamFreq(_) => Self::SET_BEAM_FREQ as i32,
            Self::RequestDock => Self::REQUEST_DOCK as i32,
            Self::Ready => Self::READY as i32,
            Self::Other { subtype, .. } => *subtype,
        }
    }

    /// The argument int.
    #[must_use]
    pub const fn arg(&self) -> i32 {
        match self {
            Self::SetBeamFreq(freq) => freq.ordinal(),
            Self::RequestDock | Self::Ready => 0,
            Self::Other { arg, .. } => *arg,
        }
    }

    pub(crate) fn write_payload(&self, writer: &mut PacketWriter) -> WriterResult<()> {
        writer.write_i32(self.subtype())?.write_i32(self.arg())?;
        Ok(())
    }
}

pub(crate) fn decode_set_beam_freq(
    reader: &mut PacketReader<'_>,
    _limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    expect_subtype(reader, &[ShipAction::SET_BEAM_FREQ as i32])?;
    let value = reader.read_i32()?;
    let freq = BeamFrequency::from_ordinal(value).ok_or(MalformedReason::InvalidEnum {
        field: "beam frequency",
        value,
    })?;
    Ok(Packet::ShipAction(ShipAction::SetBeamFreq(freq)))
}

pub(crate) fn decode_request_dock(
    reader: &mut PacketReader<'_>,
    _limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    expect_subtype(reader, &[ShipAction::REQUEST_DOCK as i32])?;
    reader.read_i32()?;
    Ok(Packet::ShipAction(ShipAction::RequestDock))
}

pub(crate) fn decode_ready(
    reader: &mut PacketReader<'_>,
    _limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    expect_subtype(reader, &[ShipAction::READY as i32])?;
    reader.read_i32()?;
    Ok(Packet::ShipAction(ShipAction::Ready))
}

/// Fallback for subtypes with no dedicated binding.
pub(crate) fn decode_ship_action(
    reader: &mut PacketReader<'_>,
    _limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    let subtype = reader.read_i32()?;
    let arg = reader.read_i32()?;
    Ok(Packet::ShipAction(ShipAction::Other { subtype, arg }))
}

/// Engineering sets the coolant level of one system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngSetCoolantPacket {
    pub system: ShipSystem,
    pub value: i32,
}

impl EngSetCoolantPacket {
    pub const PACKET_TYPE: u32 = 0x69cc_01d9;
    const SUBTYPE: i32 = 0x00;

    pub(crate) fn write_payload(&self, writer: &mut PacketWriter) -> WriterResult<()> {
        writer
            .write_i32(Self::SUBTYPE)?
            .write_i32(self.system.ordinal())?
            .write_i32(self.value)?;
        Ok(())
    }
}

pub(crate) fn decode_eng_set_coolant(
    reader: &mut PacketReader<'_>,
    _limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    expect_subtype(reader, &[EngSetCoolantPacket::SUBTYPE])?;
    let raw = reader.read_i32()?;
    let system = ShipSystem::from_ordinal(raw).ok_or(MalformedReason::InvalidEnum {
        field: "ship system",
        value: raw,
    })?;
    let value = reader.read_i32()?;
    Ok(Packet::EngSetCoolant(EngSetCoolantPacket { system, value }))
}
