//! Object update records.
//!
//! A record is a kind byte, the object id, the kind's bit field, then one
//! value per set bit in schema order. The packet holds records back to back
//! and ends with a zero int. Records carry no length, so an unknown kind tag
//! ends decoding.

use bitfield::{BitField, Flag, FlagSchema};
use wire::{PacketReader, PacketWriter, Version, WriterResult};
use world::{
    Anomaly, AnomalyFlag, Base, BaseFlag, BoolState, Entity, GameObject, Mine, MineFlag, NpcShip,
    NpcShipFlag, ObjectId, ObjectKind,
};

use crate::error::MalformedReason;
use crate::limits::CodecLimits;
use crate::packet::Packet;

/// Record layout in use, chosen by the server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectLayout {
    /// Before 2.1: NPC ships carry 24 fields.
    Legacy,
    /// From 2.1 on: NPC ships add nebula and scan level.
    Modern,
}

impl ObjectLayout {
    #[must_use]
    pub fn for_version(version: &Version) -> Self {
        if version.is_legacy() {
            Self::Legacy
        } else {
            Self::Modern
        }
    }

    #[must_use]
    pub const fn npc_ship_schema(self) -> FlagSchema<NpcShipFlag> {
        match self {
            Self::Legacy => NpcShipFlag::LEGACY_SCHEMA,
            Self::Modern => NpcShipFlag::MODERN_SCHEMA,
        }
    }
}

/// A batch of partial object views.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectUpdatePacket {
    pub layout: ObjectLayout,
    pub objects: Vec<GameObject>,
}

impl ObjectUpdatePacket {
    pub const PACKET_TYPE: u32 = 0x8080_3df9;

    #[must_use]
    pub const fn new(layout: ObjectLayout) -> Self {
        Self {
            layout,
            objects: Vec::new(),
        }
    }

    /// Appends an object view.
    #[must_use]
    pub fn with(mut self, object: impl Into<GameObject>) -> Self {
        self.objects.push(object.into());
        self
    }

    /// Writes every record and the terminator.
    ///
    /// Fields the layout has no flag for are left out.
    pub(crate) fn write_payload(&self, writer: &mut PacketWriter) -> WriterResult<()> {
        for object in &self.objects {
            write_object(writer, object, self.layout)?;
        }
        writer.write_i32(0)?;
        Ok(())
    }
}

pub(crate) fn decode_legacy_update(
    reader: &mut PacketReader<'_>,
    limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    decode_update(reader, limits, ObjectLayout::Legacy)
}

pub(crate) fn decode_modern_update(
    reader: &mut PacketReader<'_>,
    limits: &CodecLimits,
) -> Result<Packet, MalformedReason> {
    decode_update(reader, limits, ObjectLayout::Modern)
}

fn decode_update(
    reader: &mut PacketReader<'_>,
    limits: &CodecLimits,
    layout: ObjectLayout,
) -> Result<Packet, MalformedReason> {
    let mut objects = Vec::new();
    while reader.peek_u8()? != 0 {
        if objects.len() >= limits.max_objects_per_update {
            return Err(MalformedReason::TooManyObjects {
                limit: limits.max_objects_per_update,
            });
        }
        objects.push(read_object(reader, layout)?);
    }

    let found = reader.read_i32()?;
    if found != 0 {
        return Err(MalformedReason::InvalidTerminator { found });
    }
    tracing::trace!(count = objects.len(), ?layout, "decoded object update");
    Ok(Packet::ObjectUpdate(ObjectUpdatePacket { layout, objects }))
}

/// Reads one record.
pub fn read_object(
    reader: &mut PacketReader<'_>,
    layout: ObjectLayout,
) -> Result<GameObject, MalformedReason> {
    let tag = reader.read_u8()?;
    let kind = ObjectKind::from_tag(tag).ok_or(MalformedReason::UnknownObjectKind { tag })?;
    let id = ObjectId(reader.read_i32()?);
    let object = match kind {
        ObjectKind::NpcShip => read_npc_ship(reader, id, layout.npc_ship_schema())?.into(),
        ObjectKind::Base => read_base(reader, id)?.into(),
        ObjectKind::Mine => read_mine(reader, id)?.into(),
        ObjectKind::Anomaly => read_anomaly(reader, id)?.into(),
    };
    Ok(object)
}

/// Writes one record.
pub fn write_object(
    writer: &mut PacketWriter,
    object: &GameObject,
    layout: ObjectLayout,
) -> WriterResult<()> {
    match object {
        GameObject::NpcShip(ship) => write_npc_ship(writer, ship, layout.npc_ship_schema()),
        GameObject::Base(base) => write_base(writer, base),
        GameObject::Mine(mine) => write_mine(writer, mine),
        GameObject::Anomaly(anomaly) => write_anomaly(writer, anomaly),
    }
}

/// Reads the values a record's bit field announces.
struct Fields<'r, 'a, F: 'static> {
    reader: &'r mut PacketReader<'a>,
    bits: BitField<F>,
}

impl<'r, 'a, F: Flag> Fields<'r, 'a, F> {
    fn open(
        reader: &'r mut PacketReader<'a>,
        schema: FlagSchema<F>,
    ) -> Result<Self, MalformedReason> {
        let bits = reader.read_bit_field(schema)?;
        Ok(Self { reader, bits })
    }

    // Flags outside the schema are never on the wire.
    fn has(&self, flag: F) -> bool {
        matches!(self.bits.get(flag), Ok(true))
    }

    fn f32(&mut self, flag: F) -> Result<Option<f32>, MalformedReason> {
        if self.has(flag) {
            Ok(Some(self.reader.read_f32()?))
        } else {
            Ok(None)
        }
    }

    fn i32(&mut self, flag: F) -> Result<Option<i32>, MalformedReason> {
        if self.has(flag) {
            Ok(Some(self.reader.read_i32()?))
        } else {
            Ok(None)
        }
    }

    fn string(&mut self, flag: F) -> Result<Option<String>, MalformedReason> {
        if self.has(flag) {
            Ok(Some(self.reader.read_string()?))
        } else {
            Ok(None)
        }
    }

    fn bool(&mut self, flag: F, byte_count: usize) -> Result<BoolState, MalformedReason> {
        if self.has(flag) {
            let bytes = self.reader.read_bytes(byte_count)?;
            Ok(BoolState::from(bytes.first().is_some_and(|b| *b != 0)))
        } else {
            Ok(BoolState::Unknown)
        }
    }
}

fn read_npc_ship(
    reader: &mut PacketReader<'_>,
    id: ObjectId,
    schema: FlagSchema<NpcShipFlag>,
) -> Result<NpcShip, MalformedReason> {
    use NpcShipFlag as F;

    let mut fields = Fields::open(reader, schema)?;
    // Field initializers run in wire order.
    Ok(NpcShip {
        id,
        name: fields.string(F::Name)?,
        throttle: fields.f32(F::Throttle)?,
        rudder: fields.f32(F::Rudder)?,
        top_speed: fields.f32(F::TopSpeed)?,
        turn_rate: fields.f32(F::TurnRate)?,
        is_enemy: fields.bool(F::IsEnemy, 4)?,
        hull_id: fields.i32(F::HullId)?,
        x: fields.f32(F::X)?,
        y: fields.f32(F::Y)?,
        z: fields.f32(F::Z)?,
        pitch: fields.f32(F::Pitch)?,
        roll: fields.f32(F::Roll)?,
        heading: fields.f32(F::Heading)?,
        velocity: fields.f32(F::Velocity)?,
        surrendered: fields.bool(F::Surrendered, 1)?,
        shields_front: fields.f32(F::ShieldsFront)?,
        shields_front_max: fields.f32(F::ShieldsFrontMax)?,
        shields_rear: fields.f32(F::ShieldsRear)?,
        shields_rear_max: fields.f32(F::ShieldsRearMax)?,
        shield_freqs: [
            fields.f32(F::ShieldFreqA)?,
            fields.f32(F::ShieldFreqB)?,
            fields.f32(F::ShieldFreqC)?,
            fields.f32(F::ShieldFreqD)?,
            fields.f32(F::ShieldFreqE)?,
        ],
        in_nebula: fields.bool(F::InNebula, 2)?,
        scan_level: fields.i32(F::ScanLevel)?,
    })
}

fn write_npc_ship(
    writer: &mut PacketWriter,
    ship: &NpcShip,
    schema: FlagSchema<NpcShipFlag>,
) -> WriterResult<()> {
    use NpcShipFlag as F;

    let mut record = writer.start_object(NpcShip::KIND.tag(), ship.id.0, schema)?;
    record
        .write_string(F::Name, ship.name.as_deref())?
        .write_opt_f32(F::Throttle, ship.throttle)?
        .write_opt_f32(F::Rudder, ship.rudder)?
        .write_opt_f32(F::TopSpeed, ship.top_speed)?
        .write_opt_f32(F::TurnRate, ship.turn_rate)?
        .write_bool(F::IsEnemy, ship.is_enemy.known(), 4)?
        .write_opt_i32(F::HullId, ship.hull_id)?
        .write_opt_f32(F::X, ship.x)?
        .write_opt_f32(F::Y, ship.y)?
        .write_opt_f32(F::Z, ship.z)?
        .write_opt_f32(F::Pitch, ship.pitch)?
        .write_opt_f32(F::Roll, ship.roll)?
        .write_opt_f32(F::Heading, ship.heading)?
        .write_opt_f32(F::Velocity, ship.velocity)?
        .write_bool(F::Surrendered, ship.surrendered.known(), 1)?
        .write_opt_f32(F::ShieldsFront, ship.shields_front)?
        .write_opt_f32(F::ShieldsFrontMax, ship.shields_front_max)?
        .write_opt_f32(F::ShieldsRear, ship.shields_rear)?
        .write_opt_f32(F::ShieldsRearMax, ship.shields_rear_max)?;
    for (flag, value) in F::SHIELD_FREQS.into_iter().zip(ship.shield_freqs) {
        record.write_opt_f32(flag, value)?;
    }
    if schema.contains(F::InNebula) {
        record
            .write_bool(F::InNebula, ship.in_nebula.known(), 2)?
            .write_opt_i32(F::ScanLevel, ship.scan_level)?;
    }
    record.end();
    Ok(())
}

fn read_base(reader: &mut PacketReader<'_>, id: ObjectId) -> Result<Base, MalformedReason> {
    let mut fields = Fields::open(reader, BaseFlag::SCHEMA)?;
    Ok(Base {
        id,
        name: fields.string(BaseFlag::Name)?,
        shields_front: fields.f32(BaseFlag::ShieldsFront)?,
        shields_rear: fields.f32(BaseFlag::ShieldsRear)?,
        index: fields.i32(BaseFlag::Index)?,
        hull_id: fields.i32(BaseFlag::HullId)?,
        x: fields.f32(BaseFlag::X)?,
        y: fields.f32(BaseFlag::Y)?,
        z: fields.f32(BaseFlag::Z)?,
    })
}

fn write_base(writer: &mut PacketWriter, base: &Base) -> WriterResult<()> {
    let mut record = writer.start_object(Base::KIND.tag(), base.id.0, BaseFlag::SCHEMA)?;
    record
        .write_string(BaseFlag::Name, base.name.as_deref())?
        .write_opt_f32(BaseFlag::ShieldsFront, base.shields_front)?
        .write_opt_f32(BaseFlag::ShieldsRear, base.shields_rear)?
        .write_opt_i32(BaseFlag::Index, base.index)?
        .write_opt_i32(BaseFlag::HullId, base.hull_id)?
        .write_opt_f32(BaseFlag::X, base.x)?
        .write_opt_f32(BaseFlag::Y, base.y)?
        .write_opt_f32(BaseFlag::Z, base.z)?;
    record.end();
    Ok(())
}

fn read_mine(reader: &mut PacketReader<'_>, id: ObjectId) -> Result<Mine, MalformedReason> {
    let mut fields = Fields::open(reader, MineFlag::SCHEMA)?;
    Ok(Mine {
        id,
        x: fields.f32(MineFlag::X)?,
        y: fields.f32(MineFlag::Y)?,
        z: fields.f32(MineFlag::Z)?,
    })
}

fn write_mine(writer: &mut PacketWriter, mine: &Mine) -> WriterResult<()> {
    let mut record = writer.start_object(Mine::KIND.tag(), mine.id.0, MineFlag::SCHEMA)?;
    record
        .write_opt_f32(MineFlag::X, mine.x)?
        .write_opt_f32(MineFlag::Y, mine.y)?
        .write_opt_f32(MineFlag::Z, mine.z)?;
    record.end();
    Ok(())
}

fn read_anomaly(reader: &mut PacketReader<'_>, id: ObjectId) -> Result<Anomaly, MalformedReason> {
    let mut fields = Fields::open(reader, AnomalyFlag::SCHEMA)?;
    Ok(Anomaly {
        id,
        x: fields.f32(AnomalyFlag::X)?,
        y: fields.f32(AnomalyFlag::Y)?,
        z: fields.f32(AnomalyFlag::Z)?,
        anomaly_type: fields.i32(AnomalyFlag::AnomalyType)?,
    })
}

fn write_anomaly(writer: &mut PacketWriter, anomaly: &Anomaly) -> WriterResult<()> {
    let mut record =
        writer.start_object(Anomaly::KIND.tag(), anomaly.id.0, AnomalyFlag::SCHEMA)?;
    record
        .write_opt_f32(AnomalyFlag::X, anomaly.x)?
        .write_opt_f32(AnomalyFlag::Y, anomaly.y)?
        .write_opt_f32(AnomalyFlag::Z, anomaly.z)?
        .write_opt_i32(AnomalyFlag::AnomalyType, anomaly.anomaly_type)?;
    record.end();
    Ok(())
}
