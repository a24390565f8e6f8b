//! Typed world entities.
//!
//! Every attribute is optional: `None` (or [`BoolState::Unknown`]) means the
//! server has not reported it yet. An entity decoded from a single update
//! record only carries the fields that record had; the table merges those
//! partial views into the accumulated one.

use bitfield::Flag;

use crate::bool_state::BoolState;
use crate::flags::{AnomalyFlag, BaseFlag, MineFlag, NpcShipFlag};
use crate::kind::{ObjectId, ObjectKind};
use crate::merge::Merge;
use crate::object::GameObject;

/// Common behaviour of every entity kind.
pub trait Entity: Clone + Merge + Into<GameObject> + Sized {
    /// Flag vocabulary naming the entity's fields.
    type Flag: Flag;

    /// The kind tag this entity is recorded under.
    const KIND: ObjectKind;

    /// The entity's id.
    fn id(&self) -> ObjectId;

    /// Returns `true` if the field behind `flag` holds a value.
    fn is_specified(&self, flag: Self::Flag) -> bool;

    /// Extracts the entity from a [`GameObject`] of the matching kind.
    fn from_object(object: GameObject) -> Option<Self>;

    /// Every field currently holding a value, in declaration order.
    fn specified(&self) -> Vec<Self::Flag> {
        Self::Flag::all()
            .iter()
            .copied()
            .filter(|flag| self.is_specified(*flag))
            .collect()
    }
}

/// A non-player ship.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NpcShip {
    pub id: ObjectId,
    pub name: Option<String>,
    pub throttle: Option<f32>,
    pub rudder: Option<f32>,
    pub top_speed: Option<f32>,
    pub turn_rate: Option<f32>,
    pub is_enemy: BoolState,
    pub hull_id: Option<i32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
    pub pitch: Option<f32>,
    pub roll: Option<f32>,
    pub heading: Option<f32>,
    pub velocity: Option<f32>,
    pub surrendered: BoolState,
    pub shields_front: Option<f32>,
    pub shields_front_max: Option<f32>,
    pub shields_rear: Option<f32>,
    pub shields_rear_max: Option<f32>,
    /// Resistance per beam frequency, A to E.
    pub shield_freqs: [Option<f32>; 5],
    pub in_nebula: BoolState,
    pub scan_level: Option<i32>,
}

impl NpcShip {
    /// A ship with only its id known.
    #[must_use]
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

impl Merge for NpcShip {
    fn merge(&mut self, incoming: Self) {
        self.name.merge(incoming.name);
        self.throttle.merge(incoming.throttle);
        self.rudder.merge(incoming.rudder);
        self.top_speed.merge(incoming.top_speed);
        self.turn_rate.merge(incoming.turn_rate);
        self.is_enemy.merge(incoming.is_enemy);
        self.hull_id.merge(incoming.hull_id);
        self.x.merge(incoming.x);
        self.y.merge(incoming.y);
        self.z.merge(incoming.z);
        self.pitch.merge(incoming.pitch);
        self.roll.merge(incoming.roll);
        self.heading.merge(incoming.heading);
        self.velocity.merge(incoming.velocity);
        self.surrendered.merge(incoming.surrendered);
        self.shields_front.merge(incoming.shields_front);
        self.shields_front_max.merge(incoming.shields_front_max);
        self.shields_rear.merge(incoming.shields_rear);
        self.shields_rear_max.merge(incoming.shields_rear_max);
        self.shield_freqs.merge(incoming.shield_freqs);
        self.in_nebula.merge(incoming.in_nebula);
        self.scan_level.merge(incoming.scan_level);
    }
}

impl Entity for NpcShip {
    type Flag = NpcShipFlag;
    const KIND: ObjectKind = ObjectKind::NpcShip;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn is_specified(&self, flag: NpcShipFlag) -> bool {
        match flag {
            NpcShipFlag::Name => self.name.is_some(),
            NpcShipFlag::Throttle => self.throttle.is_some(),
            NpcShipFlag::Rudder => self.rudder.is_some(),
            NpcShipFlag::TopSpeed => self.top_speed.is_some(),
            NpcShipFlag::TurnRate => self.turn_rate.is_some(),
            NpcShipFlag::IsEnemy => self.is_enemy.is_known(),
            NpcShipFlag::HullId => self.hull_id.is_some(),
            NpcShipFlag::X => self.x.is_some(),
            NpcShipFlag::Y => self.y.is_some(),
            NpcShipFlag::Z => self.z.is_some(),
            NpcShipFlag::Pitch => self.pitch.is_some(),
            NpcShipFlag::Roll => self.roll.is_some(),
            NpcShipFlag::Heading => self.heading.is_some(),
            NpcShipFlag::Velocity => self.velocity.is_some(),
            NpcShipFlag::Surrendered => self.surrendered.is_known(),
            NpcShipFlag::ShieldsFront => self.shields_front.is_some(),
            NpcShipFlag::ShieldsFrontMax => self.shields_front_max.is_some(),
            NpcShipFlag::ShieldsRear => self.shields_rear.is_some(),
            NpcShipFlag::ShieldsRearMax => self.shields_rear_max.is_some(),
            NpcShipFlag::ShieldFreqA => self.shield_freqs[0].is_some(),
            NpcShipFlag::ShieldFreqB => self.shield_freqs[1].is_some(),
            NpcShipFlag::ShieldFreqC => self.shield_freqs[2].is_some(),
            NpcShipFlag::ShieldFreqD => self.shield_freqs[3].is_some(),
            NpcShipFlag::ShieldFreqE => self.shield_freqs[4].is_some(),
            NpcShipFlag::InNebula => self.in_nebula.is_known(),
            NpcShipFlag::ScanLevel => self.scan_level.is_some(),
        }
    }

    fn from_object(object: GameObject) -> Option<Self> {
        match object {
            GameObject::NpcShip(ship) => Some(ship),
            _ => None,
        }
    }
}

/// A friendly base.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Base {
    pub id: ObjectId,
    pub name: Option<String>,
    pub shields_front: Option<f32>,
    pub shields_rear: Option<f32>,
    pub index: Option<i32>,
    pub hull_id: Option<i32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl Base {
    #[must_use]
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

impl Merge for Base {
    fn merge(&mut self, incoming: Self) {
        self.name.merge(incoming.name);
        self.shields_front.merge(incoming.shields_front);
        self.shields_rear.merge(incoming.shields_rear);
        self.index.merge(incoming.index);
        self.hull_id.merge(incoming.hull_id);
        self.x.merge(incoming.x);
        self.y.merge(incoming.y);
        self.z.merge(incoming.z);
    }
}

impl Entity for Base {
    type Flag = BaseFlag;
    const KIND: ObjectKind = ObjectKind::Base;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn is_specified(&self, flag: BaseFlag) -> bool {
        match flag {
            BaseFlag::Name => self.name.is_some(),
            BaseFlag::ShieldsFront => self.shields_front.is_some(),
            BaseFlag::ShieldsRear => self.shields_rear.is_some(),
            BaseFlag::Index => self.index.is_some(),
            BaseFlag::HullId => self.hull_id.is_some(),
            BaseFlag::X => self.x.is_some(),
            BaseFlag::Y => self.y.is_some(),
            BaseFlag::Z => self.z.is_some(),
        }
    }

    fn from_object(object: GameObject) -> Option<Self> {
        match object {
            GameObject::Base(base) => Some(base),
            _ => None,
        }
    }
}

/// A mine.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mine {
    pub id: ObjectId,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
}

impl Mine {
    #[must_use]
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

impl Merge for Mine {
    fn merge(&mut self, incoming: Self) {
        self.x.merge(incoming.x);
        self.y.merge(incoming.y);
        self.z.merge(incoming.z);
    }
}

impl Entity for Mine {
    type Flag = MineFlag;
    const KIND: ObjectKind = ObjectKind::Mine;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn is_specified(&self, flag: MineFlag) -> bool {
        match flag {
            MineFlag::X => self.x.is_some(),
            MineFlag::Y => self.y.is_some(),
            MineFlag::Z => self.z.is_some(),
        }
    }

    fn from_object(object: GameObject) -> Option<Self> {
        match object {
            GameObject::Mine(mine) => Some(mine),
            _ => None,
        }
    }
}

/// A space anomaly (pickup).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Anomaly {
    pub id: ObjectId,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
    pub anomaly_type: Option<i32>,
}

impl Anomaly {
    #[must_use]
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

impl Merge for Anomaly {
    fn merge(&mut self, incoming: Self) {
        self.x.merge(incoming.x);
        self.y.merge(incoming.y);
        self.z.merge(incoming.z);
        self.anomaly_type.merge(incoming.anomaly_type);
    }
}

impl Entity for Anomaly {
    type Flag = AnomalyFlag;
    const KIND: ObjectKind = ObjectKind::Anomaly;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn is_specified(&self, flag: AnomalyFlag) -> bool {
        match flag {
            AnomalyFlag::X => self.x.is_some(),
            AnomalyFlag::Y => self.y.is_some(),
            AnomalyFlag::Z => self.z.is_some(),
            AnomalyFlag::AnomalyType => self.anomaly_type.is_some(),
        }
    }

    fn from_object(object: GameObject) -> Option<Self> {
        match object {
            GameObject::Anomaly(anomaly) => Some(anomaly),
            _ => None,
        }
    }
}
