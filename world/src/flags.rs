//! Field flag vocabularies and their wire schemas.
//!
//! Each object kind has one flag enum naming every field it can carry. The
//! schema constants list the flags in wire order; where the layout changed
//! between protocol versions there is one schema per layout.

use bitfield::{define_flags, FlagSchema};

define_flags! {
    /// Fields of a non-player ship.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub enum NpcShipFlag {
        Name,
        Throttle,
        Rudder,
        TopSpeed,
        TurnRate,
        IsEnemy,
        HullId,
        X,
        Y,
        Z,
        Pitch,
        Roll,
        Heading,
        Velocity,
        Surrendered,
        ShieldsFront,
        ShieldsFrontMax,
        ShieldsRear,
        ShieldsRearMax,
        ShieldFreqA,
        ShieldFreqB,
        ShieldFreqC,
        ShieldFreqD,
        ShieldFreqE,
        InNebula,
        ScanLevel,
    }
}

impl NpcShipFlag {
    /// The five shield frequency flags, A to E.
    pub const SHIELD_FREQS: [Self; 5] = [
        Self::ShieldFreqA,
        Self::ShieldFreqB,
        Self::ShieldFreqC,
        Self::ShieldFreqD,
        Self::ShieldFreqE,
    ];

    /// Layout before 2.1: 24 flags, three bytes.
    pub const LEGACY_SCHEMA: FlagSchema<Self> = FlagSchema::new(Self::ALL.split_at(24).0);

    /// Layout from 2.1 on: nebula and scan level appended, four bytes.
    pub const MODERN_SCHEMA: FlagSchema<Self> = FlagSchema::new(Self::ALL);
}

define_flags! {
    /// Fields of a friendly base.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub enum BaseFlag {
        Name,
        ShieldsFront,
        ShieldsRear,
        Index,
        HullId,
        X,
        Y,
        Z,
    }
}

impl BaseFlag {
    pub const SCHEMA: FlagSchema<Self> = FlagSchema::new(Self::ALL);
}

define_flags! {
    /// Fields of a mine.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub enum MineFlag {
        X,
        Y,
        Z,
    }
}

impl MineFlag {
    pub const SCHEMA: FlagSchema<Self> = FlagSchema::new(Self::ALL);
}

define_flags! {
    /// Fields of a space anomaly.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub enum AnomalyFlag {
        X,
        Y,
        Z,
        AnomalyType,
    }
}

impl AnomalyFlag {
    pub const SCHEMA: FlagSchema<Self> = FlagSchema::new(Self::ALL);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npc_ship_schema_widths() {
        assert_eq!(NpcShipFlag::LEGACY_SCHEMA.len(), 24);
        assert_eq!(NpcShipFlag::LEGACY_SCHEMA.byte_len(), 3);
        assert_eq!(NpcShipFlag::MODERN_SCHEMA.len(), 26);
        assert_eq!(NpcShipFlag::MODERN_SCHEMA.byte_len(), 4);
    }

    #[test]
    fn modern_layout_extends_legacy() {
        let legacy = NpcShipFlag::LEGACY_SCHEMA.flags();
        assert_eq!(&NpcShipFlag::MODERN_SCHEMA.flags()[..legacy.len()], legacy);
        assert!(!NpcShipFlag::LEGACY_SCHEMA.contains(NpcShipFlag::InNebula));
        assert!(!NpcShipFlag::LEGACY_SCHEMA.contains(NpcShipFlag::ScanLevel));
    }

    #[test]
    fn small_kinds_fit_one_byte() {
        assert_eq!(BaseFlag::SCHEMA.byte_len(), 1);
        assert_eq!(MineFlag::SCHEMA.byte_len(), 1);
        assert_eq!(AnomalyFlag::SCHEMA.byte_len(), 1);
    }
}
