//! Object identity: kind tags and ids.

use std::fmt;

/// Server-assigned object id, stable for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(pub i32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kinds of world object carried in object update records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectKind {
    NpcShip,
    Base,
    Mine,
    Anomaly,
}

impl ObjectKind {
    /// Every kind, in tag order.
    pub const ALL: [Self; 4] = [Self::NpcShip, Self::Base, Self::Mine, Self::Anomaly];

    /// The record's leading kind byte.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::NpcShip => 5,
            Self::Base => 6,
            Self::Mine => 7,
            Self::Anomaly => 8,
        }
    }

    /// Looks a kind up by its tag. Zero and unlisted tags have no kind.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            5 => Some(Self::NpcShip),
            6 => Some(Self::Base),
            7 => Some(Self::Mine),
            8 => Some(Self::Anomaly),
            _ => None,
        }
    }

    /// Snake-case name used in logs and CLI output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NpcShip => "npc_ship",
            Self::Base => "base",
            Self::Mine => "mine",
            Self::Anomaly => "anomaly",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_roundtrip() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn terminator_tag_has_no_kind() {
        assert_eq!(ObjectKind::from_tag(0), None);
        assert_eq!(ObjectKind::from_tag(0xFF), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(ObjectKind::NpcShip.to_string(), "npc_ship");
        assert_eq!(ObjectId(12).to_string(), "#12");
    }
}
