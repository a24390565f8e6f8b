//! Kind-erased world objects.

use bitfield::Flag;

use crate::entity::{Anomaly, Base, Entity, Mine, NpcShip};
use crate::error::{WorldError, WorldResult};
use crate::kind::{ObjectId, ObjectKind};
use crate::merge::Merge;

/// Any world entity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum GameObject {
    NpcShip(NpcShip),
    Base(Base),
    Mine(Mine),
    Anomaly(Anomaly),
}

impl GameObject {
    /// An object of `kind` with only its id known.
    #[must_use]
    pub fn empty(kind: ObjectKind, id: ObjectId) -> Self {
        match kind {
            ObjectKind::NpcShip => NpcShip::new(id).into(),
            ObjectKind::Base => Base::new(id).into(),
            ObjectKind::Mine => Mine::new(id).into(),
            ObjectKind::Anomaly => Anomaly::new(id).into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::NpcShip(_) => ObjectKind::NpcShip,
            Self::Base(_) => ObjectKind::Base,
            Self::Mine(_) => ObjectKind::Mine,
            Self::Anomaly(_) => ObjectKind::Anomaly,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ObjectId {
        match self {
            Self::NpcShip(e) => e.id,
            Self::Base(e) => e.id,
            Self::Mine(e) => e.id,
            Self::Anomaly(e) => e.id,
        }
    }

    /// Returns whether the field named `field` holds a value.
    ///
    /// Field names are the flag identifiers of the object's kind, such as
    /// `"Heading"` or `"ShieldFreqA"`.
    pub fn is_specified(&self, field: &str) -> WorldResult<bool> {
        fn check<E: Entity>(entity: &E, field: &str) -> WorldResult<bool> {
            E::Flag::from_name(field)
                .map(|flag| entity.is_specified(flag))
                .ok_or_else(|| WorldError::UnknownField {
                    kind: E::KIND,
                    field: field.to_owned(),
                })
        }

        match self {
            Self::NpcShip(e) => check(e, field),
            Self::Base(e) => check(e, field),
            Self::Mine(e) => check(e, field),
            Self::Anomaly(e) => check(e, field),
        }
    }

    /// Names of every field holding a value, in declaration order.
    #[must_use]
    pub fn specified_fields(&self) -> Vec<&'static str> {
        fn names<E: Entity>(entity: &E) -> Vec<&'static str> {
            entity.specified().into_iter().map(Flag::name).collect()
        }

        match self {
            Self::NpcShip(e) => names(e),
            Self::Base(e) => names(e),
            Self::Mine(e) => names(e),
            Self::Anomaly(e) => names(e),
        }
    }

    /// Folds `incoming` into this object field by field.
    pub fn merge(&mut self, incoming: Self) -> WorldResult<()> {
        match (self, incoming) {
            (Self::NpcShip(existing), Self::NpcShip(update)) => existing.merge(update),
            (Self::Base(existing), Self::Base(update)) => existing.merge(update),
            (Self::Mine(existing), Self::Mine(update)) => existing.merge(update),
            (Self::Anomaly(existing), Self::Anomaly(update)) => existing.merge(update),
            (existing, update) => {
                return Err(WorldError::KindMismatch {
                    id: existing.id(),
                    existing: existing.kind(),
                    incoming: update.kind(),
                })
            }
        }
        Ok(())
    }

    /// Returns the entity if it is of type `E`.
    #[must_use]
    pub fn into_entity<E: Entity>(self) -> Option<E> {
        E::from_object(self)
    }
}

impl From<NpcShip> for GameObject {
    fn from(value: NpcShip) -> Self {
        Self::NpcShip(value)
    }
}

impl From<Base> for GameObject {
    fn from(value: Base) -> Self {
        Self::Base(value)
    }
}

impl From<Mine> for GameObject {
    fn from(value: Mine) -> Self {
        Self::Mine(value)
    }
}

impl From<Anomaly> for GameObject {
    fn from(value: Anomaly) -> Self {
        Self::Anomaly(value)
    }
}
