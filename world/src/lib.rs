//! World object model for the Artemis protocol.
//!
//! Object update packets carry partial views of entities: each record names
//! the fields it includes. This crate holds the typed entities, the flag
//! vocabularies naming their fields, and the [`WorldTable`] that folds
//! partial views into one accumulated entity per (kind, id).
//!
//! # Design Principles
//!
//! - **Absent, not sentinel** - Unreported fields are `None` or
//!   [`BoolState::Unknown`], never magic values.
//! - **Unspecified never overwrites** - Merging only touches fields the
//!   update carries, so disjoint updates commute and repeats are idempotent.
//! - **Append-only for the session** - Entities appear on first sighting and
//!   leave only when the table is cleared.
//! - **No wire knowledge** - Record encoding lives in the codec crate.

mod bool_state;
mod entity;
mod error;
mod flags;
mod kind;
mod merge;
mod object;
mod table;

pub use bool_state::BoolState;
pub use entity::{Anomaly, Base, Entity, Mine, NpcShip};
pub use error::{WorldError, WorldResult};
pub use flags::{AnomalyFlag, BaseFlag, MineFlag, NpcShipFlag};
pub use kind::{ObjectId, ObjectKind};
pub use merge::Merge;
pub use object::GameObject;
pub use table::{Applied, WorldTable};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = WorldTable::new();
        let _ = BoolState::default();
        let _ = ObjectKind::ALL;
        let _ = NpcShipFlag::MODERN_SCHEMA;
        let _ = GameObject::empty(ObjectKind::Base, ObjectId(1));
        let _: WorldResult<()> = Ok(());
    }
}
