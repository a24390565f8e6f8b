//! The shared world table.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::entity::Entity;
use crate::error::WorldResult;
use crate::kind::{ObjectId, ObjectKind};
use crate::object::GameObject;

/// What [`WorldTable::apply`] did with an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// First sighting: the update became the entity.
    Inserted,
    /// The update was merged into an existing entity.
    Merged,
}

/// Every entity seen this session, keyed by kind and id.
///
/// Entries are created on first sighting and are only removed by
/// [`clear`](Self::clear) at session teardown. Merges take the write lock one
/// at a time; reads hand out clones so callers never hold the lock.
#[derive(Debug, Default)]
pub struct WorldTable {
    objects: RwLock<BTreeMap<(ObjectKind, ObjectId), GameObject>>,
}

impl WorldTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or merges a partial update.
    pub fn apply(&self, update: GameObject) -> WorldResult<Applied> {
        let (kind, id) = (update.kind(), update.id());
        let mut objects = self.objects.write();
        if let Some(existing) = objects.get_mut(&(kind, id)) {
            existing.merge(update)?;
            tracing::trace!(%kind, id = id.0, "merged object update");
            Ok(Applied::Merged)
        } else {
            tracing::trace!(%kind, id = id.0, "new object");
            objects.insert((kind, id), update);
            Ok(Applied::Inserted)
        }
    }

    /// A snapshot of one entity.
    #[must_use]
    pub fn get(&self, kind: ObjectKind, id: ObjectId) -> Option<GameObject> {
        self.objects.read().get(&(kind, id)).cloned()
    }

    /// A typed snapshot of one entity.
    #[must_use]
    pub fn get_as<E: Entity>(&self, id: ObjectId) -> Option<E> {
        self.get(E::KIND, id).and_then(E::from_object)
    }

    /// Snapshots of every entity of `kind`, in id order.
    #[must_use]
    pub fn objects_of(&self, kind: ObjectKind) -> Vec<GameObject> {
        self.objects
            .read()
            .range((kind, ObjectId(i32::MIN))..=(kind, ObjectId(i32::MAX)))
            .map(|(_, object)| object.clone())
            .collect()
    }

    /// Snapshots of every entity of `kind` whose `field` holds a value.
    ///
    /// An unknown field name is an error even when the table holds no
    /// entity of that kind.
    pub fn with_specified(&self, kind: ObjectKind, field: &str) -> WorldResult<Vec<GameObject>> {
        GameObject::empty(kind, ObjectId::default()).is_specified(field)?;

        let mut out = Vec::new();
        for object in self.objects_of(kind) {
            if object.is_specified(field)? {
                out.push(object);
            }
        }
        Ok(out)
    }

    /// Snapshots of every entity, ordered by kind then id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<GameObject> {
        self.objects.read().values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Drops every entity (session teardown).
    pub fn clear(&self) {
        let mut objects = self.objects.write();
        tracing::debug!(count = objects.len(), "clearing world table");
        objects.clear();
    }
}
