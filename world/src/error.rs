//! Error types for world table operations.

use thiserror::Error;

use crate::kind::{ObjectId, ObjectKind};

/// Result type for world table operations.
pub type WorldResult<T> = Result<T, WorldError>;

/// Errors raised by world objects and the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// Two objects of different kinds were merged.
    #[error("cannot merge {incoming} into {existing} {id}")]
    KindMismatch {
        id: ObjectId,
        existing: ObjectKind,
        incoming: ObjectKind,
    },

    /// A field name that the kind does not declare.
    #[error("{kind} has no field named {field:?}")]
    UnknownField { kind: ObjectKind, field: String },
}
