//! Error types for the schema layer.

use crate::TypeId;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Coarse classification shared by every typestore error type.
///
/// Initialization code can branch on the kind without matching the
/// individual variants of each crate's error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed persisted dictionary text.
    Parse,
    /// Metadata would become contradictory if the operation were applied.
    Consistency,
    /// An explicit refactoring target does not name any current member.
    Resolution,
    /// The operation is not available on this handler.
    UnsupportedOperation,
    /// A configuration source could not be read or is invalid.
    Configuration,
}

/// Consistency violations detected while building or registering type metadata.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two members of one definition share a unique name.
    #[error("duplicate member {unique_name} in type {type_name}")]
    DuplicateMember {
        type_name: String,
        unique_name: String,
    },

    /// A type id is already bound to a different type name.
    #[error("type id {type_id} is bound to {existing} and cannot be registered for {incoming}")]
    TypeIdConflict {
        type_id: TypeId,
        existing: String,
        incoming: String,
    },

    /// A type id is re-registered with a different member description.
    #[error("type id {type_id} of {type_name} is re-registered with a different description")]
    DescriptionMismatch { type_id: TypeId, type_name: String },

    /// A definition was offered to a lineage of another type name.
    #[error("definition of {type_name} does not belong to lineage {lineage}")]
    LineageMismatch { lineage: String, type_name: String },

    /// A definition resolves to another runtime type than its lineage.
    #[error("runtime type {definition} of {type_name} differs from lineage runtime type {lineage}")]
    RuntimeTypeMismatch {
        type_name: String,
        lineage: String,
        definition: String,
    },

    /// A lineage already has a different runtime definition bound.
    #[error("lineage {type_name} already has runtime definition {existing}, cannot bind {incoming}")]
    RuntimeDefinitionConflict {
        type_name: String,
        existing: TypeId,
        incoming: TypeId,
    },

    /// Type id 0 is reserved for "not assigned".
    #[error("type definition {type_name} has no assigned type id")]
    UnassignedTypeId { type_name: String },

    /// A type id lookup that must succeed did not.
    #[error("type id cannot be resolved: {0}")]
    UnknownTypeId(TypeId),
}

impl SchemaError {
    /// Every schema error is a consistency failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Consistency
    }
}
