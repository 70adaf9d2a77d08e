//! Schema model of the typestore persistence engine.
//!
//! Defines the metadata every other typestore crate depends on:
//! - [`Member`] — one persisted slot (primitive, field, or pseudo-field)
//! - [`TypeDefinition`] — a frozen, identity-unique member list bound to a [`TypeId`]
//! - [`TypeLineage`] — the version history of one type name
//! - [`TypeDictionary`] — the session-wide registry enforcing type id consistency
//!
//! Runtime knowledge is consumed through the [`TypeNameResolver`],
//! [`MemberSource`] and [`LengthResolver`] traits.

mod capability;
mod definition;
mod dictionary;
mod error;
mod ids;
mod lineage;
mod member;
mod primitive;
pub mod symbols;

pub use capability::{
    BinaryLengthResolver, LengthResolver, LengthSubject, MemberSource, PrimitiveOnlyResolver,
    RuntimeType, RuntimeTypeRegistry, TypeNameResolver,
};
pub use definition::{TypeDefinition, members_equal_description};
pub use dictionary::{RegistrationObserver, TypeDictionary};
pub use error::{ErrorKind, SchemaError, SchemaResult};
pub use ids::TypeId;
pub use lineage::TypeLineage;
pub use member::{
    ComplexPseudoField, FieldMember, Member, PrimitiveDefinition, SimplePseudoField, TypeMember,
    VariableLengthPseudoField,
};
pub use primitive::{PrimitiveKind, VariableLengthKind};
