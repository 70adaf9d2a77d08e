//! Capabilities the schema core consumes from the surrounding engine.
//!
//! - [`LengthResolver`] supplies the persisted length bounds stored on each member
//! - [`TypeNameResolver`] maps persisted type names back to runtime types
//! - [`MemberSource`] discovers the persistable members of a runtime type
//!
//! [`BinaryLengthResolver`] and [`RuntimeTypeRegistry`] are the table-backed
//! default implementations.

use crate::member::Member;
use crate::primitive::{PrimitiveKind, VariableLengthKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handle to a type known to the running program.
///
/// Two handles are the same runtime type iff their canonical names are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeType {
    name: Arc<str>,
}

impl RuntimeType {
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
        }
    }

    /// Canonical runtime name. Runtime definitions use it as their type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// What a length bound is requested for.
#[derive(Debug, Clone, Copy)]
pub enum LengthSubject<'a> {
    Primitive(PrimitiveKind),
    Reference,
    VariableLength(VariableLengthKind),
    Complex(&'a [Member]),
}

impl LengthSubject<'static> {
    /// Primitive type names map to their kind, everything else is a reference.
    #[must_use]
    pub fn for_type_name(type_name: &str) -> Self {
        match PrimitiveKind::from_type_name(type_name) {
            Some(kind) => Self::Primitive(kind),
            None => Self::Reference,
        }
    }
}

pub trait LengthResolver: Send + Sync {
    fn minimum_length_for(&self, subject: LengthSubject<'_>) -> u64;

    fn maximum_length_for(&self, subject: LengthSubject<'_>) -> u64;
}

/// Lengths of the binary record layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryLengthResolver;

impl BinaryLengthResolver {
    /// Object ids are stored as 8 bytes.
    pub const REFERENCE_LENGTH: u64 = 8;
    /// Payload length header in front of every variable-length value.
    pub const LENGTH_HEADER_LENGTH: u64 = 8;
}

impl LengthResolver for BinaryLengthResolver {
    fn minimum_length_for(&self, subject: LengthSubject<'_>) -> u64 {
        match subject {
            LengthSubject::Primitive(kind) => kind.byte_width(),
            LengthSubject::Reference => Self::REFERENCE_LENGTH,
            LengthSubject::VariableLength(_) | LengthSubject::Complex(_) => {
                Self::LENGTH_HEADER_LENGTH
            }
        }
    }

    fn maximum_length_for(&self, subject: LengthSubject<'_>) -> u64 {
        match subject {
            LengthSubject::Primitive(kind) => kind.byte_width(),
            LengthSubject::Reference => Self::REFERENCE_LENGTH,
            LengthSubject::VariableLength(_) | LengthSubject::Complex(_) => u64::MAX,
        }
    }
}

/// Resolves a persisted type name to a runtime type.
///
/// Renamed or removed types are expected: `None` is a normal answer.
pub trait TypeNameResolver: Send + Sync {
    fn resolve(&self, type_name: &str) -> Option<RuntimeType>;
}

/// Discovers the persistable members of a runtime type, in persisted order.
/// Abstract types yield no members.
pub trait MemberSource: Send + Sync {
    fn collect_persistable_members(&self, runtime_type: &RuntimeType) -> Vec<Member>;
}

/// Table of runtime types known to the program.
///
/// Primitive type names always resolve. Aliases let an outdated persisted
/// name resolve to the type it was renamed to.
#[derive(Debug, Default, Clone)]
pub struct RuntimeTypeRegistry {
    types: HashMap<String, (RuntimeType, Vec<Member>)>,
    aliases: HashMap<String, String>,
}

impl RuntimeTypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a runtime type with its persistable members and returns its handle.
    pub fn register(&mut self, type_name: impl Into<String>, members: Vec<Member>) -> RuntimeType {
        let type_name = type_name.into();
        let runtime_type = RuntimeType::new(&type_name);
        self.types.insert(type_name, (runtime_type.clone(), members));
        runtime_type
    }

    /// Lets `persisted_name` resolve to the already registered `runtime_name`.
    pub fn register_alias(
        &mut self,
        persisted_name: impl Into<String>,
        runtime_name: impl Into<String>,
    ) {
        self.aliases.insert(persisted_name.into(), runtime_name.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeNameResolver for RuntimeTypeRegistry {
    fn resolve(&self, type_name: &str) -> Option<RuntimeType> {
        if PrimitiveKind::from_type_name(type_name).is_some() {
            return Some(RuntimeType::new(type_name));
        }
        if let Some((runtime_type, _)) = self.types.get(type_name) {
            return Some(runtime_type.clone());
        }
        let target = self.aliases.get(type_name)?;
        self.types.get(target).map(|(runtime_type, _)| runtime_type.clone())
    }
}

impl MemberSource for RuntimeTypeRegistry {
    fn collect_persistable_members(&self, runtime_type: &RuntimeType) -> Vec<Member> {
        self.types
            .get(runtime_type.name())
            .map(|(_, members)| members.clone())
            .unwrap_or_default()
    }
}

/// Resolver that knows no runtime types at all, only primitives.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveOnlyResolver;

impl TypeNameResolver for PrimitiveOnlyResolver {
    fn resolve(&self, type_name: &str) -> Option<RuntimeType> {
        PrimitiveKind::from_type_name(type_name).map(|_| RuntimeType::new(type_name))
    }
}
