//! Type handlers: create, update and store instances from binary records.

use crate::error::{LegacyError, LegacyResult};
use crate::layout;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use typestore_schema::{RuntimeType, TypeDefinition, TypeId, TypeMember};

/// Persistent object id. Zero is the null reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    pub const NULL: ObjectId = ObjectId(0);

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A loaded object: one raw value per member of its handler's definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    type_id: TypeId,
    values: Vec<Vec<u8>>,
}

impl Instance {
    /// Zero-valued instance of `definition`.
    #[must_use]
    pub fn new(definition: &TypeDefinition) -> Self {
        Self {
            type_id: definition.type_id(),
            values: definition.members().iter().map(layout::default_value).collect(),
        }
    }

    #[must_use]
    pub fn with_values(type_id: TypeId, values: Vec<Vec<u8>>) -> Self {
        Self { type_id, values }
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub fn values(&self) -> &[Vec<u8>] {
        &self.values
    }

    #[must_use]
    pub fn value(&self, index: usize) -> Option<&[u8]> {
        self.values.get(index).map(Vec::as_slice)
    }

    pub fn set_value(&mut self, index: usize, value: Vec<u8>) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }
}

/// Loads and stores instances of one type.
///
/// `create` and `update` consume a record in the layout of [`Self::type_definition`];
/// `store` produces one.
pub trait TypeHandler: Send + Sync + fmt::Debug {
    fn type_definition(&self) -> &Arc<TypeDefinition>;

    /// `None` when the type no longer exists at runtime.
    fn runtime_type(&self) -> Option<&RuntimeType>;

    /// Hand-authored handlers need a custom derivation when their type evolves.
    fn is_custom(&self) -> bool {
        false
    }

    fn create(&self, record: &[u8]) -> LegacyResult<Instance>;

    fn update(&self, record: &[u8], instance: &mut Instance) -> LegacyResult<()>;

    fn store(&self, instance: &Instance) -> LegacyResult<Vec<u8>>;

    fn iterate_instance_references(
        &self,
        instance: &Instance,
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()>;

    fn iterate_persisted_references(
        &self,
        record: &[u8],
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()>;

    fn type_id(&self) -> TypeId {
        self.type_definition().type_id()
    }
}

/// Generic handler driven entirely by a definition's member layout.
#[derive(Debug, Clone)]
pub struct ReflectiveTypeHandler {
    definition: Arc<TypeDefinition>,
}

impl ReflectiveTypeHandler {
    #[must_use]
    pub fn new(definition: Arc<TypeDefinition>) -> Self {
        Self { definition }
    }

    fn check_shape(&self, instance: &Instance) -> LegacyResult<()> {
        let expected = self.definition.members().len();
        if instance.values.len() == expected {
            Ok(())
        } else {
            Err(LegacyError::InstanceShape {
                type_name: self.definition.type_name().to_owned(),
                expected,
                actual: instance.values.len(),
            })
        }
    }
}

impl TypeHandler for ReflectiveTypeHandler {
    fn type_definition(&self) -> &Arc<TypeDefinition> {
        &self.definition
    }

    fn runtime_type(&self) -> Option<&RuntimeType> {
        self.definition.runtime_type()
    }

    fn create(&self, record: &[u8]) -> LegacyResult<Instance> {
        let values =
            layout::read_record(self.definition.type_name(), self.definition.members(), record)?;
        Ok(Instance::with_values(self.definition.type_id(), values))
    }

    fn update(&self, record: &[u8], instance: &mut Instance) -> LegacyResult<()> {
        self.check_shape(instance)?;
        instance.values =
            layout::read_record(self.definition.type_name(), self.definition.members(), record)?;
        Ok(())
    }

    fn store(&self, instance: &Instance) -> LegacyResult<Vec<u8>> {
        self.check_shape(instance)?;
        Ok(layout::write_record(self.definition.members(), &instance.values))
    }

    fn iterate_instance_references(
        &self,
        instance: &Instance,
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        self.check_shape(instance)?;
        for (member, value) in self.definition.members().iter().zip(&instance.values) {
            if member.has_references() {
                layout::visit_value_references(
                    self.definition.type_name(),
                    member,
                    value,
                    visitor,
                )?;
            }
        }
        Ok(())
    }

    fn iterate_persisted_references(
        &self,
        record: &[u8],
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        layout::visit_record_references(
            self.definition.type_name(),
            self.definition.members(),
            record,
            visitor,
        )
    }
}

/// Handler for a legacy type that no longer exists. Nothing can be created or
/// stored; reference iteration visits nothing.
#[derive(Debug, Clone)]
pub struct DeletedTypeHandler {
    definition: Arc<TypeDefinition>,
}

impl DeletedTypeHandler {
    #[must_use]
    pub fn new(definition: Arc<TypeDefinition>) -> Self {
        Self { definition }
    }

    fn unsupported(&self, operation: &'static str) -> LegacyError {
        LegacyError::UnsupportedOperation {
            operation,
            type_name: self.definition.type_name().to_owned(),
        }
    }
}

impl TypeHandler for DeletedTypeHandler {
    fn type_definition(&self) -> &Arc<TypeDefinition> {
        &self.definition
    }

    fn runtime_type(&self) -> Option<&RuntimeType> {
        None
    }

    fn create(&self, _record: &[u8]) -> LegacyResult<Instance> {
        Err(self.unsupported("create"))
    }

    fn update(&self, _record: &[u8], _instance: &mut Instance) -> LegacyResult<()> {
        Err(self.unsupported("update"))
    }

    fn store(&self, _instance: &Instance) -> LegacyResult<Vec<u8>> {
        Err(self.unsupported("store"))
    }

    fn iterate_instance_references(
        &self,
        _instance: &Instance,
        _visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        Ok(())
    }

    fn iterate_persisted_references(
        &self,
        _record: &[u8],
        _visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        Ok(())
    }
}
