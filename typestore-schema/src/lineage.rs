use crate::capability::RuntimeType;
use crate::definition::TypeDefinition;
use crate::error::{SchemaError, SchemaResult};
use crate::ids::TypeId;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Version history of one type name, ordered by ascending type id.
///
/// The runtime definition is the shape of the type in the running program
/// and can be bound at most once.
#[derive(Debug, Clone)]
pub struct TypeLineage {
    type_name: String,
    runtime_type: Option<RuntimeType>,
    entries: BTreeMap<TypeId, Arc<TypeDefinition>>,
    runtime_definition: Option<Arc<TypeDefinition>>,
}

impl TypeLineage {
    #[must_use]
    pub fn new(type_name: impl Into<String>, runtime_type: Option<RuntimeType>) -> Self {
        Self {
            type_name: type_name.into(),
            runtime_type,
            entries: BTreeMap::new(),
            runtime_definition: None,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn runtime_type(&self) -> Option<&RuntimeType> {
        self.runtime_type.as_ref()
    }

    /// Entries in ascending type id order.
    pub fn entries(&self) -> impl Iterator<Item = &Arc<TypeDefinition>> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn lookup(&self, type_id: TypeId) -> Option<&Arc<TypeDefinition>> {
        self.entries.get(&type_id)
    }

    /// The entry with the highest type id.
    #[must_use]
    pub fn latest(&self) -> Option<&Arc<TypeDefinition>> {
        self.entries.values().next_back()
    }

    #[must_use]
    pub fn runtime_definition(&self) -> Option<&Arc<TypeDefinition>> {
        self.runtime_definition.as_ref()
    }

    /// Whether the latest persisted entry describes the runtime definition.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match (self.latest(), &self.runtime_definition) {
            (Some(latest), Some(runtime)) => latest.equals_description(runtime),
            _ => false,
        }
    }

    pub(crate) fn adopt_runtime_type(&mut self, runtime_type: RuntimeType) {
        self.runtime_type = Some(runtime_type);
    }

    /// Validates `definition` against this lineage without changing it.
    /// Returns whether registering it would add a new entry.
    pub fn check(&self, definition: &TypeDefinition) -> SchemaResult<bool> {
        if definition.type_name() != self.type_name {
            return Err(SchemaError::LineageMismatch {
                lineage: self.type_name.clone(),
                type_name: definition.type_name().to_owned(),
            });
        }
        if let (Some(lineage), Some(own)) = (&self.runtime_type, definition.runtime_type())
            && lineage != own
        {
            return Err(SchemaError::RuntimeTypeMismatch {
                type_name: self.type_name.clone(),
                lineage: lineage.name().to_owned(),
                definition: own.name().to_owned(),
            });
        }
        match self.entries.get(&definition.type_id()) {
            Some(existing) if existing.equals_description(definition) => Ok(false),
            Some(_) => Err(SchemaError::DescriptionMismatch {
                type_id: definition.type_id(),
                type_name: self.type_name.clone(),
            }),
            None => Ok(true),
        }
    }

    /// Adds `definition` as an entry. Re-registering a description-equal
    /// definition under the same type id is a no-op returning `false`.
    pub fn register(&mut self, definition: Arc<TypeDefinition>) -> SchemaResult<bool> {
        if !self.check(&definition)? {
            return Ok(false);
        }
        if self.runtime_type.is_none() {
            self.runtime_type = definition.runtime_type().cloned();
        }
        self.entries.insert(definition.type_id(), definition);
        Ok(true)
    }

    /// Fails if a description-different runtime definition is already bound.
    pub fn check_runtime_definition(&self, definition: &TypeDefinition) -> SchemaResult<()> {
        match &self.runtime_definition {
            Some(bound) if !bound.equals_description(definition) => {
                Err(SchemaError::RuntimeDefinitionConflict {
                    type_name: self.type_name.clone(),
                    existing: bound.type_id(),
                    incoming: definition.type_id(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Registers `definition` and binds it as the runtime definition.
    /// Returns whether anything changed.
    pub fn set_runtime_definition(
        &mut self,
        definition: Arc<TypeDefinition>,
    ) -> SchemaResult<bool> {
        self.check_runtime_definition(&definition)?;
        let added = self.register(Arc::clone(&definition))?;
        if self.runtime_definition.is_some() {
            return Ok(added);
        }
        let canonical = self
            .entries
            .get(&definition.type_id())
            .cloned()
            .unwrap_or(definition);
        self.runtime_definition = Some(canonical);
        Ok(true)
    }
}
