//! Type dictionary: the session-wide registry of all lineages.
//!
//! Every read and write goes through one [`parking_lot::Mutex`]. Registration
//! observers run after the lock is released.

use crate::capability::RuntimeType;
use crate::definition::TypeDefinition;
use crate::error::{SchemaError, SchemaResult};
use crate::ids::TypeId;
use crate::lineage::TypeLineage;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Notified once per definition newly added to a dictionary.
pub trait RegistrationObserver: Send + Sync {
    fn definition_registered(&self, definition: &Arc<TypeDefinition>);
}

impl<F> RegistrationObserver for F
where
    F: Fn(&Arc<TypeDefinition>) + Send + Sync,
{
    fn definition_registered(&self, definition: &Arc<TypeDefinition>) {
        self(definition);
    }
}

#[derive(Debug, Clone, Default)]
struct Tables {
    lineages: BTreeMap<String, TypeLineage>,
    by_type_id: BTreeMap<TypeId, Arc<TypeDefinition>>,
}

impl Tables {
    fn ensure_lineage(
        &mut self,
        type_name: &str,
        runtime_type: Option<&RuntimeType>,
    ) -> SchemaResult<&mut TypeLineage> {
        let lineage = self
            .lineages
            .entry(type_name.to_owned())
            .or_insert_with(|| TypeLineage::new(type_name, runtime_type.cloned()));
        match (lineage.runtime_type().cloned(), runtime_type) {
            (Some(existing), Some(requested)) if existing != *requested => {
                Err(SchemaError::RuntimeTypeMismatch {
                    type_name: type_name.to_owned(),
                    lineage: existing.name().to_owned(),
                    definition: requested.name().to_owned(),
                })
            }
            (None, Some(requested)) => {
                lineage.adopt_runtime_type(requested.clone());
                Ok(lineage)
            }
            _ => Ok(lineage),
        }
    }

    /// All checks run before the first mutation.
    fn register(&mut self, definition: &Arc<TypeDefinition>) -> SchemaResult<bool> {
        let type_id = definition.type_id();
        if !type_id.is_assigned() {
            return Err(SchemaError::UnassignedTypeId {
                type_name: definition.type_name().to_owned(),
            });
        }
        if let Some(existing) = self.by_type_id.get(&type_id) {
            if existing.type_name() != definition.type_name() {
                return Err(SchemaError::TypeIdConflict {
                    type_id,
                    existing: existing.type_name().to_owned(),
                    incoming: definition.type_name().to_owned(),
                });
            }
            if !existing.equals_description(definition) {
                return Err(SchemaError::DescriptionMismatch {
                    type_id,
                    type_name: definition.type_name().to_owned(),
                });
            }
            trace!(
                type_id = %type_id,
                type_name = %definition.type_name(),
                "Definition already registered"
            );
            return Ok(false);
        }
        if let Some(lineage) = self.lineages.get(definition.type_name()) {
            lineage.check(definition)?;
        }

        let lineage = self.ensure_lineage(definition.type_name(), definition.runtime_type())?;
        lineage.register(Arc::clone(definition))?;
        self.by_type_id.insert(type_id, Arc::clone(definition));
        debug!(
            type_id = %type_id,
            type_name = %definition.type_name(),
            "Registered type definition"
        );
        Ok(true)
    }

    /// Returns `(added, bound)`.
    fn register_runtime(&mut self, definition: &Arc<TypeDefinition>) -> SchemaResult<(bool, bool)> {
        if let Some(lineage) = self.lineages.get(definition.type_name()) {
            lineage.check_runtime_definition(definition)?;
        }
        let added = self.register(definition)?;
        let canonical = self
            .by_type_id
            .get(&definition.type_id())
            .cloned()
            .ok_or(SchemaError::UnknownTypeId(definition.type_id()))?;
        let lineage = self.ensure_lineage(definition.type_name(), definition.runtime_type())?;
        let already_bound = lineage.runtime_definition().is_some();
        lineage.set_runtime_definition(canonical)?;
        if !already_bound {
            debug!(
                type_id = %definition.type_id(),
                type_name = %definition.type_name(),
                "Bound runtime definition"
            );
        }
        Ok((added, !already_bound))
    }
}

/// Registry of all lineages of one persistence session plus a by-type-id index.
///
/// A type id maps to exactly one definition across the whole dictionary.
/// Batch registration is atomic: either every definition is accepted or the
/// dictionary is left unchanged.
#[derive(Default)]
pub struct TypeDictionary {
    tables: Mutex<Tables>,
    observer: Option<Arc<dyn RegistrationObserver>>,
}

impl fmt::Debug for TypeDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.lock();
        f.debug_struct("TypeDictionary")
            .field("lineages", &tables.lineages.len())
            .field("definitions", &tables.by_type_id.len())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl TypeDictionary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dictionary that reports every newly added definition.
    #[must_use]
    pub fn with_observer(observer: impl RegistrationObserver + 'static) -> Self {
        Self {
            tables: Mutex::default(),
            observer: Some(Arc::new(observer)),
        }
    }

    fn notify(&self, added: &[Arc<TypeDefinition>]) {
        if let Some(observer) = &self.observer {
            for definition in added {
                observer.definition_registered(definition);
            }
        }
    }

    /// Returns a snapshot of the lineage for `type_name`, creating it if absent.
    pub fn ensure_lineage(
        &self,
        type_name: &str,
        runtime_type: Option<&RuntimeType>,
    ) -> SchemaResult<TypeLineage> {
        let mut tables = self.tables.lock();
        Ok(tables.ensure_lineage(type_name, runtime_type)?.clone())
    }

    /// Registers one definition. Returns `false` if an equal one was present.
    pub fn register_definition(
        &self,
        definition: impl Into<Arc<TypeDefinition>>,
    ) -> SchemaResult<bool> {
        let definition = definition.into();
        let added = self.tables.lock().register(&definition)?;
        if added {
            self.notify(std::slice::from_ref(&definition));
        }
        Ok(added)
    }

    /// Registers all definitions or none.
    pub fn register_definitions<I>(&self, definitions: I) -> SchemaResult<bool>
    where
        I: IntoIterator,
        I::Item: Into<Arc<TypeDefinition>>,
    {
        self.register_batch(definitions, false)
    }

    /// Registers the definition and binds it as its lineage's runtime definition.
    pub fn register_runtime_definition(
        &self,
        definition: impl Into<Arc<TypeDefinition>>,
    ) -> SchemaResult<bool> {
        let definition = definition.into();
        let (added, bound) = self.tables.lock().register_runtime(&definition)?;
        if added {
            self.notify(std::slice::from_ref(&definition));
        }
        Ok(added || bound)
    }

    /// Runtime variant of [`Self::register_definitions`], also all or none.
    pub fn register_runtime_definitions<I>(&self, definitions: I) -> SchemaResult<bool>
    where
        I: IntoIterator,
        I::Item: Into<Arc<TypeDefinition>>,
    {
        self.register_batch(definitions, true)
    }

    fn register_batch<I>(&self, definitions: I, runtime: bool) -> SchemaResult<bool>
    where
        I: IntoIterator,
        I::Item: Into<Arc<TypeDefinition>>,
    {
        let definitions: Vec<Arc<TypeDefinition>> =
            definitions.into_iter().map(Into::into).collect();
        let mut added = Vec::new();
        let mut changed = false;
        {
            let mut tables = self.tables.lock();
            let mut staged = tables.clone();
            for definition in &definitions {
                let (was_added, was_bound) = if runtime {
                    staged.register_runtime(definition)?
                } else {
                    (staged.register(definition)?, false)
                };
                if was_added {
                    added.push(Arc::clone(definition));
                }
                changed |= was_added || was_bound;
            }
            *tables = staged;
        }
        self.notify(&added);
        Ok(changed)
    }

    #[must_use]
    pub fn lookup_by_id(&self, type_id: TypeId) -> Option<Arc<TypeDefinition>> {
        self.tables.lock().by_type_id.get(&type_id).cloned()
    }

    /// The latest definition of the lineage named `type_name`.
    #[must_use]
    pub fn lookup_by_name(&self, type_name: &str) -> Option<Arc<TypeDefinition>> {
        self.tables
            .lock()
            .lineages
            .get(type_name)
            .and_then(TypeLineage::latest)
            .cloned()
    }

    #[must_use]
    pub fn lookup_lineage(&self, type_name: &str) -> Option<TypeLineage> {
        self.tables.lock().lineages.get(type_name).cloned()
    }

    /// Snapshots of all lineages in type name order.
    #[must_use]
    pub fn lineages(&self) -> Vec<TypeLineage> {
        self.tables.lock().lineages.values().cloned().collect()
    }

    /// Highest registered type id, [`TypeId::UNASSIGNED`] when empty.
    #[must_use]
    pub fn highest_type_id(&self) -> TypeId {
        self.tables
            .lock()
            .by_type_id
            .keys()
            .next_back()
            .copied()
            .unwrap_or(TypeId::UNASSIGNED)
    }

    /// All definitions in ascending type id order.
    #[must_use]
    pub fn all_definitions(&self) -> Vec<Arc<TypeDefinition>> {
        self.tables.lock().by_type_id.values().cloned().collect()
    }

    #[must_use]
    pub fn latest_definitions(&self) -> Vec<Arc<TypeDefinition>> {
        self.tables
            .lock()
            .lineages
            .values()
            .filter_map(TypeLineage::latest)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn runtime_definitions(&self) -> Vec<Arc<TypeDefinition>> {
        self.tables
            .lock()
            .lineages
            .values()
            .filter_map(TypeLineage::runtime_definition)
            .cloned()
            .collect()
    }

    /// Looks up every id. An unknown id fails the whole call.
    pub fn resolve_type_ids(&self, type_ids: &[TypeId]) -> SchemaResult<Vec<Arc<TypeDefinition>>> {
        let tables = self.tables.lock();
        type_ids
            .iter()
            .map(|id| {
                tables
                    .by_type_id
                    .get(id)
                    .cloned()
                    .ok_or(SchemaError::UnknownTypeId(*id))
            })
            .collect()
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.lock().by_type_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.lock().by_type_id.is_empty()
    }

    /// Lineages with a bound runtime definition that their latest entry does not describe.
    #[must_use]
    pub fn invalid_lineages(&self) -> Vec<TypeLineage> {
        self.tables
            .lock()
            .lineages
            .values()
            .filter(|l| l.runtime_definition().is_some() && !l.is_valid())
            .cloned()
            .collect()
    }

    /// Same type ids, each bound to description-equal definitions.
    #[must_use]
    pub fn describes_same(&self, other: &TypeDictionary) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let left = self.all_definitions();
        let right = other.all_definitions();
        left.len() == right.len()
            && left
                .iter()
                .zip(&right)
                .all(|(a, b)| a.type_id() == b.type_id() && a.equals_description(b))
    }
}
