//! Handlers that load legacy records on behalf of a current type.

use crate::error::{LegacyError, LegacyResult};
use crate::handler::{DeletedTypeHandler, Instance, ObjectId, ReflectiveTypeHandler, TypeHandler};
use crate::layout;
use crate::result::LegacyTypeMappingResult;
use crate::translator::ValueTranslator;
use std::fmt;
use std::sync::Arc;
use typestore_schema::{RuntimeType, TypeDefinition, TypeId};

/// Where every legacy value goes in the current layout.
#[derive(Debug, Clone)]
pub struct TranslationPlan {
    legacy: Arc<TypeDefinition>,
    current: Arc<TypeDefinition>,
    targets: Vec<Option<usize>>,
    translator: Arc<dyn ValueTranslator>,
}

impl TranslationPlan {
    #[must_use]
    pub fn new(result: &LegacyTypeMappingResult, translator: Arc<dyn ValueTranslator>) -> Self {
        let legacy = Arc::clone(result.legacy_definition());
        let targets = (0..legacy.members().len())
            .map(|i| result.current_index_for(i))
            .collect();
        Self {
            legacy,
            current: Arc::clone(result.current_definition()),
            targets,
            translator,
        }
    }

    #[must_use]
    pub fn legacy_definition(&self) -> &Arc<TypeDefinition> {
        &self.legacy
    }

    #[must_use]
    pub fn current_definition(&self) -> &Arc<TypeDefinition> {
        &self.current
    }

    /// Target index of legacy member `index`; `None` for deleted members.
    #[must_use]
    pub fn target_of(&self, index: usize) -> Option<usize> {
        self.targets.get(index).copied().flatten()
    }

    /// Current values for a set of legacy values. Unmapped current members
    /// keep their zero value; deleted legacy values are dropped.
    pub fn translate_values(&self, legacy_values: &[Vec<u8>]) -> LegacyResult<Vec<Vec<u8>>> {
        let legacy_members = self.legacy.members();
        let current_members = self.current.members();
        let mut values: Vec<Vec<u8>> = current_members.iter().map(layout::default_value).collect();
        for (index, value) in legacy_values.iter().enumerate() {
            let Some(target) = self.target_of(index) else {
                continue;
            };
            values[target] =
                self.translator
                    .translate(&legacy_members[index], &current_members[target], value)?;
        }
        Ok(values)
    }

    /// Reads a record in the legacy layout into current values.
    pub fn read_legacy_record(&self, record: &[u8]) -> LegacyResult<Vec<Vec<u8>>> {
        let legacy_values =
            layout::read_record(self.legacy.type_name(), self.legacy.members(), record)?;
        self.translate_values(&legacy_values)
    }

    /// Rewrites a record from the legacy layout into the current layout.
    pub fn translate_record(&self, record: &[u8]) -> LegacyResult<Vec<u8>> {
        let values = self.read_legacy_record(record)?;
        Ok(layout::write_record(self.current.members(), &values))
    }

    fn visit_legacy_references(
        &self,
        record: &[u8],
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        layout::visit_record_references(
            self.legacy.type_name(),
            self.legacy.members(),
            record,
            visitor,
        )
    }
}

/// Legacy handler for a type whose layout only differs by member names.
/// Every operation goes straight to the current handler.
#[derive(Debug, Clone)]
pub struct DirectLegacyTypeHandler {
    legacy: Arc<TypeDefinition>,
    current: Arc<dyn TypeHandler>,
}

impl DirectLegacyTypeHandler {
    #[must_use]
    pub fn new(legacy: Arc<TypeDefinition>, current: Arc<dyn TypeHandler>) -> Self {
        Self { legacy, current }
    }

    #[must_use]
    pub fn current_handler(&self) -> &Arc<dyn TypeHandler> {
        &self.current
    }
}

impl TypeHandler for DirectLegacyTypeHandler {
    fn type_definition(&self) -> &Arc<TypeDefinition> {
        &self.legacy
    }

    fn runtime_type(&self) -> Option<&RuntimeType> {
        self.current.runtime_type()
    }

    fn create(&self, record: &[u8]) -> LegacyResult<Instance> {
        self.current.create(record)
    }

    fn update(&self, record: &[u8], instance: &mut Instance) -> LegacyResult<()> {
        self.current.update(record, instance)
    }

    fn store(&self, instance: &Instance) -> LegacyResult<Vec<u8>> {
        self.current.store(instance)
    }

    fn iterate_instance_references(
        &self,
        instance: &Instance,
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        self.current.iterate_instance_references(instance, visitor)
    }

    fn iterate_persisted_references(
        &self,
        record: &[u8],
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        self.current.iterate_persisted_references(record, visitor)
    }
}

/// Legacy handler in front of a hand-authored current handler: legacy records
/// are rewritten into the current layout before the current handler sees them.
#[derive(Debug, Clone)]
pub struct ReroutingLegacyTypeHandler {
    plan: TranslationPlan,
    current: Arc<dyn TypeHandler>,
}

impl ReroutingLegacyTypeHandler {
    #[must_use]
    pub fn new(plan: TranslationPlan, current: Arc<dyn TypeHandler>) -> Self {
        Self { plan, current }
    }
}

impl TypeHandler for ReroutingLegacyTypeHandler {
    fn type_definition(&self) -> &Arc<TypeDefinition> {
        self.plan.legacy_definition()
    }

    fn runtime_type(&self) -> Option<&RuntimeType> {
        self.current.runtime_type()
    }

    fn is_custom(&self) -> bool {
        true
    }

    fn create(&self, record: &[u8]) -> LegacyResult<Instance> {
        self.current.create(&self.plan.translate_record(record)?)
    }

    fn update(&self, record: &[u8], instance: &mut Instance) -> LegacyResult<()> {
        self.current.update(&self.plan.translate_record(record)?, instance)
    }

    fn store(&self, instance: &Instance) -> LegacyResult<Vec<u8>> {
        self.current.store(instance)
    }

    fn iterate_instance_references(
        &self,
        instance: &Instance,
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        self.current.iterate_instance_references(instance, visitor)
    }

    fn iterate_persisted_references(
        &self,
        record: &[u8],
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        self.plan.visit_legacy_references(record, visitor)
    }
}

/// Layout-driven legacy handler.
///
/// Reads legacy records member by member, places mapped values into their
/// current slots and leaves new members zeroed. Instances and stored records
/// use the current layout.
#[derive(Debug, Clone)]
pub struct ReflectiveLegacyTypeHandler {
    plan: TranslationPlan,
    current: ReflectiveTypeHandler,
}

impl ReflectiveLegacyTypeHandler {
    #[must_use]
    pub fn new(plan: TranslationPlan) -> Self {
        let current = ReflectiveTypeHandler::new(Arc::clone(plan.current_definition()));
        Self { plan, current }
    }

    fn current_type_id(&self) -> TypeId {
        self.plan.current_definition().type_id()
    }
}

impl TypeHandler for ReflectiveLegacyTypeHandler {
    fn type_definition(&self) -> &Arc<TypeDefinition> {
        self.plan.legacy_definition()
    }

    fn runtime_type(&self) -> Option<&RuntimeType> {
        self.plan.current_definition().runtime_type()
    }

    fn create(&self, record: &[u8]) -> LegacyResult<Instance> {
        let values = self.plan.read_legacy_record(record)?;
        Ok(Instance::with_values(self.current_type_id(), values))
    }

    fn update(&self, record: &[u8], instance: &mut Instance) -> LegacyResult<()> {
        let expected = self.plan.current_definition().members().len();
        if instance.values().len() != expected {
            return Err(LegacyError::InstanceShape {
                type_name: self.plan.current_definition().type_name().to_owned(),
                expected,
                actual: instance.values().len(),
            });
        }
        for (index, value) in self.plan.read_legacy_record(record)?.into_iter().enumerate() {
            instance.set_value(index, value);
        }
        Ok(())
    }

    fn store(&self, instance: &Instance) -> LegacyResult<Vec<u8>> {
        self.current.store(instance)
    }

    fn iterate_instance_references(
        &self,
        instance: &Instance,
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        self.current.iterate_instance_references(instance, visitor)
    }

    fn iterate_persisted_references(
        &self,
        record: &[u8],
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        self.plan.visit_legacy_references(record, visitor)
    }
}

/// The handler chosen for one legacy type.
#[derive(Debug, Clone)]
pub enum LegacyTypeHandler {
    /// Registered by hand for exactly this legacy shape.
    HandAuthored(Arc<dyn TypeHandler>),
    /// The type no longer exists.
    Deleted(DeletedTypeHandler),
    DirectWrapper(DirectLegacyTypeHandler),
    /// Derived for a hand-authored current handler.
    CustomDerived(Arc<dyn TypeHandler>),
    ReflectiveDerived(ReflectiveLegacyTypeHandler),
}

impl LegacyTypeHandler {
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::HandAuthored(_) => "hand-authored",
            Self::Deleted(_) => "deleted",
            Self::DirectWrapper(_) => "direct-wrapper",
            Self::CustomDerived(_) => "custom-derived",
            Self::ReflectiveDerived(_) => "reflective-derived",
        }
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }

    fn inner(&self) -> &dyn TypeHandler {
        match self {
            Self::HandAuthored(h) | Self::CustomDerived(h) => h.as_ref(),
            Self::Deleted(h) => h,
            Self::DirectWrapper(h) => h,
            Self::ReflectiveDerived(h) => h,
        }
    }
}

impl fmt::Display for LegacyTypeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let definition = self.type_definition();
        write!(
            f,
            "{} {} ({})",
            definition.type_id(),
            definition.type_name(),
            self.state_name()
        )
    }
}

impl TypeHandler for LegacyTypeHandler {
    fn type_definition(&self) -> &Arc<TypeDefinition> {
        self.inner().type_definition()
    }

    fn runtime_type(&self) -> Option<&RuntimeType> {
        self.inner().runtime_type()
    }

    fn is_custom(&self) -> bool {
        self.inner().is_custom()
    }

    fn create(&self, record: &[u8]) -> LegacyResult<Instance> {
        self.inner().create(record)
    }

    fn update(&self, record: &[u8], instance: &mut Instance) -> LegacyResult<()> {
        self.inner().update(record, instance)
    }

    fn store(&self, instance: &Instance) -> LegacyResult<Vec<u8>> {
        self.inner().store(instance)
    }

    fn iterate_instance_references(
        &self,
        instance: &Instance,
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        self.inner().iterate_instance_references(instance, visitor)
    }

    fn iterate_persisted_references(
        &self,
        record: &[u8],
        visitor: &mut dyn FnMut(ObjectId),
    ) -> LegacyResult<()> {
        self.inner().iterate_persisted_references(record, visitor)
    }
}
