//! Legacy type mapper: one loader-time handler per outdated type definition.
//!
//! For every legacy definition the mapper resolves, in order:
//! 1. a cached handler from an earlier call
//! 2. a hand-authored legacy handler registered for exactly this shape
//! 3. the deleted handler when there is no current handler
//! 4. explicit refactoring entries, then heuristic matching of the rest
//!
//! The resulting [`LegacyTypeMappingResult`] goes through the result validator
//! and the [`LegacyTypeHandlerCreator`].

use crate::config::MappingConfig;
use crate::creator::LegacyTypeHandlerCreator;
use crate::derived::LegacyTypeHandler;
use crate::error::{LegacyError, LegacyResult};
use crate::handler::{DeletedTypeHandler, TypeHandler};
use crate::identifier::{DescriptionResolver, MemberResolution, TypeResolution};
use crate::refactoring::{LazyRefactoringProvider, RefactoringMappingProvider};
use crate::result::{LegacyTypeMappingResult, LoggingResultValidator, MappingResultValidator};
use crate::similarity::{MemberMatcher, MemberSimilator, Similarity, TypeSimilarityTable};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use typestore_schema::{
    PrimitiveOnlyResolver, TypeDefinition, TypeDictionary, TypeId, TypeMember, TypeNameResolver,
};

/// A hand-authored handler for one legacy shape.
///
/// The handler's own definition is the shape it reads. With a fixed type id,
/// the legacy definition under that id must have exactly that shape.
#[derive(Debug, Clone)]
pub struct CustomLegacyTypeHandler {
    fixed_type_id: Option<TypeId>,
    handler: Arc<dyn TypeHandler>,
}

impl CustomLegacyTypeHandler {
    #[must_use]
    pub fn new(handler: Arc<dyn TypeHandler>) -> Self {
        Self {
            fixed_type_id: None,
            handler,
        }
    }

    #[must_use]
    pub fn with_fixed_type_id(handler: Arc<dyn TypeHandler>, type_id: TypeId) -> Self {
        Self {
            fixed_type_id: Some(type_id),
            handler,
        }
    }

    #[must_use]
    pub fn fixed_type_id(&self) -> Option<TypeId> {
        self.fixed_type_id
    }

    #[must_use]
    pub fn handler(&self) -> &Arc<dyn TypeHandler> {
        &self.handler
    }

    fn matches(&self, legacy: &TypeDefinition) -> bool {
        self.handler.type_definition().equals_description(legacy)
    }
}

pub struct LegacyTypeMapper {
    refactoring: Arc<dyn RefactoringMappingProvider>,
    resolver: Arc<dyn TypeNameResolver>,
    type_similarity: TypeSimilarityTable,
    matcher: MemberMatcher,
    result_validator: Arc<dyn MappingResultValidator>,
    creator: LegacyTypeHandlerCreator,
    custom_handlers: Vec<CustomLegacyTypeHandler>,
    handlers: Mutex<HashMap<TypeId, Arc<LegacyTypeHandler>>>,
}

impl LegacyTypeMapper {
    #[must_use]
    pub fn new() -> Self {
        Self {
            refactoring: Arc::new(LazyRefactoringProvider::default()),
            resolver: Arc::new(PrimitiveOnlyResolver),
            type_similarity: TypeSimilarityTable::new(),
            matcher: MemberMatcher::default(),
            result_validator: Arc::new(LoggingResultValidator),
            creator: LegacyTypeHandlerCreator::default(),
            custom_handlers: Vec::new(),
            handlers: Mutex::new(HashMap::new()),
        }
    }

    /// Applies the refactoring entries, new-member markers, threshold and type
    /// similarity rows of `config`.
    #[must_use]
    pub fn with_config(self, config: &MappingConfig) -> Self {
        let matcher = MemberMatcher::new(config.similarity_threshold, self.matcher.validator());
        self.with_refactoring(Arc::new(LazyRefactoringProvider::from_mapping(
            config.refactoring_mapping(),
        )))
        .with_type_similarity(config.type_similarity_table())
        .with_matcher(matcher)
    }

    #[must_use]
    pub fn with_refactoring(mut self, provider: Arc<dyn RefactoringMappingProvider>) -> Self {
        self.refactoring = provider;
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn TypeNameResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn with_type_similarity(mut self, table: TypeSimilarityTable) -> Self {
        self.type_similarity = table;
        self
    }

    #[must_use]
    pub fn with_matcher(mut self, matcher: MemberMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    #[must_use]
    pub fn with_result_validator(mut self, validator: Arc<dyn MappingResultValidator>) -> Self {
        self.result_validator = validator;
        self
    }

    #[must_use]
    pub fn with_creator(mut self, creator: LegacyTypeHandlerCreator) -> Self {
        self.creator = creator;
        self
    }

    #[must_use]
    pub fn with_custom_handler(mut self, handler: CustomLegacyTypeHandler) -> Self {
        self.custom_handlers.push(handler);
        self
    }

    #[must_use]
    pub fn matcher(&self) -> &MemberMatcher {
        &self.matcher
    }

    /// Snapshot of the refactoring mapping, resolved against definitions.
    #[must_use]
    pub fn description_resolver(&self) -> DescriptionResolver {
        DescriptionResolver::new(self.refactoring.provide_refactoring_mapping())
    }

    /// Name of the current type `legacy_type_name` maps to; `None` when the
    /// type is deleted.
    #[must_use]
    pub fn current_type_name(&self, legacy_type_name: &str) -> Option<String> {
        current_type_name(&self.description_resolver(), legacy_type_name)
    }

    /// The cached handler for a legacy type id, if one was ensured.
    #[must_use]
    pub fn cached_handler(&self, type_id: TypeId) -> Option<Arc<LegacyTypeHandler>> {
        self.handlers.lock().get(&type_id).cloned()
    }

    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Returns the handler for `legacy`, deriving and caching it on first use.
    /// `current` is `None` when the type no longer exists.
    pub fn ensure_legacy_type_handler(
        &self,
        legacy: &Arc<TypeDefinition>,
        current: Option<Arc<dyn TypeHandler>>,
    ) -> LegacyResult<Arc<LegacyTypeHandler>> {
        if let Some(cached) = self.cached_handler(legacy.type_id()) {
            return Ok(cached);
        }

        let handler = match (self.find_custom_handler(legacy)?, current) {
            (Some(custom), _) => LegacyTypeHandler::HandAuthored(custom),
            (None, None) => LegacyTypeHandler::Deleted(DeletedTypeHandler::new(Arc::clone(legacy))),
            (None, Some(current)) => {
                let result = self.map_members(legacy, current)?;
                self.result_validator.validate(&result)?;
                self.creator.create(&result)?
            }
        };
        info!(
            type_id = %legacy.type_id(),
            type_name = %legacy.type_name(),
            state = handler.state_name(),
            "Ensured legacy type handler"
        );

        let mut handlers = self.handlers.lock();
        Ok(Arc::clone(
            handlers
                .entry(legacy.type_id())
                .or_insert_with(|| Arc::new(handler)),
        ))
    }

    /// Ensures a handler for every lineage entry that does not describe the
    /// lineage's current type. `lookup` yields the current handler of a type
    /// name; type-level refactoring entries rename or delete the type first.
    pub fn ensure_legacy_type_handlers<F>(
        &self,
        dictionary: &TypeDictionary,
        lookup: F,
    ) -> LegacyResult<Vec<Arc<LegacyTypeHandler>>>
    where
        F: Fn(&str) -> Option<Arc<dyn TypeHandler>>,
    {
        let descriptions = self.description_resolver();
        let mut ensured = Vec::new();
        for lineage in dictionary.lineages() {
            let current = current_type_name(&descriptions, lineage.type_name())
                .and_then(|name| lookup(&name));
            for entry in lineage.entries() {
                let is_current = lineage
                    .runtime_definition()
                    .is_some_and(|runtime| runtime.equals_description(entry))
                    || current
                        .as_ref()
                        .is_some_and(|handler| handler.type_definition().equals_description(entry));
                if is_current {
                    continue;
                }
                ensured.push(self.ensure_legacy_type_handler(entry, current.clone())?);
            }
        }
        Ok(ensured)
    }

    /// Computes the mapping result without deriving or caching a handler.
    pub fn map_members(
        &self,
        legacy: &Arc<TypeDefinition>,
        current: Arc<dyn TypeHandler>,
    ) -> LegacyResult<LegacyTypeMappingResult> {
        let descriptions = self.description_resolver();
        let current_definition = Arc::clone(current.type_definition());
        let legacy_members = legacy.members();
        let current_members = current_definition.members();

        let mut new_current: BTreeSet<usize> = (0..current_members.len())
            .filter(|&c| descriptions.is_new_current_member(&current_definition, c))
            .collect();
        let mut legacy_to_current = BTreeMap::new();
        let mut deleted_legacy = BTreeSet::new();
        let mut claimed: HashMap<usize, usize> = HashMap::new();
        let mut legacy_pool = Vec::new();

        for l in 0..legacy_members.len() {
            match descriptions.resolve_member(legacy, l, &current_definition)? {
                None => legacy_pool.push(l),
                Some(MemberResolution::Deleted) => {
                    deleted_legacy.insert(l);
                }
                Some(MemberResolution::Mapped(c)) => {
                    if new_current.contains(&c) {
                        return Err(LegacyError::MappedNewMember {
                            type_name: current_definition.type_name().to_owned(),
                            target: current_members[c].unique_name().to_owned(),
                        });
                    }
                    if let Some(&first) = claimed.get(&c) {
                        return Err(LegacyError::DuplicateMappingTarget {
                            type_name: legacy.type_name().to_owned(),
                            target: current_members[c].unique_name().to_owned(),
                            first: legacy_members[first].unique_name().to_owned(),
                            second: legacy_members[l].unique_name().to_owned(),
                        });
                    }
                    claimed.insert(c, l);
                    legacy_to_current.insert(l, (c, Similarity::Explicit));
                }
            }
        }

        let current_pool: Vec<usize> = (0..current_members.len())
            .filter(|c| !claimed.contains_key(c) && !new_current.contains(c))
            .collect();
        let similator = MemberSimilator {
            resolver: self.resolver.as_ref(),
            descriptions: &descriptions,
            table: &self.type_similarity,
        };
        let matches = self.matcher.match_members(
            legacy_members,
            &legacy_pool,
            current_members,
            &current_pool,
            &similator,
        );

        let mut matched_current = BTreeSet::new();
        for m in &matches {
            legacy_to_current.insert(m.legacy, (m.current, m.similarity));
            matched_current.insert(m.current);
        }
        deleted_legacy.extend(legacy_pool.iter().filter(|l| !legacy_to_current.contains_key(*l)));
        new_current.extend(current_pool.iter().filter(|c| !matched_current.contains(*c)));

        debug!(
            type_id = %legacy.type_id(),
            type_name = %legacy.type_name(),
            explicit = claimed.len(),
            matched = matches.len(),
            deleted = deleted_legacy.len(),
            added = new_current.len(),
            "Mapped legacy members"
        );

        Ok(LegacyTypeMappingResult::new(
            Arc::clone(legacy),
            current,
            legacy_to_current,
            deleted_legacy,
            new_current,
        ))
    }

    fn find_custom_handler(
        &self,
        legacy: &TypeDefinition,
    ) -> LegacyResult<Option<Arc<dyn TypeHandler>>> {
        if let Some(fixed) = self
            .custom_handlers
            .iter()
            .find(|c| c.fixed_type_id == Some(legacy.type_id()))
        {
            if !fixed.matches(legacy) {
                return Err(LegacyError::CustomHandlerMismatch {
                    type_id: legacy.type_id(),
                    type_name: legacy.type_name().to_owned(),
                });
            }
            return Ok(Some(Arc::clone(&fixed.handler)));
        }
        Ok(self
            .custom_handlers
            .iter()
            .find(|c| c.fixed_type_id.is_none() && c.matches(legacy))
            .map(|c| Arc::clone(&c.handler)))
    }
}

fn current_type_name(descriptions: &DescriptionResolver, legacy_type_name: &str) -> Option<String> {
    match descriptions.resolve_type(legacy_type_name) {
        TypeResolution::Unchanged => Some(legacy_type_name.to_owned()),
        TypeResolution::Renamed(new_name) => Some(new_name),
        TypeResolution::Deleted => None,
    }
}

impl Default for LegacyTypeMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LegacyTypeMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyTypeMapper")
            .field("threshold", &self.matcher.threshold())
            .field("type_similarity", &self.type_similarity.len())
            .field("custom_handlers", &self.custom_handlers.len())
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}
