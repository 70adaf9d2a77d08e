//! Identifier strategies and resolution of refactoring entries against members.

use crate::error::{LegacyError, LegacyResult};
use crate::refactoring::RefactoringMapping;
use std::sync::Arc;
use tracing::debug;
use typestore_schema::symbols::qualified_name;
use typestore_schema::{TypeDefinition, TypeMember};

/// Ways of naming a member in a refactoring mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierStrategy {
    /// `TypeName#uniqueName`
    Global,
    /// `uniqueName`
    Internal,
    /// Bare simple name, only if no other member of the type shares it.
    UniqueUnqualified,
}

impl IdentifierStrategy {
    /// Strategies probed for legacy members, in priority order.
    pub const SOURCE_CHAIN: [IdentifierStrategy; 2] = [Self::Global, Self::Internal];

    /// Strategies probed for current members, in priority order.
    pub const TARGET_CHAIN: [IdentifierStrategy; 3] =
        [Self::Global, Self::Internal, Self::UniqueUnqualified];

    /// Builds the identifier of member `index` of `owner`, if this strategy applies.
    #[must_use]
    pub fn build(&self, owner: &TypeDefinition, index: usize) -> Option<String> {
        let member = owner.members().get(index)?;
        match self {
            Self::Global => Some(qualified_name(owner.type_name(), member.unique_name())),
            Self::Internal => Some(member.unique_name().to_owned()),
            Self::UniqueUnqualified => {
                let shared = owner
                    .members()
                    .iter()
                    .enumerate()
                    .any(|(i, other)| i != index && other.name() == member.name());
                (!shared).then(|| member.name().to_owned())
            }
        }
    }
}

/// What the refactoring mapping says about a legacy type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeResolution {
    Unchanged,
    Renamed(String),
    Deleted,
}

/// What the refactoring mapping says about one legacy member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberResolution {
    /// Explicitly removed.
    Deleted,
    /// Explicitly mapped to the current member at this index.
    Mapped(usize),
}

/// Resolves refactoring entries against legacy and current definitions.
#[derive(Debug, Clone)]
pub struct DescriptionResolver {
    mapping: Arc<RefactoringMapping>,
}

impl DescriptionResolver {
    #[must_use]
    pub fn new(mapping: Arc<RefactoringMapping>) -> Self {
        Self { mapping }
    }

    #[must_use]
    pub fn mapping(&self) -> &RefactoringMapping {
        &self.mapping
    }

    #[must_use]
    pub fn resolve_type(&self, legacy_type_name: &str) -> TypeResolution {
        match self.mapping.lookup(legacy_type_name) {
            None => TypeResolution::Unchanged,
            Some(None) => TypeResolution::Deleted,
            Some(Some(new_name)) => TypeResolution::Renamed(new_name.to_owned()),
        }
    }

    /// The type name a legacy type name was renamed to, if any.
    #[must_use]
    pub fn replacement_type_name(&self, legacy_type_name: &str) -> Option<&str> {
        self.mapping.lookup(legacy_type_name).flatten()
    }

    /// Whether current member `index` is explicitly marked new.
    #[must_use]
    pub fn is_new_current_member(&self, current: &TypeDefinition, index: usize) -> bool {
        IdentifierStrategy::TARGET_CHAIN
            .iter()
            .filter_map(|s| s.build(current, index))
            .any(|id| self.mapping.is_new_element(&id))
    }

    /// Probes the source chain for legacy member `index`; the first hit decides.
    /// `Ok(None)` means the mapping has no entry for the member.
    pub fn resolve_member(
        &self,
        legacy: &TypeDefinition,
        index: usize,
        current: &TypeDefinition,
    ) -> LegacyResult<Option<MemberResolution>> {
        for strategy in IdentifierStrategy::SOURCE_CHAIN {
            let Some(identifier) = strategy.build(legacy, index) else {
                continue;
            };
            let Some(target) = self.mapping.lookup(&identifier) else {
                continue;
            };
            let resolution = match target {
                None => MemberResolution::Deleted,
                Some(target) => {
                    MemberResolution::Mapped(self.resolve_target(legacy, index, current, target)?)
                }
            };
            debug!(
                type_name = %legacy.type_name(),
                member = %identifier,
                ?resolution,
                "Resolved explicit member mapping"
            );
            return Ok(Some(resolution));
        }
        Ok(None)
    }

    fn resolve_target(
        &self,
        legacy: &TypeDefinition,
        index: usize,
        current: &TypeDefinition,
        target: &str,
    ) -> LegacyResult<usize> {
        (0..current.members().len())
            .find(|&i| {
                IdentifierStrategy::TARGET_CHAIN
                    .iter()
                    .filter_map(|s| s.build(current, i))
                    .any(|id| id == target)
            })
            .ok_or_else(|| LegacyError::UnresolvableTarget {
                legacy_type: legacy.type_name().to_owned(),
                member: legacy.members()[index].unique_name().to_owned(),
                target: target.to_owned(),
                current_type: current.type_name().to_owned(),
            })
    }
}
