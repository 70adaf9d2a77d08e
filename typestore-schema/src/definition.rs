use crate::capability::{MemberSource, RuntimeType};
use crate::error::{SchemaError, SchemaResult};
use crate::ids::TypeId;
use crate::member::{Member, TypeMember};
use std::collections::HashSet;

/// One frozen structural shape of a type, bound to a `(type_id, type_name)` pair.
///
/// Immutable once constructed. Members are unique by [`TypeMember::unique_name`],
/// and so are the nested members of every complex member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    type_id: TypeId,
    type_name: String,
    runtime_type: Option<RuntimeType>,
    members: Vec<Member>,
}

impl TypeDefinition {
    /// Creates a definition, rejecting duplicate member identities.
    pub fn new(
        type_id: TypeId,
        type_name: impl Into<String>,
        runtime_type: Option<RuntimeType>,
        members: Vec<Member>,
    ) -> SchemaResult<Self> {
        let type_name = type_name.into();
        validate_unique_names(&type_name, &members)?;
        Ok(Self {
            type_id,
            type_name,
            runtime_type,
            members,
        })
    }

    /// Builds the definition of a runtime type from its persistable members.
    pub fn for_runtime_type(
        type_id: TypeId,
        runtime_type: &RuntimeType,
        source: &dyn MemberSource,
    ) -> SchemaResult<Self> {
        let members = source.collect_persistable_members(runtime_type);
        Self::new(
            type_id,
            runtime_type.name(),
            Some(runtime_type.clone()),
            members,
        )
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn runtime_type(&self) -> Option<&RuntimeType> {
        self.runtime_type.as_ref()
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Members holding instance state, i.e. everything but a primitive definition.
    pub fn instance_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| !m.is_primitive_definition())
    }

    #[must_use]
    pub fn member_index(&self, unique_name: &str) -> Option<usize> {
        self.members
            .iter()
            .position(|m| m.unique_name() == unique_name)
    }

    #[must_use]
    pub fn member(&self, unique_name: &str) -> Option<&Member> {
        self.member_index(unique_name).map(|i| &self.members[i])
    }

    #[must_use]
    pub fn has_persisted_references(&self) -> bool {
        self.members.iter().any(TypeMember::has_references)
    }

    /// Exactly one member, and it is a primitive definition.
    #[must_use]
    pub fn is_primitive_type(&self) -> bool {
        matches!(self.members.as_slice(), [Member::Primitive(_)])
    }

    #[must_use]
    pub fn has_persisted_variable_length(&self) -> bool {
        self.members.iter().any(TypeMember::is_variable_length)
    }

    #[must_use]
    pub fn persistent_minimum_length(&self) -> u64 {
        self.members
            .iter()
            .fold(0u64, |sum, m| sum.saturating_add(m.persistent_minimum_length()))
    }

    #[must_use]
    pub fn persistent_maximum_length(&self) -> u64 {
        self.members
            .iter()
            .fold(0u64, |sum, m| sum.saturating_add(m.persistent_maximum_length()))
    }

    /// Same type name and pairwise description-equal members. Type ids and
    /// runtime types are not compared.
    #[must_use]
    pub fn equals_description(&self, other: &TypeDefinition) -> bool {
        self.type_name == other.type_name
            && members_equal_description(&self.members, &other.members)
    }
}

/// Pairwise [`Member::equals_description`] over two ordered member lists.
#[must_use]
pub fn members_equal_description(left: &[Member], right: &[Member]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(a, b)| a.equals_description(b))
}

fn validate_unique_names(type_name: &str, members: &[Member]) -> SchemaResult<()> {
    let mut seen = HashSet::with_capacity(members.len());
    for member in members {
        if !seen.insert(member.unique_name()) {
            return Err(SchemaError::DuplicateMember {
                type_name: type_name.to_owned(),
                unique_name: member.unique_name().to_owned(),
            });
        }
        if let Member::Complex(complex) = member {
            validate_unique_names(type_name, complex.members())?;
        }
    }
    Ok(())
}
