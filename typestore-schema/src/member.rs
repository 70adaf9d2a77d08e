//! Member model: one persisted slot of a type definition.

use crate::capability::{LengthResolver, LengthSubject};
use crate::primitive::{PrimitiveKind, VariableLengthKind};
use crate::symbols::{self, KEYWORD_PRIMITIVE, TYPE_COMPLEX};

/// Accessors shared by every member variant.
pub trait TypeMember {
    /// Declared type name. Pseudo-fields report their marker, e.g. `[char]`.
    fn type_name(&self) -> &str;

    /// Simple name without qualifier.
    fn name(&self) -> &str;

    /// Declaring type of a field; `None` for everything else.
    fn qualifier(&self) -> Option<&str> {
        None
    }

    /// Identity key within one definition.
    fn unique_name(&self) -> &str {
        self.name()
    }

    fn persistent_minimum_length(&self) -> u64;

    fn persistent_maximum_length(&self) -> u64;

    /// Whether the slot itself stores an object id.
    fn is_reference(&self) -> bool;

    /// Whether the slot contains object ids anywhere, nested members included.
    fn has_references(&self) -> bool {
        self.is_reference()
    }

    fn is_fixed_length(&self) -> bool {
        self.persistent_minimum_length() == self.persistent_maximum_length()
    }

    fn is_variable_length(&self) -> bool {
        !self.is_fixed_length()
    }
}

/// `primitive <literal>,`: the sole member of a primitive type's definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveDefinition {
    kind: PrimitiveKind,
    length: u64,
}

impl PrimitiveDefinition {
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }
}

impl TypeMember for PrimitiveDefinition {
    fn type_name(&self) -> &str {
        KEYWORD_PRIMITIVE
    }

    fn name(&self) -> &str {
        self.kind.literal()
    }

    fn persistent_minimum_length(&self) -> u64 {
        self.length
    }

    fn persistent_maximum_length(&self) -> u64 {
        self.length
    }

    fn is_reference(&self) -> bool {
        false
    }
}

/// A declared field of a runtime type, written `type Owner#name,`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMember {
    type_name: String,
    qualifier: String,
    name: String,
    unique_name: String,
    is_reference: bool,
    min_length: u64,
    max_length: u64,
}

impl TypeMember for FieldMember {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn qualifier(&self) -> Option<&str> {
        Some(&self.qualifier)
    }

    fn unique_name(&self) -> &str {
        &self.unique_name
    }

    fn persistent_minimum_length(&self) -> u64 {
        self.min_length
    }

    fn persistent_maximum_length(&self) -> u64 {
        self.max_length
    }

    fn is_reference(&self) -> bool {
        self.is_reference
    }
}

/// A fixed-length slot without a runtime field counterpart, written `type name,`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplePseudoField {
    type_name: String,
    name: String,
    is_reference: bool,
    min_length: u64,
    max_length: u64,
}

impl TypeMember for SimplePseudoField {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn persistent_minimum_length(&self) -> u64 {
        self.min_length
    }

    fn persistent_maximum_length(&self) -> u64 {
        self.max_length
    }

    fn is_reference(&self) -> bool {
        self.is_reference
    }
}

/// Inlined byte or char payload, written `[byte] name,` or `[char] name,`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableLengthPseudoField {
    kind: VariableLengthKind,
    name: String,
    min_length: u64,
    max_length: u64,
}

impl VariableLengthPseudoField {
    #[must_use]
    pub fn kind(&self) -> VariableLengthKind {
        self.kind
    }
}

impl TypeMember for VariableLengthPseudoField {
    fn type_name(&self) -> &str {
        self.kind.marker()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn persistent_minimum_length(&self) -> u64 {
        self.min_length
    }

    fn persistent_maximum_length(&self) -> u64 {
        self.max_length
    }

    fn is_reference(&self) -> bool {
        false
    }
}

/// A list whose entries are laid out by nested members, written `[list] name ( ... ),`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexPseudoField {
    name: String,
    members: Vec<Member>,
    min_length: u64,
    max_length: u64,
}

impl ComplexPseudoField {
    /// Layout of one list entry.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

impl TypeMember for ComplexPseudoField {
    fn type_name(&self) -> &str {
        TYPE_COMPLEX
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn persistent_minimum_length(&self) -> u64 {
        self.min_length
    }

    fn persistent_maximum_length(&self) -> u64 {
        self.max_length
    }

    fn is_reference(&self) -> bool {
        false
    }

    fn has_references(&self) -> bool {
        self.members.iter().any(TypeMember::has_references)
    }
}

/// One slot of a type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Primitive(PrimitiveDefinition),
    Field(FieldMember),
    Simple(SimplePseudoField),
    VariableLength(VariableLengthPseudoField),
    Complex(ComplexPseudoField),
}

impl Member {
    #[must_use]
    pub fn primitive(kind: PrimitiveKind, lengths: &dyn LengthResolver) -> Self {
        Self::Primitive(PrimitiveDefinition {
            kind,
            length: lengths.minimum_length_for(LengthSubject::Primitive(kind)),
        })
    }

    /// A field `qualifier#name` of type `type_name`. Non-primitive types are references.
    #[must_use]
    pub fn field(
        type_name: impl Into<String>,
        qualifier: impl Into<String>,
        name: impl Into<String>,
        lengths: &dyn LengthResolver,
    ) -> Self {
        let type_name = type_name.into();
        let qualifier = qualifier.into();
        let name = name.into();
        let subject = LengthSubject::for_type_name(&type_name);
        Self::Field(FieldMember {
            unique_name: symbols::qualified_name(&qualifier, &name),
            is_reference: matches!(subject, LengthSubject::Reference),
            min_length: lengths.minimum_length_for(subject),
            max_length: lengths.maximum_length_for(subject),
            type_name,
            qualifier,
            name,
        })
    }

    #[must_use]
    pub fn simple(
        type_name: impl Into<String>,
        name: impl Into<String>,
        lengths: &dyn LengthResolver,
    ) -> Self {
        let type_name = type_name.into();
        let subject = LengthSubject::for_type_name(&type_name);
        Self::Simple(SimplePseudoField {
            is_reference: matches!(subject, LengthSubject::Reference),
            min_length: lengths.minimum_length_for(subject),
            max_length: lengths.maximum_length_for(subject),
            type_name,
            name: name.into(),
        })
    }

    #[must_use]
    pub fn variable_length(
        kind: VariableLengthKind,
        name: impl Into<String>,
        lengths: &dyn LengthResolver,
    ) -> Self {
        let subject = LengthSubject::VariableLength(kind);
        Self::VariableLength(VariableLengthPseudoField {
            kind,
            name: name.into(),
            min_length: lengths.minimum_length_for(subject),
            max_length: lengths.maximum_length_for(subject),
        })
    }

    #[must_use]
    pub fn complex(
        name: impl Into<String>,
        members: Vec<Member>,
        lengths: &dyn LengthResolver,
    ) -> Self {
        let subject = LengthSubject::Complex(&members);
        let min_length = lengths.minimum_length_for(subject);
        let max_length = lengths.maximum_length_for(subject);
        Self::Complex(ComplexPseudoField {
            name: name.into(),
            members,
            min_length,
            max_length,
        })
    }

    fn as_type_member(&self) -> &dyn TypeMember {
        match self {
            Self::Primitive(m) => m,
            Self::Field(m) => m,
            Self::Simple(m) => m,
            Self::VariableLength(m) => m,
            Self::Complex(m) => m,
        }
    }

    /// Nested entry layout of a complex member, empty otherwise.
    #[must_use]
    pub fn nested_members(&self) -> &[Member] {
        match self {
            Self::Complex(complex) => complex.members(),
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_primitive_definition(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Same variant tag, ignoring content.
    #[must_use]
    pub fn same_variant(&self, other: &Member) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Identity equality: same unique name.
    #[must_use]
    pub fn is_identical(&self, other: &Member) -> bool {
        self.unique_name() == other.unique_name()
    }

    /// Identity plus declared type, recursively for nested members.
    #[must_use]
    pub fn equals_description(&self, other: &Member) -> bool {
        self.same_variant(other)
            && self.is_identical(other)
            && self.type_name() == other.type_name()
            && self.nested_members().len() == other.nested_members().len()
            && self
                .nested_members()
                .iter()
                .zip(other.nested_members())
                .all(|(a, b)| a.equals_description(b))
    }

    /// Declared type and simple name, ignoring the qualifier.
    #[must_use]
    pub fn equals_structure(&self, other: &Member) -> bool {
        self.type_name() == other.type_name() && self.name() == other.name()
    }
}

impl TypeMember for Member {
    fn type_name(&self) -> &str {
        self.as_type_member().type_name()
    }

    fn name(&self) -> &str {
        self.as_type_member().name()
    }

    fn qualifier(&self) -> Option<&str> {
        self.as_type_member().qualifier()
    }

    fn unique_name(&self) -> &str {
        self.as_type_member().unique_name()
    }

    fn persistent_minimum_length(&self) -> u64 {
        self.as_type_member().persistent_minimum_length()
    }

    fn persistent_maximum_length(&self) -> u64 {
        self.as_type_member().persistent_maximum_length()
    }

    fn is_reference(&self) -> bool {
        self.as_type_member().is_reference()
    }

    fn has_references(&self) -> bool {
        self.as_type_member().has_references()
    }
}
