use typestore_schema::{
    LengthResolver, Member, PrimitiveKind, SchemaResult, TypeDefinition, TypeId, TypeMember,
    TypeNameResolver, VariableLengthKind,
};

/// A member as written in dictionary text, before length resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberEntry {
    Primitive(PrimitiveKind),
    Field {
        type_name: String,
        qualifier: String,
        name: String,
    },
    Simple {
        type_name: String,
        name: String,
    },
    VariableLength {
        kind: VariableLengthKind,
        name: String,
    },
    Complex {
        name: String,
        members: Vec<MemberEntry>,
    },
}

impl MemberEntry {
    pub fn to_member(&self, lengths: &dyn LengthResolver) -> Member {
        match self {
            Self::Primitive(kind) => Member::primitive(*kind, lengths),
            Self::Field {
                type_name,
                qualifier,
                name,
            } => Member::field(type_name.as_str(), qualifier.as_str(), name.as_str(), lengths),
            Self::Simple { type_name, name } => {
                Member::simple(type_name.as_str(), name.as_str(), lengths)
            }
            Self::VariableLength { kind, name } => {
                Member::variable_length(*kind, name.as_str(), lengths)
            }
            Self::Complex { name, members } => Member::complex(
                name.as_str(),
                members.iter().map(|m| m.to_member(lengths)).collect(),
                lengths,
            ),
        }
    }
}

impl From<&Member> for MemberEntry {
    fn from(member: &Member) -> Self {
        match member {
            Member::Primitive(primitive) => Self::Primitive(primitive.kind()),
            Member::Field(field) => Self::Field {
                type_name: field.type_name().to_owned(),
                qualifier: field.qualifier().unwrap_or_default().to_owned(),
                name: field.name().to_owned(),
            },
            Member::Simple(simple) => Self::Simple {
                type_name: simple.type_name().to_owned(),
                name: simple.name().to_owned(),
            },
            Member::VariableLength(variable) => Self::VariableLength {
                kind: variable.kind(),
                name: variable.name().to_owned(),
            },
            Member::Complex(complex) => Self::Complex {
                name: complex.name().to_owned(),
                members: complex.members().iter().map(Self::from).collect(),
            },
        }
    }
}

/// One parsed type entry: `<type id> <type name> { <members> }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDictionaryEntry {
    pub type_id: TypeId,
    pub type_name: String,
    pub members: Vec<MemberEntry>,
}

impl TypeDictionaryEntry {
    /// Builds the definition, resolving lengths and the runtime type.
    /// An unresolvable type name yields a definition without runtime type.
    pub fn to_definition(
        &self,
        lengths: &dyn LengthResolver,
        resolver: &dyn TypeNameResolver,
    ) -> SchemaResult<TypeDefinition> {
        TypeDefinition::new(
            self.type_id,
            self.type_name.as_str(),
            resolver.resolve(&self.type_name),
            self.members.iter().map(|m| m.to_member(lengths)).collect(),
        )
    }
}

impl From<&TypeDefinition> for TypeDictionaryEntry {
    fn from(definition: &TypeDefinition) -> Self {
        Self {
            type_id: definition.type_id(),
            type_name: definition.type_name().to_owned(),
            members: definition.members().iter().map(MemberEntry::from).collect(),
        }
    }
}
