#![allow(dead_code)]

use std::sync::Arc;
use typestore_legacy::{LegacyTypeMapper, RefactoringMapping, ReflectiveTypeHandler, TypeHandler};
use typestore_schema::{BinaryLengthResolver, Member, TypeDefinition, TypeId};

pub fn field(type_name: &str, owner: &str, name: &str) -> Member {
    Member::field(type_name, owner, name, &BinaryLengthResolver)
}

pub fn definition(type_id: u64, type_name: &str, members: Vec<Member>) -> Arc<TypeDefinition> {
    Arc::new(
        TypeDefinition::new(TypeId::new(type_id), type_name, None, members)
            .expect("valid test definition"),
    )
}

/// `Person` with `String` fields of the given names.
pub fn person(type_id: u64, names: &[&str]) -> Arc<TypeDefinition> {
    definition(
        type_id,
        "Person",
        names.iter().map(|n| field("String", "Person", n)).collect(),
    )
}

pub fn reflective(definition: &Arc<TypeDefinition>) -> Arc<dyn TypeHandler> {
    Arc::new(ReflectiveTypeHandler::new(Arc::clone(definition)))
}

pub fn mapper_with(entries: &[(&str, &str)]) -> LegacyTypeMapper {
    mapper_with_mapping(RefactoringMapping::from_entries(entries.iter().copied()))
}

pub fn mapper_with_mapping(mapping: RefactoringMapping) -> LegacyTypeMapper {
    LegacyTypeMapper::new().with_refactoring(Arc::new(
        typestore_legacy::LazyRefactoringProvider::from_mapping(mapping),
    ))
}

pub fn reference(id: u64) -> Vec<u8> {
    id.to_le_bytes().to_vec()
}
