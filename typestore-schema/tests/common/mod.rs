#![allow(dead_code)]

use std::sync::Arc;
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

/// `Person { String firstName, String lastName }`
pub fn person_v1(type_id: u64) -> Arc<TypeDefinition> {
    definition(
        type_id,
        "Person",
        vec![
            field("String", "Person", "firstName"),
            field("String", "Person", "lastName"),
        ],
    )
}

/// `Person { String givenName, String lastName }`
pub fn person_v2(type_id: u64) -> Arc<TypeDefinition> {
    definition(
        type_id,
        "Person",
        vec![
            field("String", "Person", "givenName"),
            field("String", "Person", "lastName"),
        ],
    )
}
