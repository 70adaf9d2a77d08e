mod common;

use common::{field, person_v1, person_v2};
use pretty_assertions::assert_eq;
use typestore_schema::{
    BinaryLengthResolver, ErrorKind, Member, MemberSource, PrimitiveKind, RuntimeType,
    RuntimeTypeRegistry, SchemaError, TypeDefinition, TypeId, TypeLineage, TypeNameResolver,
};

// ── Construction ─────────────────────────────────────────────────

#[test]
fn duplicate_unique_names_are_rejected() {
    let result = TypeDefinition::new(
        TypeId::new(1),
        "Person",
        None,
        vec![field("String", "Person", "name"), field("int", "Person", "name")],
    );
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        SchemaError::DuplicateMember { ref unique_name, .. } if unique_name == "Person#name"
    ));
    assert_eq!(err.kind(), ErrorKind::Consistency);
}

#[test]
fn same_simple_name_from_different_owners_is_allowed() {
    let definition = TypeDefinition::new(
        TypeId::new(1),
        "Derived",
        None,
        vec![field("int", "Base", "id"), field("int", "Derived", "id")],
    )
    .unwrap();
    assert_eq!(definition.member_index("Derived#id"), Some(1));
    assert_eq!(definition.member_index("id"), None);
}

#[test]
fn duplicate_nested_names_are_rejected() {
    let nested = vec![
        Member::simple("int", "key", &BinaryLengthResolver),
        Member::simple("long", "key", &BinaryLengthResolver),
    ];
    let result = TypeDefinition::new(
        TypeId::new(3),
        "Map",
        None,
        vec![Member::complex("entries", nested, &BinaryLengthResolver)],
    );
    assert!(matches!(result, Err(SchemaError::DuplicateMember { .. })));
}

#[test]
fn primitive_type_has_exactly_one_primitive_member() {
    let int = TypeDefinition::new(
        TypeId::new(2),
        "int",
        None,
        vec![Member::primitive(PrimitiveKind::Int, &BinaryLengthResolver)],
    )
    .unwrap();
    assert!(int.is_primitive_type());
    assert_eq!(int.instance_members().count(), 0);
    assert!(!person_v1(5).is_primitive_type());
}

// ── Description equality ─────────────────────────────────────────

#[test]
fn description_equality_ignores_type_id() {
    assert!(person_v1(5).equals_description(&person_v1(9)));
    assert!(!person_v1(5).equals_description(&person_v2(5)));
}

// ── Runtime types ────────────────────────────────────────────────

#[test]
fn runtime_definition_uses_member_source() {
    let mut registry = RuntimeTypeRegistry::new();
    let person = registry.register(
        "Person",
        vec![field("String", "Person", "givenName"), field("String", "Person", "lastName")],
    );
    let definition = TypeDefinition::for_runtime_type(TypeId::new(6), &person, &registry).unwrap();
    assert_eq!(definition.type_name(), "Person");
    assert_eq!(definition.runtime_type(), Some(&person));
    assert!(definition.equals_description(&person_v2(6)));
}

#[test]
fn registry_resolves_primitives_and_aliases() {
    let mut registry = RuntimeTypeRegistry::new();
    registry.register("Customer", Vec::new());
    registry.register_alias("Client", "Customer");

    assert_eq!(registry.resolve("int"), Some(RuntimeType::new("int")));
    assert_eq!(registry.resolve("Client"), Some(RuntimeType::new("Customer")));
    assert_eq!(registry.resolve("Vanished"), None);
    assert!(registry.collect_persistable_members(&RuntimeType::new("Vanished")).is_empty());
}

// ── Lineage ──────────────────────────────────────────────────────

#[test]
fn lineage_latest_is_highest_type_id() {
    let mut lineage = TypeLineage::new("Person", None);
    assert!(lineage.register(person_v2(9)).unwrap());
    assert!(lineage.register(person_v1(5)).unwrap());
    assert_eq!(lineage.latest().map(|d| d.type_id()), Some(TypeId::new(9)));
    let ids: Vec<u64> = lineage.entries().map(|d| d.type_id().value()).collect();
    assert_eq!(ids, vec![5, 9]);
}

#[test]
fn lineage_rejects_foreign_type_name() {
    let mut lineage = TypeLineage::new("Address", None);
    let err = lineage.register(person_v1(5)).unwrap_err();
    assert!(matches!(err, SchemaError::LineageMismatch { .. }));
}

#[test]
fn lineage_is_valid_when_latest_matches_runtime() {
    let mut lineage = TypeLineage::new("Person", None);
    lineage.register(person_v1(5)).unwrap();
    assert!(!lineage.is_valid());
    lineage.set_runtime_definition(person_v2(6)).unwrap();
    assert!(lineage.is_valid());
}

#[test]
fn lineage_runtime_definition_binds_once() {
    let mut lineage = TypeLineage::new("Person", None);
    assert!(lineage.set_runtime_definition(person_v2(6)).unwrap());
    assert!(!lineage.set_runtime_definition(person_v2(6)).unwrap());
    let err = lineage.set_runtime_definition(person_v1(7)).unwrap_err();
    assert!(matches!(err, SchemaError::RuntimeDefinitionConflict { .. }));
}
