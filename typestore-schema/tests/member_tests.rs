mod common;

use common::field;
use pretty_assertions::assert_eq;
use typestore_schema::{
    BinaryLengthResolver, Member, PrimitiveKind, TypeDefinition, TypeId, TypeMember,
    VariableLengthKind,
};

// ── Identity ─────────────────────────────────────────────────────

#[test]
fn unique_name_of_field_includes_declaring_type() {
    let member = field("int", "Person", "age");
    assert_eq!(member.unique_name(), "Person#age");
    assert_eq!(member.name(), "age");
}

#[test]
fn unique_name_of_pseudo_field_is_its_name() {
    let member = Member::simple("long", "size", &BinaryLengthResolver);
    assert_eq!(member.unique_name(), "size");
    assert_eq!(member.qualifier(), None);
}

#[test]
fn primitive_definition_is_named_by_literal() {
    let member = Member::primitive(PrimitiveKind::Int, &BinaryLengthResolver);
    assert_eq!(member.type_name(), "primitive");
    assert_eq!(member.name(), "32 bit integer signed");
    assert_eq!(member.persistent_minimum_length(), 4);
    assert!(member.is_fixed_length());
}

#[test]
fn fields_of_different_owners_are_not_identical() {
    let a = field("int", "Base", "id");
    let b = field("int", "Derived", "id");
    assert!(!a.is_identical(&b));
    assert!(a.equals_structure(&b));
}

// ── Description equality ─────────────────────────────────────────

#[test]
fn description_equality_compares_type_name() {
    let a = field("int", "Person", "age");
    let b = field("long", "Person", "age");
    assert!(a.is_identical(&b));
    assert!(!a.equals_description(&b));
}

#[test]
fn description_equality_recurses_into_complex_members() {
    let entry = |value_type: &str| {
        Member::complex(
            "entries",
            vec![
                Member::simple("String", "key", &BinaryLengthResolver),
                Member::simple(value_type, "value", &BinaryLengthResolver),
            ],
            &BinaryLengthResolver,
        )
    };
    assert!(entry("Object").equals_description(&entry("Object")));
    assert!(!entry("Object").equals_description(&entry("String")));
}

#[test]
fn variant_tag_is_part_of_description() {
    let simple = Member::simple("[char]", "value", &BinaryLengthResolver);
    let chars = Member::variable_length(VariableLengthKind::Chars, "value", &BinaryLengthResolver);
    assert!(!simple.equals_description(&chars));
}

// ── Lengths and references ───────────────────────────────────────

#[test]
fn references_are_eight_bytes() {
    let member = field("Address", "Person", "home");
    assert!(member.is_reference());
    assert_eq!(member.persistent_minimum_length(), 8);
    assert_eq!(member.persistent_maximum_length(), 8);
}

#[test]
fn complex_member_has_references_when_nested_member_does() {
    let with_ref = Member::complex(
        "elements",
        vec![Member::simple("Object", "element", &BinaryLengthResolver)],
        &BinaryLengthResolver,
    );
    let without_ref = Member::complex(
        "elements",
        vec![Member::simple("int", "element", &BinaryLengthResolver)],
        &BinaryLengthResolver,
    );
    assert!(!with_ref.is_reference());
    assert!(with_ref.has_references());
    assert!(!without_ref.has_references());
    assert!(with_ref.is_variable_length());
}

#[test]
fn definition_lengths_saturate() {
    let definition = TypeDefinition::new(
        TypeId::new(10),
        "Text",
        None,
        vec![
            Member::variable_length(VariableLengthKind::Chars, "a", &BinaryLengthResolver),
            Member::variable_length(VariableLengthKind::Chars, "b", &BinaryLengthResolver),
            Member::simple("int", "hash", &BinaryLengthResolver),
        ],
    )
    .unwrap();
    assert_eq!(definition.persistent_minimum_length(), 20);
    assert_eq!(definition.persistent_maximum_length(), u64::MAX);
    assert!(definition.has_persisted_variable_length());
    assert!(!definition.has_persisted_references());
}
