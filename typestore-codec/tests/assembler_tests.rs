use pretty_assertions::assert_eq;
use std::sync::Arc;
use typestore_codec::{CodecError, TypeDictionaryCodec, assemble};
use typestore_schema::{
    BinaryLengthResolver, ErrorKind, Member, PrimitiveKind, RuntimeType, RuntimeTypeRegistry,
    TypeDefinition, TypeDictionary, TypeId, VariableLengthKind,
};

fn sample_dictionary() -> TypeDictionary {
    let lengths = BinaryLengthResolver;
    let dictionary = TypeDictionary::new();
    dictionary
        .register_definitions([
            TypeDefinition::new(
                TypeId::new(12),
                "Person",
                None,
                vec![
                    Member::field("String", "Person", "name", &lengths),
                    Member::field("int", "Person", "age", &lengths),
                    Member::complex(
                        "tags",
                        vec![Member::variable_length(VariableLengthKind::Chars, "tag", &lengths)],
                        &lengths,
                    ),
                ],
            )
            .unwrap(),
            TypeDefinition::new(
                TypeId::new(1),
                "int",
                None,
                vec![Member::primitive(PrimitiveKind::Int, &lengths)],
            )
            .unwrap(),
        ])
        .unwrap();
    dictionary
}

// ── Layout ───────────────────────────────────────────────────────

#[test]
fn assembles_in_type_id_order_with_aligned_columns() {
    let expected = "\
0000000000000000001 int
{
\tprimitive 32 bit integer signed,
}
0000000000000000012 Person
{
\tString Person#name,
\tint    Person#age,
\t[list] tags
\t(
\t\t[char] tag,
\t),
}
";
    assert_eq!(assemble(&sample_dictionary()), expected);
}

#[test]
fn empty_dictionary_assembles_to_empty_text() {
    assert_eq!(assemble(&TypeDictionary::new()), "");
}

// ── Round trip ───────────────────────────────────────────────────

#[test]
fn load_of_assembled_text_describes_same_dictionary() {
    let codec = TypeDictionaryCodec::default();
    let original = sample_dictionary();
    let reloaded = codec.load(&codec.assemble(&original)).unwrap();
    assert!(reloaded.describes_same(&original));
    assert_eq!(codec.assemble(&reloaded), codec.assemble(&original));
}

#[test]
fn load_resolves_runtime_types() {
    let mut registry = RuntimeTypeRegistry::new();
    registry.register("Person", Vec::new());
    let codec = TypeDictionaryCodec::new(Arc::new(BinaryLengthResolver), Arc::new(registry));
    let dictionary = codec.load(&assemble(&sample_dictionary())).unwrap();
    let person = dictionary.lookup_by_name("Person").unwrap();
    assert_eq!(person.runtime_type(), Some(&RuntimeType::new("Person")));
}

// ── Failures ─────────────────────────────────────────────────────

#[test]
fn load_leaves_nothing_behind_on_conflict() {
    let codec = TypeDictionaryCodec::default();
    let dictionary = TypeDictionary::new();
    let text = "5 Person { String Person#name, }\n5 Address { String Address#street, }";
    let err = codec.load_into(text, &dictionary).unwrap_err();
    assert!(matches!(err, CodecError::Schema(_)));
    assert_eq!(err.kind(), ErrorKind::Consistency);
    assert!(dictionary.is_empty());
}

#[test]
fn parse_failure_returns_no_entries() {
    let codec = TypeDictionaryCodec::default();
    let err = codec.load("1 A { int A#x, }\n5 Person { String name ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}
