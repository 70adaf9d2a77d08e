//! Property-based round-trip tests for the dictionary text codec.

use proptest::prelude::*;
use typestore_codec::{TypeDictionaryCodec, assemble};
use typestore_schema::{
    BinaryLengthResolver, Member, PrimitiveKind, TypeDefinition, TypeDictionary, TypeId,
    VariableLengthKind,
};

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_$.]{0,12}"
}

fn type_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("int".to_string()),
        Just("double".to_string()),
        Just("[Ljava.lang.Object;".to_string()),
        "[A-Z][a-zA-Z0-9.]{0,12}",
    ]
}

fn simple_member() -> impl Strategy<Value = Member> {
    prop_oneof![
        (type_name(), identifier()).prop_map(|(t, n)| Member::simple(t, n, &BinaryLengthResolver)),
        (any::<bool>(), identifier()).prop_map(|(bytes, n)| {
            let kind = if bytes { VariableLengthKind::Bytes } else { VariableLengthKind::Chars };
            Member::variable_length(kind, n, &BinaryLengthResolver)
        }),
    ]
}

fn member() -> impl Strategy<Value = Member> {
    prop_oneof![
        3 => (type_name(), "[A-Z][a-zA-Z0-9]{0,8}", identifier())
            .prop_map(|(t, q, n)| Member::field(t, q, n, &BinaryLengthResolver)),
        2 => simple_member(),
        1 => (identifier(), prop::collection::vec(simple_member(), 0..4))
            .prop_map(|(n, nested)| Member::complex(n, nested, &BinaryLengthResolver)),
    ]
}

fn definition(type_id: u64) -> impl Strategy<Value = Option<TypeDefinition>> {
    prop_oneof![
        1 => prop::sample::select(PrimitiveKind::ALL.to_vec()).prop_map(move |kind| {
            TypeDefinition::new(
                TypeId::new(type_id),
                kind.type_name(),
                None,
                vec![Member::primitive(kind, &BinaryLengthResolver)],
            )
            .ok()
        }),
        4 => ("[A-Z][a-zA-Z0-9.$]{0,16}", prop::collection::vec(member(), 0..6)).prop_map(
            move |(name, members)| {
                TypeDefinition::new(TypeId::new(type_id), name, None, members).ok()
            }
        ),
    ]
}

fn dictionary() -> impl Strategy<Value = TypeDictionary> {
    prop::collection::btree_set(1u64..1_000_000, 0..6)
        .prop_flat_map(|ids| ids.into_iter().map(definition).collect::<Vec<_>>())
        .prop_map(|definitions| {
            let dictionary = TypeDictionary::new();
            for definition in definitions.into_iter().flatten() {
                dictionary
                    .register_definition(definition)
                    .expect("type ids are distinct");
            }
            dictionary
        })
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn assembled_text_loads_description_equal(dictionary in dictionary()) {
        let codec = TypeDictionaryCodec::default();
        let text = assemble(&dictionary);
        let reloaded = codec.load(&text).unwrap();
        prop_assert!(reloaded.describes_same(&dictionary));
    }

    #[test]
    fn assembly_is_a_fixed_point(dictionary in dictionary()) {
        let codec = TypeDictionaryCodec::default();
        let once = assemble(&dictionary);
        let twice = assemble(&codec.load(&once).unwrap());
        prop_assert_eq!(once, twice);
    }
}
