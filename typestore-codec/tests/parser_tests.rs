use pretty_assertions::assert_eq;
use typestore_codec::{MemberEntry, ParseError, parse};
use typestore_schema::{PrimitiveKind, TypeId, VariableLengthKind};

// ── Well-formed input ────────────────────────────────────────────

#[test]
fn parses_every_member_form() {
    let text = "
        0000000000000000010 Person
        {
            String Person#name,
            long   size,
            [char] value,
            [list] entries
            (
                String key,
                Object value,
            ),
        }
        1 int { primitive 32 bit integer signed, }
    ";
    let entries = parse(text).unwrap();
    assert_eq!(entries.len(), 2);

    let person = &entries[0];
    assert_eq!(person.type_id, TypeId::new(10));
    assert_eq!(person.type_name, "Person");
    assert_eq!(
        person.members,
        vec![
            MemberEntry::Field {
                type_name: "String".into(),
                qualifier: "Person".into(),
                name: "name".into(),
            },
            MemberEntry::Simple {
                type_name: "long".into(),
                name: "size".into(),
            },
            MemberEntry::VariableLength {
                kind: VariableLengthKind::Chars,
                name: "value".into(),
            },
            MemberEntry::Complex {
                name: "entries".into(),
                members: vec![
                    MemberEntry::Simple {
                        type_name: "String".into(),
                        name: "key".into(),
                    },
                    MemberEntry::Simple {
                        type_name: "Object".into(),
                        name: "value".into(),
                    },
                ],
            },
        ]
    );
    assert_eq!(entries[1].members, vec![MemberEntry::Primitive(PrimitiveKind::Int)]);
}

#[test]
fn whitespace_between_tokens_is_free() {
    let compact = parse("3 Point{int x,int y,}").unwrap();
    let spaced = parse("3\nPoint\n{\n\tint x ,\n\tint y ,\n}\n").unwrap();
    assert_eq!(compact, spaced);
}

#[test]
fn whitespace_around_the_qualifier_separator_is_free() {
    let spaced = parse("5 Person { String Person # name , }").unwrap();
    let compact = parse("5 Person { String Person#name, }").unwrap();
    assert_eq!(spaced, compact);
    assert_eq!(
        spaced[0].members[0],
        MemberEntry::Field {
            type_name: "String".into(),
            qualifier: "Person".into(),
            name: "name".into(),
        }
    );
}

#[test]
fn semicolon_belongs_to_type_names() {
    let entries = parse("4 Holder { [Ljava.lang.Object; Holder#items, }").unwrap();
    assert_eq!(
        entries[0].members[0],
        MemberEntry::Field {
            type_name: "[Ljava.lang.Object;".into(),
            qualifier: "Holder".into(),
            name: "items".into(),
        }
    );
}

#[test]
fn empty_input_has_no_entries() {
    assert!(parse("  \n\t").unwrap().is_empty());
}

// ── Malformed input ──────────────────────────────────────────────

#[test]
fn missing_terminator_and_brace_fails_at_end() {
    let err = parse("5 Person { String name ").unwrap_err();
    assert_eq!(err, ParseError::MissingMemberTerminator { offset: 23 });
}

#[test]
fn missing_type_id() {
    assert_eq!(
        parse("Person { }").unwrap_err(),
        ParseError::MissingTypeId { offset: 0 }
    );
}

#[test]
fn missing_type_name() {
    assert_eq!(
        parse("5 { }").unwrap_err(),
        ParseError::MissingTypeName { offset: 2 }
    );
}

#[test]
fn missing_type_body() {
    assert_eq!(
        parse("5 Person String name, }").unwrap_err(),
        ParseError::MissingTypeBody { offset: 9 }
    );
}

#[test]
fn missing_member_name() {
    assert_eq!(
        parse("5 Person { String , }").unwrap_err(),
        ParseError::MissingMemberName { offset: 18 }
    );
}

#[test]
fn missing_member_type() {
    assert_eq!(
        parse("5 Person { , }").unwrap_err(),
        ParseError::MissingMemberType { offset: 11 }
    );
}

#[test]
fn missing_complex_parenthesis() {
    assert_eq!(
        parse("5 List { [list] entries String key, ), }").unwrap_err(),
        ParseError::MissingComplexDefinition { offset: 24 }
    );
}

#[test]
fn truncated_body_is_incomplete() {
    assert_eq!(
        parse("5 Person { String name,").unwrap_err(),
        ParseError::IncompleteInput { offset: 23 }
    );
}

#[test]
fn primitive_literal_is_fixed_vocabulary() {
    let err = parse("1 int { primitive 32 bit whole number, }").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnknownPrimitive {
            offset: 18,
            literal: "32 bit whole number".into()
        }
    );
    assert_eq!(
        parse("1 int { primitive , }").unwrap_err(),
        ParseError::MissingPrimitiveDefinition { offset: 18 }
    );
}

#[test]
fn errors_report_offset() {
    let err = parse("5 Person { String name ").unwrap_err();
    assert_eq!(err.offset(), 23);
    assert_eq!(err.to_string(), "missing member terminator at offset 23");
}
