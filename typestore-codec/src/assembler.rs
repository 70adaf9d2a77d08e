//! Canonical text form of a dictionary.
//!
//! ```text
//! 0000000000000000005 Person
//! {
//!     String   Person#firstName,
//!     [list]   entries
//!     (
//!         String key,
//!     ),
//! }
//! ```
//!
//! Members are tab-indented with the type column padded per member list.

use crate::entry::{MemberEntry, TypeDictionaryEntry};
use std::fmt::Write;
use typestore_schema::symbols::{
    KEYWORD_PRIMITIVE, MEMBER_COMPLEX_DEF_END, MEMBER_COMPLEX_DEF_START,
    MEMBER_FIELD_QUALIFIER_SEPARATOR, MEMBER_TERMINATOR, TYPE_COMPLEX, TYPE_END, TYPE_START,
};
use typestore_schema::{TypeDefinition, TypeDictionary};

const INDENT: char = '\t';

/// Assembles all definitions of `dictionary` in ascending type id order.
#[must_use]
pub fn assemble(dictionary: &TypeDictionary) -> String {
    let definitions = dictionary.all_definitions();
    assemble_definitions(definitions.iter().map(|d| d.as_ref()))
}

/// Assembles the given definitions in iteration order.
pub fn assemble_definitions<'a>(
    definitions: impl IntoIterator<Item = &'a TypeDefinition>,
) -> String {
    let mut out = String::new();
    for definition in definitions {
        append_entry(&mut out, &TypeDictionaryEntry::from(definition));
    }
    out
}

/// Appends one entry followed by a newline.
pub fn append_entry(out: &mut String, entry: &TypeDictionaryEntry) {
    let _ = writeln!(out, "{} {}", entry.type_id.to_padded_string(), entry.type_name);
    out.push(TYPE_START);
    out.push('\n');
    append_members(out, &entry.members, 1);
    out.push(TYPE_END);
    out.push('\n');
}

fn member_type(member: &MemberEntry) -> &str {
    match member {
        MemberEntry::Primitive(_) => KEYWORD_PRIMITIVE,
        MemberEntry::Field { type_name, .. } | MemberEntry::Simple { type_name, .. } => {
            type_name.as_str()
        }
        MemberEntry::VariableLength { kind, .. } => kind.marker(),
        MemberEntry::Complex { .. } => TYPE_COMPLEX,
    }
}

fn append_members(out: &mut String, members: &[MemberEntry], depth: usize) {
    let width = members
        .iter()
        .map(|m| member_type(m).chars().count())
        .max()
        .unwrap_or(0);

    for member in members {
        indent(out, depth);
        let _ = write!(out, "{:<width$} ", member_type(member));
        match member {
            MemberEntry::Primitive(kind) => out.push_str(kind.literal()),
            MemberEntry::Field {
                qualifier, name, ..
            } => {
                out.push_str(qualifier);
                out.push(MEMBER_FIELD_QUALIFIER_SEPARATOR);
                out.push_str(name);
            }
            MemberEntry::Simple { name, .. } | MemberEntry::VariableLength { name, .. } => {
                out.push_str(name);
            }
            MemberEntry::Complex { name, members } => {
                out.push_str(name);
                out.push('\n');
                indent(out, depth);
                out.push(MEMBER_COMPLEX_DEF_START);
                out.push('\n');
                append_members(out, members, depth + 1);
                indent(out, depth);
                out.push(MEMBER_COMPLEX_DEF_END);
            }
        }
        out.push(MEMBER_TERMINATOR);
        out.push('\n');
    }
}

fn indent(out: &mut String, depth: usize) {
    out.extend(std::iter::repeat_n(INDENT, depth));
}
