//! Literal tokens of the persisted dictionary format.

pub const TYPE_START: char = '{';
pub const TYPE_END: char = '}';
pub const MEMBER_FIELD_QUALIFIER_SEPARATOR: char = '#';
/// Member terminator. Not `;`, which occurs in array type names.
pub const MEMBER_TERMINATOR: char = ',';
pub const MEMBER_COMPLEX_DEF_START: char = '(';
pub const MEMBER_COMPLEX_DEF_END: char = ')';

pub const KEYWORD_PRIMITIVE: &str = "primitive";
pub const TYPE_BYTES: &str = "[byte]";
pub const TYPE_CHARS: &str = "[char]";
pub const TYPE_COMPLEX: &str = "[list]";

/// Characters that end a name token besides whitespace.
pub const fn is_delimiter(c: char) -> bool {
    matches!(
        c,
        TYPE_START
            | TYPE_END
            | MEMBER_FIELD_QUALIFIER_SEPARATOR
            | MEMBER_TERMINATOR
            | MEMBER_COMPLEX_DEF_START
            | MEMBER_COMPLEX_DEF_END
    )
}

/// `Owner#name`
#[must_use]
pub fn qualified_name(qualifier: &str, name: &str) -> String {
    format!("{qualifier}{MEMBER_FIELD_QUALIFIER_SEPARATOR}{name}")
}
