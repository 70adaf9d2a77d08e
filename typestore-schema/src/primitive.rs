//! Fixed vocabulary of primitive kinds and variable-length markers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A primitive value kind as written in `primitive <literal>,` members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Byte,
    Boolean,
    Short,
    Char,
    Int,
    Float,
    Long,
    Double,
    Void,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 9] = [
        Self::Byte,
        Self::Boolean,
        Self::Short,
        Self::Char,
        Self::Int,
        Self::Float,
        Self::Long,
        Self::Double,
        Self::Void,
    ];

    /// The dictionary literal, e.g. `32 bit integer signed`.
    #[must_use]
    pub const fn literal(&self) -> &'static str {
        match self {
            Self::Byte => "8 bit integer signed",
            Self::Boolean => "1 bit boolean",
            Self::Short => "16 bit integer signed",
            Self::Char => "16 bit character unsigned",
            Self::Int => "32 bit integer signed",
            Self::Float => "32 bit decimal IEEE754",
            Self::Long => "64 bit integer signed",
            Self::Double => "64 bit decimal IEEE754",
            Self::Void => "0 bit void",
        }
    }

    /// The type name used for fields of this kind, e.g. `int`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Boolean => "boolean",
            Self::Short => "short",
            Self::Char => "char",
            Self::Int => "int",
            Self::Float => "float",
            Self::Long => "long",
            Self::Double => "double",
            Self::Void => "void",
        }
    }

    /// Persisted width in bytes.
    #[must_use]
    pub const fn byte_width(&self) -> u64 {
        match self {
            Self::Byte | Self::Boolean => 1,
            Self::Short | Self::Char => 2,
            Self::Int | Self::Float => 4,
            Self::Long | Self::Double => 8,
            Self::Void => 0,
        }
    }

    /// Looks up a kind by its dictionary literal. Whitespace runs inside the
    /// literal are normalized to single spaces.
    #[must_use]
    pub fn from_literal(literal: &str) -> Option<Self> {
        let normalized = literal.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::ALL.into_iter().find(|k| k.literal() == normalized)
    }

    #[must_use]
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == type_name)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Marker of a non-complex variable-length pseudo-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableLengthKind {
    /// `[byte]`
    Bytes,
    /// `[char]`
    Chars,
}

impl VariableLengthKind {
    #[must_use]
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Bytes => crate::symbols::TYPE_BYTES,
            Self::Chars => crate::symbols::TYPE_CHARS,
        }
    }

    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            crate::symbols::TYPE_BYTES => Some(Self::Bytes),
            crate::symbols::TYPE_CHARS => Some(Self::Chars),
            _ => None,
        }
    }
}
