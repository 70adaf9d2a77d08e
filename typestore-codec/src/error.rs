//! Error types for the dictionary text codec.

use thiserror::Error;
use typestore_schema::{ErrorKind, SchemaError};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Malformed dictionary text. Every variant carries the character offset at
/// which the expected token was missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing type id at offset {offset}")]
    MissingTypeId { offset: usize },

    #[error("invalid type id {literal:?} at offset {offset}")]
    InvalidTypeId { offset: usize, literal: String },

    #[error("missing type name at offset {offset}")]
    MissingTypeName { offset: usize },

    #[error("missing type body at offset {offset}")]
    MissingTypeBody { offset: usize },

    #[error("missing member type at offset {offset}")]
    MissingMemberType { offset: usize },

    #[error("missing member name at offset {offset}")]
    MissingMemberName { offset: usize },

    #[error("missing primitive definition at offset {offset}")]
    MissingPrimitiveDefinition { offset: usize },

    #[error("unknown primitive definition {literal:?} at offset {offset}")]
    UnknownPrimitive { offset: usize, literal: String },

    #[error("missing complex member definition at offset {offset}")]
    MissingComplexDefinition { offset: usize },

    #[error("missing member terminator at offset {offset}")]
    MissingMemberTerminator { offset: usize },

    #[error("incomplete input at offset {offset}")]
    IncompleteInput { offset: usize },
}

impl ParseError {
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            Self::MissingTypeId { offset }
            | Self::InvalidTypeId { offset, .. }
            | Self::MissingTypeName { offset }
            | Self::MissingTypeBody { offset }
            | Self::MissingMemberType { offset }
            | Self::MissingMemberName { offset }
            | Self::MissingPrimitiveDefinition { offset }
            | Self::UnknownPrimitive { offset, .. }
            | Self::MissingComplexDefinition { offset }
            | Self::MissingMemberTerminator { offset }
            | Self::IncompleteInput { offset } => *offset,
        }
    }
}

/// Errors raised while turning dictionary text into a dictionary.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl CodecError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::Parse,
            Self::Schema(e) => e.kind(),
        }
    }
}
