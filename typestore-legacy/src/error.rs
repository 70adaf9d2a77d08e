//! Error types for legacy type mapping.

use std::path::PathBuf;
use thiserror::Error;
use typestore_schema::{ErrorKind, SchemaError, TypeId};

/// Result type for legacy mapping operations.
pub type LegacyResult<T> = Result<T, LegacyError>;

#[derive(Debug, Error)]
pub enum LegacyError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Two legacy members resolve to the same current member.
    #[error("duplicate member mapping onto {target} in {type_name}: {first} and {second}")]
    DuplicateMappingTarget {
        type_name: String,
        target: String,
        first: String,
        second: String,
    },

    /// An explicit mapping targets a member marked as new.
    #[error("duplicate target entry {target} for type {type_name}: member is marked new")]
    MappedNewMember { type_name: String, target: String },

    #[error("unresolvable refactoring mapping {legacy_type}#{member} -> {target:?} in type {current_type}")]
    UnresolvableTarget {
        legacy_type: String,
        member: String,
        target: String,
        current_type: String,
    },

    /// A hand-authored legacy handler claims a type id whose structure it does not match.
    #[error("legacy handler structure mismatch for type id {type_id} ({type_name})")]
    CustomHandlerMismatch { type_id: TypeId, type_name: String },

    #[error("{operation} is not supported for {type_name}")]
    UnsupportedOperation {
        operation: &'static str,
        type_name: String,
    },

    #[error("record of {type_name} ends at offset {offset}, {needed} more bytes needed")]
    TruncatedRecord {
        type_name: String,
        offset: usize,
        needed: u64,
    },

    #[error("record of {type_name} has {remaining} trailing bytes")]
    TrailingBytes { type_name: String, remaining: usize },

    #[error("instance of {type_name} holds {actual} values, expected {expected}")]
    InstanceShape {
        type_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid mapping configuration: {0}")]
    Config(String),

    #[error("cannot read mapping configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed mapping configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LegacyError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(e) => e.kind(),
            Self::DuplicateMappingTarget { .. }
            | Self::MappedNewMember { .. }
            | Self::CustomHandlerMismatch { .. }
            | Self::TruncatedRecord { .. }
            | Self::TrailingBytes { .. }
            | Self::InstanceShape { .. } => ErrorKind::Consistency,
            Self::UnresolvableTarget { .. } => ErrorKind::Resolution,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::Config(_) | Self::Io { .. } | Self::Toml(_) => ErrorKind::Configuration,
        }
    }
}
