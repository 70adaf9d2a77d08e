//! Persisted text form of typestore type dictionaries.
//!
//! [`TypeDictionaryCodec::parse`] turns text into [`TypeDictionaryEntry`]s,
//! [`TypeDictionaryCodec::build`] resolves them into definitions and
//! [`TypeDictionaryCodec::assemble`] writes a dictionary back in canonical form.
//! Assembled text parses back to a description-equal dictionary.

mod assembler;
mod codec;
mod entry;
mod error;
mod parser;

pub use assembler::{append_entry, assemble, assemble_definitions};
pub use codec::TypeDictionaryCodec;
pub use entry::{MemberEntry, TypeDictionaryEntry};
pub use error::{CodecError, CodecResult, ParseError};
pub use parser::parse;
