use crate::assembler;
use crate::entry::TypeDictionaryEntry;
use crate::error::{CodecResult, ParseError};
use crate::parser;
use std::sync::Arc;
use tracing::debug;
use typestore_schema::{
    BinaryLengthResolver, LengthResolver, PrimitiveOnlyResolver, SchemaResult, TypeDefinition,
    TypeDictionary, TypeNameResolver,
};

/// Converts dictionaries to and from their persisted text form.
///
/// Holds the capabilities needed to turn parsed entries into definitions.
#[derive(Clone)]
pub struct TypeDictionaryCodec {
    lengths: Arc<dyn LengthResolver>,
    resolver: Arc<dyn TypeNameResolver>,
}

impl Default for TypeDictionaryCodec {
    fn default() -> Self {
        Self::new(Arc::new(BinaryLengthResolver), Arc::new(PrimitiveOnlyResolver))
    }
}

impl TypeDictionaryCodec {
    #[must_use]
    pub fn new(lengths: Arc<dyn LengthResolver>, resolver: Arc<dyn TypeNameResolver>) -> Self {
        Self { lengths, resolver }
    }

    pub fn parse(&self, text: &str) -> Result<Vec<TypeDictionaryEntry>, ParseError> {
        parser::parse(text)
    }

    #[must_use]
    pub fn assemble(&self, dictionary: &TypeDictionary) -> String {
        assembler::assemble(dictionary)
    }

    /// Builds definitions from parsed entries, keeping entry order.
    pub fn build(&self, entries: &[TypeDictionaryEntry]) -> SchemaResult<Vec<TypeDefinition>> {
        entries
            .iter()
            .map(|e| e.to_definition(self.lengths.as_ref(), self.resolver.as_ref()))
            .collect()
    }

    /// Parses `text` and registers every entry into a new dictionary.
    pub fn load(&self, text: &str) -> CodecResult<TypeDictionary> {
        let dictionary = TypeDictionary::new();
        self.load_into(text, &dictionary)?;
        Ok(dictionary)
    }

    /// Parses `text` and registers all entries into `dictionary`, all or none.
    /// Returns whether the dictionary changed.
    pub fn load_into(&self, text: &str, dictionary: &TypeDictionary) -> CodecResult<bool> {
        let entries = self.parse(text)?;
        let definitions = self.build(&entries)?;
        let changed = dictionary.register_definitions(definitions)?;
        debug!(entries = entries.len(), changed, "Loaded type dictionary text");
        Ok(changed)
    }
}
