//! Mapping configuration loaded from a TOML file.
//!
//! ```toml
//! similarity_threshold = 0.6
//! new_members = ["Person#Person#nickname"]
//!
//! [refactoring]
//! "Person#firstName" = "Person#givenName"
//! "Person#age" = ""
//!
//! [[type_similarity]]
//! types = ["int", "long"]
//! score = 0.8
//! ```

use crate::error::{LegacyError, LegacyResult};
use crate::refactoring::RefactoringMapping;
use crate::similarity::{MemberMatcher, TypeSimilarityTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// One `[[type_similarity]]` row. Lookups are symmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSimilarityRow {
    pub types: [String; 2],
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Old identifier to new identifier; an empty value deletes.
    #[serde(default)]
    pub refactoring: BTreeMap<String, String>,
    #[serde(default)]
    pub new_members: Vec<String>,
    #[serde(default)]
    pub type_similarity: Vec<TypeSimilarityRow>,
}

fn default_similarity_threshold() -> f64 {
    MemberMatcher::DEFAULT_THRESHOLD
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            refactoring: BTreeMap::new(),
            new_members: Vec::new(),
            type_similarity: Vec::new(),
        }
    }
}

impl MappingConfig {
    /// Loads and validates the configuration at `path`. A missing file yields
    /// the defaults; an unreadable or malformed one is an error.
    pub fn load_from(path: impl AsRef<Path>) -> LegacyResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No mapping configuration at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| LegacyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            refactoring_entries = config.refactoring.len(),
            new_members = config.new_members.len(),
            "Loaded mapping configuration from {:?}",
            path
        );
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> LegacyResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LegacyResult<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(LegacyError::Config(format!(
                "similarity_threshold {} is outside [0, 1]",
                self.similarity_threshold
            )));
        }
        if let Some(row) = self
            .type_similarity
            .iter()
            .find(|row| !(0.0..=1.0).contains(&row.score))
        {
            return Err(LegacyError::Config(format!(
                "type similarity {} / {} has score {} outside [0, 1]",
                row.types[0], row.types[1], row.score
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn refactoring_mapping(&self) -> RefactoringMapping {
        let mut mapping = RefactoringMapping::from_entries(&self.refactoring);
        for identifier in &self.new_members {
            mapping.mark_new(identifier);
        }
        mapping
    }

    #[must_use]
    pub fn type_similarity_table(&self) -> TypeSimilarityTable {
        let mut table = TypeSimilarityTable::new();
        for row in &self.type_similarity {
            table.insert(&row.types[0], &row.types[1], row.score);
        }
        table
    }
}
