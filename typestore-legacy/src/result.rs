//! The finalized legacy-to-current member correspondence of one legacy type.

use crate::error::LegacyResult;
use crate::handler::TypeHandler;
use crate::similarity::Similarity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use typestore_schema::{Member, TypeDefinition, TypeMember, members_equal_description};

/// Mapping between a legacy definition and the current handler's definition.
///
/// Members are referred to by index into the respective member lists.
#[derive(Debug, Clone)]
pub struct LegacyTypeMappingResult {
    legacy: Arc<TypeDefinition>,
    current: Arc<dyn TypeHandler>,
    legacy_to_current: BTreeMap<usize, (usize, Similarity)>,
    deleted_legacy: BTreeSet<usize>,
    new_current: BTreeSet<usize>,
}

impl LegacyTypeMappingResult {
    #[must_use]
    pub fn new(
        legacy: Arc<TypeDefinition>,
        current: Arc<dyn TypeHandler>,
        legacy_to_current: BTreeMap<usize, (usize, Similarity)>,
        deleted_legacy: BTreeSet<usize>,
        new_current: BTreeSet<usize>,
    ) -> Self {
        Self {
            legacy,
            current,
            legacy_to_current,
            deleted_legacy,
            new_current,
        }
    }

    #[must_use]
    pub fn legacy_definition(&self) -> &Arc<TypeDefinition> {
        &self.legacy
    }

    #[must_use]
    pub fn current_handler(&self) -> &Arc<dyn TypeHandler> {
        &self.current
    }

    #[must_use]
    pub fn current_definition(&self) -> &Arc<TypeDefinition> {
        self.current.type_definition()
    }

    /// Legacy index to `(current index, similarity)`.
    #[must_use]
    pub fn legacy_to_current(&self) -> &BTreeMap<usize, (usize, Similarity)> {
        &self.legacy_to_current
    }

    #[must_use]
    pub fn current_index_for(&self, legacy_index: usize) -> Option<usize> {
        self.legacy_to_current.get(&legacy_index).map(|(c, _)| *c)
    }

    #[must_use]
    pub fn deleted_legacy(&self) -> &BTreeSet<usize> {
        &self.deleted_legacy
    }

    #[must_use]
    pub fn new_current(&self) -> &BTreeSet<usize> {
        &self.new_current
    }

    /// Mapped member pairs in legacy order.
    pub fn legacy_to_current_members(&self) -> impl Iterator<Item = (&Member, &Member)> {
        let legacy = self.legacy.members();
        let current = self.current_definition().members();
        self.legacy_to_current
            .iter()
            .map(move |(l, (c, _))| (&legacy[*l], &current[*c]))
    }

    pub fn deleted_legacy_members(&self) -> impl Iterator<Item = &Member> {
        self.deleted_legacy.iter().map(|i| &self.legacy.members()[*i])
    }

    pub fn new_current_members(&self) -> impl Iterator<Item = &Member> {
        let current = self.current_definition().members();
        self.new_current.iter().map(move |i| &current[*i])
    }

    /// Same ordered member shapes with every position mapped onto itself; only
    /// names may differ.
    #[must_use]
    pub fn is_unchanged_except_naming(&self) -> bool {
        let legacy = self.legacy.members();
        let current = self.current_definition().members();
        legacy.len() == current.len()
            && self.deleted_legacy.is_empty()
            && self.new_current.is_empty()
            && self.legacy_to_current.len() == legacy.len()
            && self.legacy_to_current.iter().all(|(l, (c, _))| l == c)
            && legacy.iter().zip(current).all(|(l, c)| same_shape(l, c))
    }

    #[must_use]
    pub fn report(&self) -> MappingReport {
        let legacy = self.legacy.members();
        let current = self.current_definition().members();
        let mut rows = Vec::with_capacity(legacy.len() + self.new_current.len());
        for (index, member) in legacy.iter().enumerate() {
            let row = match self.legacy_to_current.get(&index) {
                Some((c, similarity)) => ReportRow {
                    legacy: Some(member.unique_name().to_owned()),
                    token: similarity_token(similarity),
                    current: Some(current[*c].unique_name().to_owned()),
                },
                None => ReportRow {
                    legacy: Some(member.unique_name().to_owned()),
                    token: REMOVED_TOKEN.to_owned(),
                    current: None,
                },
            };
            rows.push(row);
        }
        rows.extend(self.new_current.iter().map(|c| ReportRow {
            legacy: None,
            token: NEW_TOKEN.to_owned(),
            current: Some(current[*c].unique_name().to_owned()),
        }));
        MappingReport {
            legacy_type_id: self.legacy.type_id().value(),
            legacy_type_name: self.legacy.type_name().to_owned(),
            current_type_id: self.current_definition().type_id().value(),
            current_type_name: self.current_definition().type_name().to_owned(),
            rows,
        }
    }
}

fn same_shape(legacy: &Member, current: &Member) -> bool {
    legacy.same_variant(current)
        && legacy.type_name() == current.type_name()
        && legacy.is_reference() == current.is_reference()
        && legacy.persistent_minimum_length() == current.persistent_minimum_length()
        && legacy.persistent_maximum_length() == current.persistent_maximum_length()
        && nested_same_shape(legacy.nested_members(), current.nested_members())
}

fn nested_same_shape(legacy: &[Member], current: &[Member]) -> bool {
    members_equal_description(legacy, current)
        || (legacy.len() == current.len()
            && legacy.iter().zip(current).all(|(l, c)| same_shape(l, c)))
}

const EXPLICIT_TOKEN: &str = "-mapped->";
const NEW_TOKEN: &str = " NEW    >";
const REMOVED_TOKEN: &str = " REMOVED ";

fn similarity_token(similarity: &Similarity) -> String {
    match similarity {
        Similarity::Explicit => EXPLICIT_TOKEN.to_owned(),
        other => format!("-{:-<6}->", format!("{:.2}", other.score())),
    }
}

/// One line of a [`MappingReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub legacy: Option<String>,
    pub token: String,
    pub current: Option<String>,
}

/// Human-readable summary of a mapping result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingReport {
    pub legacy_type_id: u64,
    pub legacy_type_name: String,
    pub current_type_id: u64,
    pub current_type_name: String,
    pub rows: Vec<ReportRow>,
}

impl fmt::Display for MappingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} -> {} {}",
            self.legacy_type_id, self.legacy_type_name, self.current_type_id, self.current_type_name
        )?;
        let width = self
            .rows
            .iter()
            .filter_map(|r| r.legacy.as_deref())
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0);
        for row in &self.rows {
            let legacy = row.legacy.as_deref().unwrap_or("");
            let current = row.current.as_deref().unwrap_or("");
            writeln!(f, "  {legacy:<width$} {} {current}", row.token)?;
        }
        Ok(())
    }
}

/// Last chance to inspect or reject a result before a handler is derived.
pub trait MappingResultValidator: Send + Sync {
    fn validate(&self, result: &LegacyTypeMappingResult) -> LegacyResult<()>;
}

/// Accepts every result and logs its report at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingResultValidator;

impl MappingResultValidator for LoggingResultValidator {
    fn validate(&self, result: &LegacyTypeMappingResult) -> LegacyResult<()> {
        debug!(
            type_id = %result.legacy_definition().type_id(),
            type_name = %result.legacy_definition().type_name(),
            "Legacy type mapping\n{}",
            result.report()
        );
        Ok(())
    }
}
