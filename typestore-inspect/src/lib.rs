//! Commands behind the `typestore-inspect` binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use typestore_codec::TypeDictionaryCodec;
use typestore_legacy::{
    LegacyTypeMapper, MappingConfig, MappingReport, ReflectiveTypeHandler, TypeHandler,
};
use typestore_schema::TypeDictionary;

/// Loads a dictionary from its text form. Entries of `runtime`, if given, are
/// bound as the runtime definitions of their lineages.
pub fn load(text: &str, runtime: Option<&str>) -> Result<TypeDictionary> {
    let codec = TypeDictionaryCodec::default();
    let dictionary = codec.load(text).context("Failed to load type dictionary")?;
    if let Some(runtime) = runtime {
        let entries = codec.parse(runtime).context("Failed to parse runtime definitions")?;
        let definitions = codec.build(&entries).context("Failed to build runtime definitions")?;
        dictionary
            .register_runtime_definitions(definitions)
            .context("Runtime definitions conflict with the dictionary")?;
    }
    Ok(dictionary)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CheckSummary {
    pub lineages: usize,
    pub definitions: usize,
    pub highest_type_id: u64,
    pub invalid_lineages: Vec<String>,
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lineages:        {}", self.lineages)?;
        writeln!(f, "Definitions:     {}", self.definitions)?;
        writeln!(f, "Highest type id: {}", self.highest_type_id)?;
        if self.invalid_lineages.is_empty() {
            writeln!(f, "Invalid lineages: none")
        } else {
            writeln!(f, "Invalid lineages: {}", self.invalid_lineages.join(", "))
        }
    }
}

pub fn check(dictionary: &TypeDictionary) -> CheckSummary {
    CheckSummary {
        lineages: dictionary.lineages().len(),
        definitions: dictionary.len(),
        highest_type_id: dictionary.highest_type_id().value(),
        invalid_lineages: dictionary
            .invalid_lineages()
            .iter()
            .map(|l| l.type_name().to_owned())
            .collect(),
    }
}

/// Canonical text form of `dictionary`.
pub fn normalize(dictionary: &TypeDictionary) -> String {
    TypeDictionaryCodec::default().assemble(dictionary)
}

/// What loading one outdated definition would look like.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LegacyPlan {
    pub type_id: u64,
    pub type_name: String,
    pub state: String,
    pub report: Option<MappingReport>,
}

impl fmt::Display for LegacyPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.report {
            Some(report) => write!(f, "[{}] {}", self.state, report),
            None => writeln!(f, "[{}] {} {}", self.state, self.type_id, self.type_name),
        }
    }
}

/// Derives a legacy handler for every outdated entry. A lineage's runtime
/// definition is its current shape, falling back to its latest entry.
pub fn plan(dictionary: &TypeDictionary, config: &MappingConfig) -> Result<Vec<LegacyPlan>> {
    let mapper = LegacyTypeMapper::new().with_config(config);
    let currents: HashMap<String, Arc<dyn TypeHandler>> = dictionary
        .lineages()
        .iter()
        .filter_map(|lineage| {
            let current = lineage.runtime_definition().or_else(|| lineage.latest())?;
            let handler: Arc<dyn TypeHandler> =
                Arc::new(ReflectiveTypeHandler::new(Arc::clone(current)));
            Some((lineage.type_name().to_owned(), handler))
        })
        .collect();
    debug!(current_types = currents.len(), "Planning legacy type handlers");

    let handlers = mapper
        .ensure_legacy_type_handlers(dictionary, |name| currents.get(name).cloned())
        .context("Failed to map legacy types")?;

    let mut plans = Vec::with_capacity(handlers.len());
    for handler in handlers {
        let legacy = handler.type_definition();
        let current = mapper
            .current_type_name(legacy.type_name())
            .and_then(|name| currents.get(&name).cloned());
        let report = match current {
            Some(current) if !handler.is_deleted() => {
                Some(mapper.map_members(legacy, current)?.report())
            }
            _ => None,
        };
        plans.push(LegacyPlan {
            type_id: legacy.type_id().value(),
            type_name: legacy.type_name().to_owned(),
            state: handler.state_name().to_owned(),
            report,
        });
    }
    Ok(plans)
}
