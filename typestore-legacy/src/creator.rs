//! Derives the loader-time handler for a finalized mapping result.

use crate::derived::{
    DirectLegacyTypeHandler, LegacyTypeHandler, ReflectiveLegacyTypeHandler,
    ReroutingLegacyTypeHandler, TranslationPlan,
};
use crate::error::LegacyResult;
use crate::handler::TypeHandler;
use crate::result::LegacyTypeMappingResult;
use crate::translator::{ResizingTranslator, ValueTranslator};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a legacy handler in front of a hand-authored current handler.
pub trait CustomHandlerDeriver: Send + Sync {
    fn derive(
        &self,
        result: &LegacyTypeMappingResult,
        translator: &Arc<dyn ValueTranslator>,
    ) -> LegacyResult<Arc<dyn TypeHandler>>;
}

/// Rewrites legacy records into the current layout and hands them to the
/// custom current handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReroutingDeriver;

impl CustomHandlerDeriver for ReroutingDeriver {
    fn derive(
        &self,
        result: &LegacyTypeMappingResult,
        translator: &Arc<dyn ValueTranslator>,
    ) -> LegacyResult<Arc<dyn TypeHandler>> {
        let plan = TranslationPlan::new(result, Arc::clone(translator));
        Ok(Arc::new(ReroutingLegacyTypeHandler::new(
            plan,
            Arc::clone(result.current_handler()),
        )))
    }
}

pub struct LegacyTypeHandlerCreator {
    translator: Arc<dyn ValueTranslator>,
    default_deriver: Arc<dyn CustomHandlerDeriver>,
    custom_derivers: HashMap<String, Arc<dyn CustomHandlerDeriver>>,
}

impl LegacyTypeHandlerCreator {
    #[must_use]
    pub fn new(translator: Arc<dyn ValueTranslator>) -> Self {
        Self {
            translator,
            default_deriver: Arc::new(ReroutingDeriver),
            custom_derivers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn translator(&self) -> &Arc<dyn ValueTranslator> {
        &self.translator
    }

    /// Replaces the deriver used for custom current handlers without a
    /// type-specific one.
    #[must_use]
    pub fn with_default_deriver(mut self, deriver: Arc<dyn CustomHandlerDeriver>) -> Self {
        self.default_deriver = deriver;
        self
    }

    /// Uses `deriver` for custom current handlers of `type_name`.
    pub fn register_custom_deriver(
        &mut self,
        type_name: impl Into<String>,
        deriver: Arc<dyn CustomHandlerDeriver>,
    ) {
        self.custom_derivers.insert(type_name.into(), deriver);
    }

    /// Picks the direct wrapper, a custom derivation or a reflective handler,
    /// in that order.
    pub fn create(&self, result: &LegacyTypeMappingResult) -> LegacyResult<LegacyTypeHandler> {
        if result.is_unchanged_except_naming() {
            return Ok(LegacyTypeHandler::DirectWrapper(DirectLegacyTypeHandler::new(
                Arc::clone(result.legacy_definition()),
                Arc::clone(result.current_handler()),
            )));
        }
        if result.current_handler().is_custom() {
            let deriver = self
                .custom_derivers
                .get(result.current_definition().type_name())
                .unwrap_or(&self.default_deriver);
            return Ok(LegacyTypeHandler::CustomDerived(deriver.derive(result, &self.translator)?));
        }
        let plan = TranslationPlan::new(result, Arc::clone(&self.translator));
        Ok(LegacyTypeHandler::ReflectiveDerived(ReflectiveLegacyTypeHandler::new(plan)))
    }
}

impl Default for LegacyTypeHandlerCreator {
    fn default() -> Self {
        Self::new(Arc::new(ResizingTranslator))
    }
}

impl fmt::Debug for LegacyTypeHandlerCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut custom: Vec<&str> = self.custom_derivers.keys().map(String::as_str).collect();
        custom.sort_unstable();
        f.debug_struct("LegacyTypeHandlerCreator")
            .field("translator", &self.translator)
            .field("custom_derivers", &custom)
            .finish_non_exhaustive()
    }
}
