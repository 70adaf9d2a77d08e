//! Legacy type mapping for typestore.
//!
//! When a persisted [`TypeDefinition`](typestore_schema::TypeDefinition) no
//! longer matches the running program, the [`LegacyTypeMapper`] works out which
//! legacy member ends up in which current member and derives a handler that
//! loads legacy records into current instances.
//!
//! Explicit [`RefactoringMapping`] entries always win over heuristic
//! [`MemberMatcher`] pairs.

mod config;
mod creator;
mod derived;
mod error;
mod handler;
mod identifier;
pub mod layout;
mod mapper;
mod refactoring;
mod result;
mod similarity;
mod translator;

pub use config::{MappingConfig, TypeSimilarityRow};
pub use creator::{CustomHandlerDeriver, LegacyTypeHandlerCreator, ReroutingDeriver};
pub use derived::{
    DirectLegacyTypeHandler, LegacyTypeHandler, ReflectiveLegacyTypeHandler,
    ReroutingLegacyTypeHandler, TranslationPlan,
};
pub use error::{LegacyError, LegacyResult};
pub use handler::{DeletedTypeHandler, Instance, ObjectId, ReflectiveTypeHandler, TypeHandler};
pub use identifier::{DescriptionResolver, IdentifierStrategy, MemberResolution, TypeResolution};
pub use mapper::{CustomLegacyTypeHandler, LegacyTypeMapper};
pub use refactoring::{LazyRefactoringProvider, RefactoringMapping, RefactoringMappingProvider};
pub use result::{
    LegacyTypeMappingResult, LoggingResultValidator, MappingReport, MappingResultValidator,
    ReportRow,
};
pub use similarity::{
    AcceptAllValidator, LengthCompatibilityValidator, MatchValidator, MemberMatch, MemberMatcher,
    MemberSimilator, Similarity, TypeSimilarityTable, levenshtein_ratio,
};
pub use translator::{ResizingTranslator, ValueTranslator};
