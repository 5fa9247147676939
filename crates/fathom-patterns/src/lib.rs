//! C4: the API Pattern Registry — templates, URL matching, variable
//! extraction, metric decay, archival and bootstrap seeding.

mod bootstrap;
mod events;
mod extractor;
mod learn;
mod mapping;
mod pattern;
mod registry;
mod template;
mod validation;

pub use bootstrap::seed_patterns;
pub use events::{ArchiveReason, PatternEvent};
pub use extractor::{ExtractorSource, Transform, VariableExtractor};
pub use learn::infer_pattern;
pub use mapping::{ContentMapping, ContentPath};
pub use pattern::{LearnedApiPattern, PatternSource, APPEND_STYLE_SENTINEL};
pub use registry::{ApplyOutcome, PatternRegistry};
pub use template::PatternTemplate;
pub use validation::validate;
