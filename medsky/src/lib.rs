//! Extraction and validation pipeline for Korean student records (학교생활기록부).
//!
//! The parsed text of a record is cut into sections by fixed anchors, three of
//! the sections are turned into typed records through schema-constrained
//! completions, and each of those sections is reviewed with five validation
//! prompts.

pub mod completion;
pub mod error;
pub mod extraction;
pub mod pipeline;
pub mod prompts;
pub mod record;
pub mod schema;
pub mod section;
pub mod stats;
pub mod store;
pub mod validation;

pub use error::MedskyError;

/// Common traits and types for ergonomic usage of the pipeline.
pub mod prelude {
    pub use crate::completion::{
        CompletionBackend, CompletionError, OpenAiCompatibleBackend, OpenAiCompatibleConfig,
        RigBackend, StructuredRequest,
    };
    pub use crate::error::MedskyError;
    pub use crate::extraction::{DecodeError, ExtractionError, Extractor};
    pub use crate::pipeline::{DocumentSource, Pipeline, PipelineConfig, PipelineReport};
    pub use crate::schema::{ExtractedRecord, ValidationResult, ValidationType};
    pub use crate::section::{clean_section, segment, segment_all, SectionKind, Sections};
    pub use crate::stats::{calculate_analysis_statistics, AnalysisStatistics};
    pub use crate::store::ArtifactStore;
    pub use crate::validation::{ValidationOutcome, Validator, ValidatorConfig};
}
