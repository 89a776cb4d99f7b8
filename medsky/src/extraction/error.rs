//! Error types for extraction.

use crate::completion::CompletionError;
use crate::section::SectionKind;
use thiserror::Error;

/// The completion output did not decode into the requested type.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The output violates the schema; every violation is listed.
    #[error("Response does not match schema `{schema}`: {}", errors.join("; "))]
    Schema {
        /// Name of the schema that was requested.
        schema: String,
        /// Violations with instance paths.
        errors: Vec<String>,
    },

    /// Schema-valid output that serde still rejected.
    #[error("Deserialization failed: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Schema compilation failed: {0}")]
    SchemaCompilation(String),
}

/// Errors that can occur while extracting one section.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The section kind has no extraction schema.
    #[error("Section `{0}` does not support extraction")]
    UnsupportedSection(SectionKind),

    /// The prompt registry returned a sentinel for this key.
    #[error("No extraction prompt registered for `{0}`")]
    InvalidPrompt(String),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
