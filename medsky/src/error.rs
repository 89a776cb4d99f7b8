//! Pipeline-level errors.

use llamaparse_adapter::LlamaParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop a pipeline run. Per-section extraction and validation
/// failures are reported, not raised.
#[derive(Debug, Error)]
pub enum MedskyError {
    #[error("Document parsing failed: {0}")]
    Parse(#[from] LlamaParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Some result files could not be written. Every other file of the run
    /// was still attempted.
    #[error("Failed to write {} result file(s), first error: {first}", failed.len())]
    Persist { failed: Vec<PathBuf>, first: String },
}
