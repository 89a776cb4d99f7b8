//! Per-attempt validation failures and attempt history.

use std::time::Duration;
use thiserror::Error;

use crate::completion::CompletionError;
use crate::extraction::DecodeError;

/// Why one validation attempt failed. Never escapes the validator; the
/// last one is folded into the fallback feedback.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No validation prompt registered for `{0}`")]
    InvalidPrompt(String),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ValidationError {
    /// Configuration errors fail the same way on every attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidPrompt(_) | Self::Completion(CompletionError::MissingConfig(_))
        )
    }
}

/// Record of a single failed validation attempt.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// The attempt number (1-indexed).
    pub attempt_number: usize,
    /// Rendered error of this attempt.
    pub error: String,
    /// Elapsed time since the first attempt started.
    pub elapsed: Duration,
}
