//! Validation with bounded retry and degrade-to-fallback.
//!
//! A validation call never fails: after the last failed attempt it returns a
//! placeholder [`ValidationResult`] carrying a single feedback entry that
//! describes the error.

pub mod config;
pub mod error;
pub mod validator;

pub use config::ValidatorConfig;
pub use error::{AttemptRecord, ValidationError};
pub use validator::{ValidationOutcome, Validator};

use crate::schema::{ValidationResult, ValidationType};

/// Sentence of the fallback returned after every attempt failed.
pub const FALLBACK_SENTENCE: &str = "오류로 인해 분석을 완료할 수 없었습니다.";
/// Feedback prefix of the fallback returned after every attempt failed.
pub const FALLBACK_FEEDBACK_PREFIX: &str = "API 오류 또는 JSON 파싱 실패: ";

/// Sentence used when a validation task itself died.
pub const PROCESSING_ERROR_SENTENCE: &str = "처리 중 오류가 발생했습니다.";
pub const PROCESSING_ERROR_FEEDBACK_PREFIX: &str = "처리 오류: ";

/// Error text kept in fallback feedback, in characters.
pub const MAX_ERROR_CHARS: usize = 200;

/// Fallback for an exhausted retry loop.
#[must_use]
pub fn fallback_result(validation_type: ValidationType, error: &str) -> ValidationResult {
    ValidationResult::single(
        validation_type,
        FALLBACK_SENTENCE,
        format!("{FALLBACK_FEEDBACK_PREFIX}{}", truncate_chars(error, MAX_ERROR_CHARS)),
    )
}

/// Fallback for a validation task that panicked or was cancelled.
#[must_use]
pub fn processing_error_result(validation_type: ValidationType, error: &str) -> ValidationResult {
    ValidationResult::single(
        validation_type,
        PROCESSING_ERROR_SENTENCE,
        format!(
            "{PROCESSING_ERROR_FEEDBACK_PREFIX}{}",
            truncate_chars(error, MAX_ERROR_CHARS)
        ),
    )
}

/// Returns at most `max` leading characters of `text`, never splitting a
/// character.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> &str {
    text.char_indices()
        .nth(max)
        .map_or(text, |(index, _)| &text[..index])
}
