//! Per-call metrics and token estimation.

use std::time::Duration;

/// Metrics collected for one extraction or validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallMetrics {
    /// Completion attempts made.
    pub attempts: usize,
    /// Wall-clock time across all attempts, pauses included.
    pub wall_time: Duration,
    pub estimated_input_tokens: usize,
    pub estimated_output_tokens: usize,
}

/// Estimate token count from text using the standard 4-chars-per-token heuristic.
///
/// Counts characters rather than bytes, so Hangul is not overcounted.
///
/// # Examples
///
/// ```
/// use medsky::extraction::estimate_tokens;
///
/// assert_eq!(estimate_tokens("hello"), 2);
/// assert_eq!(estimate_tokens("창의적 체험활동"), 2);
/// ```
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}
