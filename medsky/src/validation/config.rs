//! Configuration for validation retry behavior.

use std::time::Duration;

/// Configuration for validation retry behavior.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Maximum number of attempts before falling back (default: 3). Zero is
    /// treated as one.
    pub max_retries: usize,
    /// Pause between attempts, not after the last one (default: 1s).
    pub retry_delay: Duration,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl ValidatorConfig {
    /// Set the maximum number of attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, max: usize) -> Self {
        self.max_retries = max;
        self
    }

    /// Set the pause between attempts.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Attempts actually made before falling back.
    #[must_use]
    pub const fn max_attempts(&self) -> usize {
        if self.max_retries == 0 {
            1
        } else {
            self.max_retries
        }
    }
}
