//! Retry loop for validation calls.

use serde_json::Value;
use tokio::time::Instant;

use super::config::ValidatorConfig;
use super::error::{AttemptRecord, ValidationError};
use super::fallback_result;
use crate::completion::{CompletionBackend, StructuredRequest};
use crate::extraction::{decode, estimate_tokens, CallMetrics};
use crate::prompts::{get_validation_prompt, is_invalid};
use crate::schema::{StructuredOutput, ValidationResult, ValidationType};

/// What a validation call produced. Both variants carry a usable result.
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    /// The model answered with a schema-valid result.
    Genuine(ValidationResult),
    /// Every attempt failed; `result` is the placeholder.
    Fallback {
        result: ValidationResult,
        attempts: Vec<AttemptRecord>,
    },
}

impl ValidationOutcome {
    #[must_use]
    pub const fn result(&self) -> &ValidationResult {
        match self {
            Self::Genuine(result) | Self::Fallback { result, .. } => result,
        }
    }

    #[must_use]
    pub fn into_result(self) -> ValidationResult {
        match self {
            Self::Genuine(result) | Self::Fallback { result, .. } => result,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Runs validation prompts against a backend with bounded retry.
pub struct Validator<B> {
    backend: B,
    config: ValidatorConfig,
}

impl<B: CompletionBackend> Validator<B> {
    /// Creates a validator with the default configuration.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: ValidatorConfig::default(),
        }
    }

    #[must_use]
    pub const fn with_config(backend: B, config: ValidatorConfig) -> Self {
        Self { backend, config }
    }

    #[must_use]
    pub const fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Validates `text` and returns the result, a fallback placeholder if
    /// every attempt failed.
    pub async fn validate(&self, text: &str, validation_type: ValidationType) -> ValidationResult {
        self.validate_detailed(text, validation_type)
            .await
            .0
            .into_result()
    }

    /// Like [`Validator::validate`], also reporting whether the result is
    /// genuine and how many attempts were made.
    pub async fn validate_detailed(
        &self,
        text: &str,
        validation_type: ValidationType,
    ) -> (ValidationOutcome, CallMetrics) {
        let start = Instant::now();
        let max_attempts = self.config.max_attempts();
        let mut history: Vec<AttemptRecord> = Vec::new();
        let mut input_tokens = 0;

        for attempt in 1..=max_attempts {
            input_tokens += estimate_tokens(text);

            match self.attempt(text, validation_type).await {
                Ok((mut result, output)) => {
                    if result.validation_type != validation_type {
                        tracing::warn!(
                            requested = %validation_type,
                            returned = %result.validation_type,
                            "Model returned a different validation type, overwriting"
                        );
                        result.validation_type = validation_type;
                    }

                    let metrics = CallMetrics {
                        attempts: attempt,
                        wall_time: start.elapsed(),
                        estimated_input_tokens: input_tokens,
                        estimated_output_tokens: estimate_tokens(&output.to_string()),
                    };
                    tracing::info!(
                        %validation_type,
                        attempt,
                        feedbacks = result.feedbacks.len(),
                        wall_time_ms = metrics.wall_time.as_millis(),
                        "Validation completed"
                    );
                    return (ValidationOutcome::Genuine(result), metrics);
                }
                Err(error) => {
                    tracing::warn!(
                        %validation_type,
                        attempt,
                        max_attempts,
                        error = %error,
                        "Validation attempt failed"
                    );
                    history.push(AttemptRecord {
                        attempt_number: attempt,
                        error: error.to_string(),
                        elapsed: start.elapsed(),
                    });

                    if !error.is_retryable() {
                        break;
                    }
                    if attempt < max_attempts {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        let last_error = history
            .last()
            .map_or("unknown error", |record| record.error.as_str());
        let result = fallback_result(validation_type, last_error);
        let metrics = CallMetrics {
            attempts: history.len(),
            wall_time: start.elapsed(),
            estimated_input_tokens: input_tokens,
            estimated_output_tokens: 0,
        };
        tracing::warn!(
            %validation_type,
            attempts = history.len(),
            "Validation exhausted its attempts, returning fallback"
        );

        (
            ValidationOutcome::Fallback {
                result,
                attempts: history,
            },
            metrics,
        )
    }

    async fn attempt(
        &self,
        text: &str,
        validation_type: ValidationType,
    ) -> Result<(ValidationResult, Value), ValidationError> {
        let prompt = get_validation_prompt(validation_type.as_str());
        if is_invalid(prompt) {
            return Err(ValidationError::InvalidPrompt(validation_type.to_string()));
        }

        let request = StructuredRequest::new(
            prompt,
            text,
            ValidationResult::SCHEMA_NAME,
            ValidationResult::response_schema(),
        );
        let value = self.backend.complete(request).await?;
        let result = decode::<ValidationResult>(value.clone())?;
        Ok((result, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionError;
    use crate::validation::{FALLBACK_FEEDBACK_PREFIX, FALLBACK_SENTENCE};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails the first `failures` calls, then answers with `response`.
    struct FlakyBackend {
        failures: usize,
        response: Value,
        calls: AtomicUsize,
    }

    impl FlakyBackend {
        fn new(failures: usize, response: Value) -> Self {
            Self {
                failures,
                response,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionBackend for FlakyBackend {
        fn model(&self) -> &str {
            "flaky"
        }

        async fn complete(&self, _request: StructuredRequest) -> Result<Value, CompletionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(CompletionError::Api {
                    status: 500,
                    body: "x".repeat(1000),
                });
            }
            Ok(self.response.clone())
        }
    }

    fn fast_config(max_retries: usize) -> ValidatorConfig {
        ValidatorConfig::default()
            .with_max_retries(max_retries)
            .with_retry_delay(Duration::ZERO)
    }

    fn genuine_response() -> Value {
        json!({
            "type": "red_line",
            "Feedbacks": [
                { "sentence": "토론 활동에 적극적으로 참여함.", "feedback": "구체적 사례가 부족함" }
            ]
        })
    }

    #[tokio::test]
    async fn always_failing_backend_falls_back_after_max_retries() {
        let validator = Validator::with_config(FlakyBackend::new(usize::MAX, json!({})), fast_config(3));

        let (outcome, metrics) = validator
            .validate_detailed("text", ValidationType::RedLine)
            .await;

        assert_eq!(validator.backend().calls(), 3);
        assert_eq!(metrics.attempts, 3);
        let ValidationOutcome::Fallback { result, attempts } = outcome else {
            panic!("expected fallback");
        };
        assert_eq!(attempts.len(), 3);
        assert_eq!(result.validation_type, ValidationType::RedLine);
        assert_eq!(result.feedbacks.len(), 1);
        assert_eq!(result.feedbacks[0].sentence, FALLBACK_SENTENCE);
        let feedback = &result.feedbacks[0].feedback;
        assert!(feedback.starts_with(FALLBACK_FEEDBACK_PREFIX));
        assert!(feedback.chars().count() <= 230);
    }

    #[tokio::test]
    async fn succeeds_on_second_attempt() {
        let validator = Validator::with_config(FlakyBackend::new(1, genuine_response()), fast_config(3));

        let (outcome, metrics) = validator
            .validate_detailed("text", ValidationType::RedLine)
            .await;

        assert_eq!(validator.backend().calls(), 2);
        assert_eq!(metrics.attempts, 2);
        assert!(!outcome.is_fallback());
        assert_eq!(
            outcome.result().feedbacks[0].sentence,
            "토론 활동에 적극적으로 참여함."
        );
    }

    #[tokio::test]
    async fn zero_retries_makes_one_attempt() {
        let validator = Validator::with_config(FlakyBackend::new(usize::MAX, json!({})), fast_config(0));

        let result = validator.validate("text", ValidationType::BlueLine).await;

        assert_eq!(validator.backend().calls(), 1);
        assert_eq!(result.feedbacks[0].sentence, FALLBACK_SENTENCE);
    }

    #[tokio::test]
    async fn mismatched_type_tag_is_overwritten() {
        let validator = Validator::with_config(FlakyBackend::new(0, genuine_response()), fast_config(3));

        let result = validator.validate("text", ValidationType::BlueHighlight).await;

        assert_eq!(result.validation_type, ValidationType::BlueHighlight);
        assert_eq!(result.feedbacks.len(), 1);
    }

    #[tokio::test]
    async fn schema_violation_counts_as_failed_attempt() {
        let invalid = json!({ "type": "red_line", "Feedbacks": [{ "sentence": "only" }] });
        let validator = Validator::with_config(FlakyBackend::new(0, invalid), fast_config(2));

        let (outcome, _) = validator
            .validate_detailed("text", ValidationType::RedLine)
            .await;

        assert_eq!(validator.backend().calls(), 2);
        let ValidationOutcome::Fallback { attempts, .. } = outcome else {
            panic!("expected fallback");
        };
        assert!(attempts[1].error.contains("feedback"));
    }

    struct MisconfiguredBackend(AtomicUsize);

    #[async_trait]
    impl CompletionBackend for MisconfiguredBackend {
        fn model(&self) -> &str {
            "misconfigured"
        }

        async fn complete(&self, _request: StructuredRequest) -> Result<Value, CompletionError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(CompletionError::MissingConfig("API key is empty".into()))
        }
    }

    #[tokio::test]
    async fn configuration_error_stops_after_first_attempt() {
        let validator = Validator::with_config(MisconfiguredBackend(AtomicUsize::new(0)), fast_config(3));

        let (outcome, metrics) = validator
            .validate_detailed("text", ValidationType::BlackLine)
            .await;

        assert_eq!(validator.backend().0.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.attempts, 1);
        assert!(outcome.is_fallback());
        assert!(outcome.result().feedbacks[0].feedback.contains("API key is empty"));
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_attempts_only() {
        let config = ValidatorConfig::default().with_max_retries(3);
        let validator = Validator::with_config(FlakyBackend::new(usize::MAX, json!({})), config);

        let (_, metrics) = validator
            .validate_detailed("text", ValidationType::RedCheck)
            .await;

        // Two pauses of one second for three attempts.
        assert!(metrics.wall_time >= Duration::from_secs(2));
        assert!(metrics.wall_time < Duration::from_secs(3));
    }
}
