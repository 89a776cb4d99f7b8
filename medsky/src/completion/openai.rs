//! Backend for OpenAI-compatible chat completion endpoints (OpenRouter by
//! default) using `response_format: json_schema`.

use super::{CompletionBackend, CompletionError, StructuredRequest};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Default endpoint base, without the `/chat/completions` suffix.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Connection settings for [`OpenAiCompatibleBackend`].
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl OpenAiCompatibleConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub struct OpenAiCompatibleBackend {
    http: reqwest::Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleBackend {
    /// # Errors
    /// Returns `CompletionError::MissingConfig` for an empty API key or base URL.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, CompletionError> {
        if config.api_key.trim().is_empty() {
            return Err(CompletionError::MissingConfig("API key is empty".to_string()));
        }
        if config.base_url.trim().is_empty() {
            return Err(CompletionError::MissingConfig("base URL is empty".to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, request: &StructuredRequest) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "schema": strip_meta_schema(&request.schema),
                    "strict": false
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionBackend for OpenAiCompatibleBackend {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: StructuredRequest) -> Result<Value, CompletionError> {
        tracing::debug!(
            model = %self.config.model,
            schema = %request.schema_name,
            input_chars = request.user.chars().count(),
            "Sending structured completion request"
        );

        let mut builder = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(&request));
        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        parse_content(&content)
    }
}

/// Parses message content as JSON, falling back to the first JSON object
/// embedded in surrounding text.
fn parse_content(content: &str) -> Result<Value, CompletionError> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Ok(value);
    }
    let object = super::extract_json_object(content)?;
    serde_json::from_str(object).map_err(|e| CompletionError::MalformedJson(e.to_string()))
}

/// Drops the `$schema` keyword, which some providers reject inside
/// `response_format`.
fn strip_meta_schema(schema: &Value) -> Value {
    let mut schema = schema.clone();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }
    schema
}
