//! Structured completion backends.
//!
//! A backend takes an instruction, the user content and a JSON schema, and
//! returns the JSON value the model produced. Checking that value against
//! the schema is left to the caller (see [`crate::extraction::decode`]).

pub mod agent;
pub mod openai;

pub use agent::{extract_json_object, RigBackend};
pub use openai::{OpenAiCompatibleBackend, OpenAiCompatibleConfig, DEFAULT_BASE_URL};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// One structured completion request.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    /// System instruction.
    pub system: String,
    /// User content, typically a raw section text.
    pub user: String,
    /// Name attached to the response schema.
    pub schema_name: String,
    /// JSON schema the response must follow.
    pub schema: Value,
}

impl StructuredRequest {
    #[must_use]
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        schema_name: impl Into<String>,
        schema: Value,
    ) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            schema_name: schema_name.into(),
            schema,
        }
    }
}

/// Transport-level failures of a completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Required configuration (API key, base URL) is missing.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Completion response contained no content")]
    EmptyResponse,

    /// The content could not be read as a JSON object.
    #[error("Malformed JSON in completion: {0}")]
    MalformedJson(String),

    /// Error reported by a rig provider.
    #[error("Provider error: {0}")]
    Provider(String),
}

/// A service able to answer [`StructuredRequest`]s.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Model identifier, used for logging.
    fn model(&self) -> &str;

    /// Runs one completion and returns the produced JSON value.
    async fn complete(&self, request: StructuredRequest) -> Result<Value, CompletionError>;
}

#[async_trait]
impl<B: CompletionBackend + ?Sized> CompletionBackend for std::sync::Arc<B> {
    fn model(&self) -> &str {
        (**self).model()
    }

    async fn complete(&self, request: StructuredRequest) -> Result<Value, CompletionError> {
        (**self).complete(request).await
    }
}
