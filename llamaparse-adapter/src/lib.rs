#![warn(clippy::pedantic)]
//! Adapter for the LlamaParse (LlamaCloud) document parsing service.
//!
//! The service performs OCR and table extraction on a PDF and returns an
//! ordered list of pages, each with a `text` property.

pub mod discovery;
pub mod error;
pub mod job;
pub mod types;

use std::path::Path;

pub use discovery::{discover_api_key, validate_input_file, LLAMA_API_KEY_ENV_VAR};
pub use error::LlamaParseError;
pub use job::run_parse_job;
pub use types::*;

#[derive(Clone)]
pub struct LlamaParseClient {
    http: reqwest::Client,
    api_key: String,
    config: ParseConfig,
}

impl LlamaParseClient {
    #[must_use]
    pub fn new(api_key: impl Into<String>, config: ParseConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            config,
        }
    }

    /// Creates a client with the API key taken from the environment.
    ///
    /// # Errors
    /// Returns `LlamaParseError::MissingApiKey` if `LLAMA_API_KEY` is unset.
    pub fn from_env(config: ParseConfig) -> Result<Self, LlamaParseError> {
        let api_key = discover_api_key(None)?;
        Ok(Self::new(api_key, config))
    }

    #[must_use]
    pub const fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Parses the PDF at `path` into ordered pages.
    ///
    /// # Errors
    /// Returns an error if the file is rejected locally or the parsing job
    /// fails after all retries.
    pub async fn parse_file(&self, path: &Path) -> Result<ParsedDocument, LlamaParseError> {
        validate_input_file(path, &self.config)?;
        run_parse_job(&self.http, &self.api_key, path, &self.config).await
    }

    /// Parses the PDF at `path` and returns the concatenated page text.
    ///
    /// # Errors
    /// See [`LlamaParseClient::parse_file`].
    pub async fn parse_text(&self, path: &Path) -> Result<String, LlamaParseError> {
        Ok(self.parse_file(path).await?.text())
    }
}
