use anyhow::Context;
use clap::ValueEnum;
use llamaparse_adapter::{LlamaParseClient, ParseConfig, LLAMA_API_KEY_ENV_VAR};
use medsky::completion::{
    CompletionBackend, OpenAiCompatibleBackend, OpenAiCompatibleConfig, RigBackend,
    DEFAULT_BASE_URL,
};
use medsky::pipeline::DEFAULT_MODEL;
use std::sync::Arc;

pub const OPENROUTER_API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
pub const OPENROUTER_BASE_URL_ENV_VAR: &str = "OPENROUTER_BASE_URL";
pub const MODEL_ENV_VAR: &str = "MEDSKY_MODEL";

/// Which completion client talks to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Direct HTTP against the OpenAI-compatible endpoint
    #[default]
    Openai,
    /// rig agent on the OpenRouter provider
    Rig,
}

/// Settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub llama_api_key: Option<String>,
    pub model: String,
}

impl EnvConfig {
    /// Loads `.env` if one exists, then reads the process environment.
    #[must_use]
    pub fn load() -> Self {
        if dotenvy::dotenv().is_err() {
            tracing::debug!("No .env file found, using process environment only");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            openrouter_api_key: non_empty(OPENROUTER_API_KEY_ENV_VAR),
            openrouter_base_url: non_empty(OPENROUTER_BASE_URL_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llama_api_key: non_empty(LLAMA_API_KEY_ENV_VAR),
            model: non_empty(MODEL_ENV_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Names of required variables that are unset. The parsing key is only
    /// needed when a PDF has to be parsed.
    #[must_use]
    pub fn missing(&self, needs_parser: bool) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.openrouter_api_key.is_none() {
            missing.push(OPENROUTER_API_KEY_ENV_VAR);
        }
        if needs_parser && self.llama_api_key.is_none() {
            missing.push(LLAMA_API_KEY_ENV_VAR);
        }
        missing
    }

    /// Creates the completion backend for `kind`, using `model` over the
    /// configured one when given.
    ///
    /// # Errors
    /// Returns an error if the API key is missing.
    pub fn backend(
        &self,
        kind: BackendKind,
        model: Option<&str>,
    ) -> anyhow::Result<Arc<dyn CompletionBackend>> {
        let api_key = self
            .openrouter_api_key
            .clone()
            .with_context(|| format!("{OPENROUTER_API_KEY_ENV_VAR} is not set"))?;
        let model = model.unwrap_or(&self.model).to_string();

        match kind {
            BackendKind::Openai => {
                let config = OpenAiCompatibleConfig::new(api_key, model)
                    .with_base_url(self.openrouter_base_url.clone());
                Ok(Arc::new(OpenAiCompatibleBackend::new(config)?))
            }
            BackendKind::Rig => {
                use rig::client::CompletionClient;
                use rig::providers::openrouter;

                let client: openrouter::Client = openrouter::Client::builder()
                    .api_key(api_key)
                    .base_url(&self.openrouter_base_url)
                    .build()
                    .context("failed to build the OpenRouter client")?;
                let completion_model = client.completion_model(model.clone());
                Ok(Arc::new(RigBackend::new(completion_model, model)))
            }
        }
    }

    /// Creates the document parsing client.
    ///
    /// # Errors
    /// Returns an error if `LLAMA_API_KEY` is missing.
    pub fn parser(&self) -> anyhow::Result<LlamaParseClient> {
        let api_key = self
            .llama_api_key
            .clone()
            .with_context(|| format!("{LLAMA_API_KEY_ENV_VAR} is not set"))?;
        Ok(LlamaParseClient::new(api_key, ParseConfig::default()))
    }
}

/// Prints the state of every variable and fails if a required one is unset.
///
/// # Errors
/// Returns an error listing the missing variables.
pub fn run_check(env: &EnvConfig) -> anyhow::Result<()> {
    println!("Checking medsky configuration...");

    let report = |name: &str, value: Option<&String>| match value {
        Some(_) => println!("[OK] {name} is set"),
        None => println!("[MISSING] {name}"),
    };
    report(OPENROUTER_API_KEY_ENV_VAR, env.openrouter_api_key.as_ref());
    report(LLAMA_API_KEY_ENV_VAR, env.llama_api_key.as_ref());
    println!("[OK] {OPENROUTER_BASE_URL_ENV_VAR} = {}", env.openrouter_base_url);
    println!("[OK] {MODEL_ENV_VAR} = {}", env.model);

    let missing = env.missing(true);
    if missing.is_empty() {
        println!("\n[SUCCESS] Configuration is complete.");
        Ok(())
    } else {
        anyhow::bail!("missing environment variables: {}", missing.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> EnvConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        EnvConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let env = env_from(&[]);
        assert_eq!(env.openrouter_base_url, DEFAULT_BASE_URL);
        assert_eq!(env.model, DEFAULT_MODEL);
        assert_eq!(
            env.missing(true),
            vec![OPENROUTER_API_KEY_ENV_VAR, LLAMA_API_KEY_ENV_VAR]
        );
        assert_eq!(env.missing(false), vec![OPENROUTER_API_KEY_ENV_VAR]);
    }

    #[test]
    fn blank_values_count_as_missing() {
        let env = env_from(&[(OPENROUTER_API_KEY_ENV_VAR, "  "), (MODEL_ENV_VAR, "")]);
        assert!(env.openrouter_api_key.is_none());
        assert_eq!(env.model, DEFAULT_MODEL);
    }

    #[test]
    fn openai_backend_uses_override_model() {
        let env = env_from(&[(OPENROUTER_API_KEY_ENV_VAR, "sk-or-test")]);
        let backend = env
            .backend(BackendKind::Openai, Some("openai/gpt-4o-mini"))
            .unwrap();
        assert_eq!(backend.model(), "openai/gpt-4o-mini");
    }

    #[test]
    fn rig_backend_uses_loaded_settings() {
        let env = env_from(&[
            (OPENROUTER_API_KEY_ENV_VAR, "sk-or-test"),
            (OPENROUTER_BASE_URL_ENV_VAR, "http://127.0.0.1:9/api/v1"),
        ]);
        let backend = env.backend(BackendKind::Rig, None).unwrap();
        assert_eq!(backend.model(), DEFAULT_MODEL);
    }

    #[test]
    fn backend_requires_api_key() {
        let env = env_from(&[]);
        assert!(env.backend(BackendKind::Openai, None).is_err());
        let err = env.backend(BackendKind::Rig, None).err().unwrap();
        assert!(err.to_string().contains(OPENROUTER_API_KEY_ENV_VAR));
        assert!(env.parser().is_err());
    }

    #[test]
    fn check_fails_on_missing_keys() {
        let env = env_from(&[(OPENROUTER_API_KEY_ENV_VAR, "sk-or-test")]);
        let err = run_check(&env).unwrap_err();
        assert!(err.to_string().contains(LLAMA_API_KEY_ENV_VAR));
    }
}
