//! Backend built on a rig agent.
//!
//! rig agents return free text, so the schema is appended to the preamble
//! and the JSON object is cut out of the reply.

use super::{CompletionBackend, CompletionError, StructuredRequest};
use async_trait::async_trait;
use rig::agent::AgentBuilder;
use rig::completion::{CompletionModel, Prompt};
use serde_json::Value;

pub struct RigBackend<M> {
    model: M,
    model_name: String,
}

impl<M> RigBackend<M>
where
    M: CompletionModel + Clone + 'static,
{
    #[must_use]
    pub fn new(model: M, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }
}

fn preamble(request: &StructuredRequest) -> String {
    let schema = serde_json::to_string_pretty(&request.schema)
        .unwrap_or_else(|_| request.schema.to_string());
    format!(
        "{}\n\nRespond with a single JSON object named `{}` that matches this JSON schema:\n{schema}",
        request.system, request.schema_name
    )
}

#[async_trait]
impl<M> CompletionBackend for RigBackend<M>
where
    M: CompletionModel + Clone + Send + Sync + 'static,
{
    fn model(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: StructuredRequest) -> Result<Value, CompletionError> {
        let agent = AgentBuilder::new(self.model.clone())
            .preamble(&preamble(&request))
            .build();

        tracing::debug!(model = %self.model_name, schema = %request.schema_name, "Prompting rig agent");
        let reply = agent
            .prompt(request.user.as_str())
            .await
            .map_err(|e| CompletionError::Provider(e.to_string()))?;

        if reply.trim().is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        let object = extract_json_object(&reply)?;
        serde_json::from_str(object).map_err(|e| CompletionError::MalformedJson(e.to_string()))
    }
}

/// Finds the JSON object in a reply that may wrap it in a markdown fence or
/// surrounding prose.
///
/// # Errors
/// Returns `CompletionError::MalformedJson` when no object delimiters are found.
pub fn extract_json_object(text: &str) -> Result<&str, CompletionError> {
    if let Some(start) = text.find("```json") {
        let body = start + "```json".len();
        if let Some(end) = text[body..].find("```") {
            return Ok(text[body..body + end].trim());
        }
    }

    if let Some(start) = text.find("```") {
        let fence = start + 3;
        let body = text[fence..].find('\n').map_or(fence, |i| fence + i + 1);
        if let Some(end) = text[body..].find("```") {
            return Ok(text[body..body + end].trim());
        }
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(CompletionError::MalformedJson(
            "no JSON object found in response".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_from_json_fence() {
        let text = "Here you go:\n```json\n{\"type\": \"red_line\"}\n```\nDone.";
        assert_eq!(extract_json_object(text).unwrap(), "{\"type\": \"red_line\"}");
    }

    #[test]
    fn extracts_from_plain_fence() {
        let text = "```\n{\"a\": [1, 2]}\n```";
        assert_eq!(extract_json_object(text).unwrap(), "{\"a\": [1, 2]}");
    }

    #[test]
    fn extracts_raw_object_with_prose() {
        let text = "결과는 다음과 같습니다 {\"sentence\": \"문장\"} 감사합니다";
        assert_eq!(extract_json_object(text).unwrap(), "{\"sentence\": \"문장\"}");
    }

    #[test]
    fn no_object_is_malformed() {
        assert!(matches!(
            extract_json_object("} nothing {"),
            Err(CompletionError::MalformedJson(_))
        ));
    }

    #[test]
    fn preamble_embeds_schema() {
        let request = StructuredRequest::new("Extract.", "text", "detailed_abilities", json!({"type": "object"}));
        let text = preamble(&request);
        assert!(text.starts_with("Extract."));
        assert!(text.contains("`detailed_abilities`"));
        assert!(text.contains("\"type\": \"object\""));
    }
}
