use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default LlamaCloud API root.
pub const DEFAULT_BASE_URL: &str = "https://api.cloud.llamaindex.ai";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    ParsePageWithoutLlm,
    ParsePageWithLlm,
    ParseDocumentWithLlm,
}

impl ParseMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParsePageWithoutLlm => "parse_page_without_llm",
            Self::ParsePageWithLlm => "parse_page_with_llm",
            Self::ParseDocumentWithLlm => "parse_document_with_llm",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseConfig {
    pub base_url: String,
    pub parse_mode: ParseMode,
    pub high_res_ocr: bool,
    pub adaptive_long_table: bool,
    pub outlined_table_extraction: bool,
    pub output_tables_as_html: bool,
    /// Per-request timeout for the upload call.
    pub timeout: Duration,
    /// Upload attempts before giving up.
    pub max_retries: usize,
    pub poll_interval: Duration,
    pub max_poll_attempts: usize,
    /// Pause after a job reports `SUCCESS` before its result is fetched.
    pub settle_delay: Duration,
    /// Attempts at fetching a result that is not ready yet (HTTP 404).
    pub max_result_attempts: usize,
    /// Base wait between result fetches; the n-th retry waits `n * result_backoff`.
    pub result_backoff: Duration,
    pub max_file_bytes: u64,
    pub min_file_bytes: u64,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            parse_mode: ParseMode::ParsePageWithoutLlm,
            high_res_ocr: true,
            adaptive_long_table: false,
            outlined_table_extraction: true,
            output_tables_as_html: true,
            timeout: Duration::from_secs(60),
            max_retries: 3,
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 30,
            settle_delay: Duration::from_secs(2),
            max_result_attempts: 5,
            result_backoff: Duration::from_secs(5),
            max_file_bytes: 10 * 1024 * 1024,
            min_file_bytes: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Success,
    Error,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body returned by the `/result/text` endpoint; the service has shipped both shapes.
#[derive(Debug, Clone, Deserialize)]
pub struct TextResultResponse {
    #[serde(default)]
    pub pages: Option<Vec<ParsedPage>>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedPage {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ParsedDocument {
    pub job_id: String,
    pub pages: Vec<ParsedPage>,
}

impl ParsedDocument {
    /// Concatenates page texts in reading order, skipping blank pages.
    ///
    /// Pages are joined without a separator.
    #[must_use]
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.text.as_str())
            .filter(|text| !text.trim().is_empty())
            .collect()
    }
}

impl From<(String, TextResultResponse)> for ParsedDocument {
    fn from((job_id, response): (String, TextResultResponse)) -> Self {
        let pages = match (response.pages, response.text) {
            (Some(pages), _) if !pages.is_empty() => pages,
            (_, Some(text)) => vec![ParsedPage { text }],
            _ => Vec::new(),
        };
        Self { job_id, pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str) -> ParsedPage {
        ParsedPage {
            text: text.to_string(),
        }
    }

    #[test]
    fn text_concatenates_pages_without_separator() {
        let doc = ParsedDocument {
            job_id: "job".into(),
            pages: vec![page("6. 창의적 "), page("  \n"), page("체험활동상황")],
        };
        assert_eq!(doc.text(), "6. 창의적 체험활동상황");
    }

    #[test]
    fn text_result_prefers_pages() {
        let response: TextResultResponse =
            serde_json::from_str(r#"{"pages":[{"text":"a"},{"text":"b"}],"text":"ignored"}"#)
                .unwrap();
        let doc = ParsedDocument::from(("job".to_string(), response));
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.text(), "ab");
    }

    #[test]
    fn text_result_falls_back_to_single_text() {
        let response: TextResultResponse = serde_json::from_str(r#"{"text":"whole"}"#).unwrap();
        let doc = ParsedDocument::from(("job".to_string(), response));
        assert_eq!(doc.pages, vec![page("whole")]);
    }

    #[test]
    fn job_status_tolerates_unknown_values() {
        let status: JobStatusResponse =
            serde_json::from_str(r#"{"id":"1","status":"PARTIAL_SUCCESS"}"#).unwrap();
        assert_eq!(status.status, JobStatus::Unknown);

        let status: JobStatusResponse =
            serde_json::from_str(r#"{"id":"1","status":"SUCCESS"}"#).unwrap();
        assert_eq!(status.status, JobStatus::Success);
    }

    #[test]
    fn default_config_matches_service_profile() {
        let config = ParseConfig::default();
        assert_eq!(config.parse_mode.as_str(), "parse_page_without_llm");
        assert!(config.high_res_ocr);
        assert!(!config.adaptive_long_table);
        assert!(config.outlined_table_extraction);
        assert!(config.output_tables_as_html);
        assert_eq!(config.max_retries, 3);
    }
}
