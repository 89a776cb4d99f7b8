//! Parsing job lifecycle: upload, status polling and result retrieval.

use crate::error::LlamaParseError;
use crate::types::{
    JobStatus, JobStatusResponse, ParseConfig, ParsedDocument, TextResultResponse, UploadResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

/// Uploads `path` and runs the parsing job to completion, retrying failed
/// attempts with exponential backoff.
///
/// # Errors
/// Returns the last [`LlamaParseError`] once every attempt has failed, or
/// immediately for errors that cannot succeed on retry.
pub async fn run_parse_job(
    http: &Client,
    api_key: &str,
    path: &Path,
    config: &ParseConfig,
) -> Result<ParsedDocument, LlamaParseError> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document.pdf")
        .to_string();

    let max_attempts = config.max_retries.max(1);
    let mut attempt = 1;
    loop {
        tracing::info!(attempt, max_attempts, file = %file_name, "PDF parsing attempt");

        match parse_once(http, api_key, &file_name, &bytes, config).await {
            Ok(document) => {
                tracing::info!(
                    attempt,
                    pages = document.pages.len(),
                    "PDF parsing succeeded"
                );
                return Ok(document);
            }
            Err(e) if !e.is_retryable() || attempt >= max_attempts => return Err(e),
            Err(e) => {
                let backoff = Duration::from_secs(1 << attempt.min(6));
                tracing::warn!(attempt, error = %e, ?backoff, "PDF parsing attempt failed");
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}

async fn parse_once(
    http: &Client,
    api_key: &str,
    file_name: &str,
    bytes: &[u8],
    config: &ParseConfig,
) -> Result<ParsedDocument, LlamaParseError> {
    let job_id = upload(http, api_key, file_name, bytes, config).await?;
    tracing::info!(%job_id, "Created parsing job");

    wait_for_job(http, api_key, &job_id, config).await?;
    tokio::time::sleep(config.settle_delay).await;

    let document = fetch_text_result(http, api_key, &job_id, config).await?;
    if document.text().trim().is_empty() {
        return Err(LlamaParseError::EmptyResult(job_id));
    }
    Ok(document)
}

/// Step 1: upload the file and create a parsing job.
async fn upload(
    http: &Client,
    api_key: &str,
    file_name: &str,
    bytes: &[u8],
    config: &ParseConfig,
) -> Result<String, LlamaParseError> {
    let part = Part::bytes(bytes.to_vec())
        .file_name(file_name.to_string())
        .mime_str("application/pdf")?;

    let form = Form::new()
        .part("file", part)
        .text("parse_mode", config.parse_mode.as_str())
        .text("high_res_ocr", config.high_res_ocr.to_string())
        .text("adaptive_long_table", config.adaptive_long_table.to_string())
        .text(
            "outlined_table_extraction",
            config.outlined_table_extraction.to_string(),
        )
        .text("output_tables_as_HTML", config.output_tables_as_html.to_string());

    let response = http
        .post(format!("{}/api/v1/parsing/upload", config.base_url))
        .bearer_auth(api_key)
        .multipart(form)
        .timeout(config.timeout)
        .send()
        .await?;

    let upload: UploadResponse = read_json(response).await?;
    Ok(upload.id)
}

/// Step 2: poll the job status until it succeeds, fails, or polling runs out.
async fn wait_for_job(
    http: &Client,
    api_key: &str,
    job_id: &str,
    config: &ParseConfig,
) -> Result<(), LlamaParseError> {
    let attempts = config.max_poll_attempts.max(1);

    for attempt in 1..=attempts {
        let status = match poll_status(http, api_key, &config.base_url, job_id).await {
            Ok(status) => status,
            Err(e @ LlamaParseError::Api { status: 401 | 403, .. }) => return Err(e),
            Err(e) if attempt == attempts => return Err(e),
            Err(e) => {
                tracing::warn!(%job_id, attempt, error = %e, "Job status check failed");
                tokio::time::sleep(config.poll_interval).await;
                continue;
            }
        };

        tracing::debug!(%job_id, attempt, status = ?status.status, "Job status");
        match status.status {
            JobStatus::Success => return Ok(()),
            JobStatus::Error | JobStatus::Cancelled => {
                return Err(LlamaParseError::JobFailed {
                    job_id: job_id.to_string(),
                    message: status.error.unwrap_or_else(|| "Unknown error".to_string()),
                });
            }
            JobStatus::Pending | JobStatus::Unknown => {
                if attempt < attempts {
                    tokio::time::sleep(config.poll_interval).await;
                }
            }
        }
    }

    Err(LlamaParseError::PollTimeout {
        job_id: job_id.to_string(),
        attempts,
    })
}

async fn poll_status(
    http: &Client,
    api_key: &str,
    base_url: &str,
    job_id: &str,
) -> Result<JobStatusResponse, LlamaParseError> {
    let response = http
        .get(format!("{base_url}/api/v1/parsing/job/{job_id}"))
        .bearer_auth(api_key)
        .send()
        .await?;
    read_json(response).await
}

/// Step 3: fetch the per-page text result. A 404 means the result is not
/// materialized yet and is retried with a growing wait.
async fn fetch_text_result(
    http: &Client,
    api_key: &str,
    job_id: &str,
    config: &ParseConfig,
) -> Result<ParsedDocument, LlamaParseError> {
    let attempts = config.max_result_attempts.max(1);
    let url = format!(
        "{}/api/v1/parsing/job/{job_id}/result/text",
        config.base_url
    );

    for attempt in 1..=attempts {
        let response = http
            .get(&url)
            .bearer_auth(api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND && attempt < attempts {
            let wait = config.result_backoff * u32::try_from(attempt).unwrap_or(u32::MAX);
            tracing::info!(%job_id, attempt, ?wait, "Result not ready, waiting before retry");
            tokio::time::sleep(wait).await;
            continue;
        }

        let body: TextResultResponse = read_json(response).await?;
        return Ok(ParsedDocument::from((job_id.to_string(), body)));
    }

    Err(LlamaParseError::EmptyResult(job_id.to_string()))
}

/// Checks the status, then decodes the body as `T`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, LlamaParseError> {
    let body = ensure_success(response).await?.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(120).collect();
        LlamaParseError::JsonParseError(format!("{e} in body: {preview}"))
    })
}

async fn ensure_success(response: Response) -> Result<Response, LlamaParseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlamaParseError::Api {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    type Responder = dyn Fn(&str, usize) -> (u16, String) + Send + Sync;

    const JOB: &str = "job-1";
    const UPLOAD_PATH: &str = "/api/v1/parsing/upload";
    const STATUS_PATH: &str = "/api/v1/parsing/job/job-1";
    const RESULT_PATH: &str = "/api/v1/parsing/job/job-1/result/text";

    /// Local HTTP/1.1 server answering one request per connection. The
    /// responder gets the request path and how often that path was hit.
    struct MockServer {
        base_url: String,
        hits: Arc<Mutex<HashMap<String, usize>>>,
    }

    impl MockServer {
        async fn start(respond: impl Fn(&str, usize) -> (u16, String) + Send + Sync + 'static) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            let hits = Arc::new(Mutex::new(HashMap::new()));
            let respond: Arc<Responder> = Arc::new(respond);
            let counter = Arc::clone(&hits);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let respond = Arc::clone(&respond);
                    let counter = Arc::clone(&counter);
                    tokio::spawn(async move { handle(stream, respond.as_ref(), &counter).await });
                }
            });
            Self { base_url, hits }
        }

        fn hits(&self, path: &str) -> usize {
            self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
        }

        fn config(&self) -> ParseConfig {
            ParseConfig {
                base_url: self.base_url.clone(),
                poll_interval: Duration::ZERO,
                settle_delay: Duration::ZERO,
                result_backoff: Duration::from_millis(1),
                max_poll_attempts: 3,
                max_result_attempts: 3,
                ..ParseConfig::default()
            }
        }
    }

    async fn read_more(stream: &mut TcpStream, buf: &mut Vec<u8>) -> bool {
        let mut chunk = [0u8; 4096];
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => false,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                true
            }
        }
    }

    async fn handle(mut stream: TcpStream, respond: &Responder, hits: &Mutex<HashMap<String, usize>>) {
        let mut buf = Vec::new();
        let head_end = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            if !read_more(&mut stream, &mut buf).await {
                return;
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
        let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();

        // Drain the body so the client never sees a reset mid-upload.
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok());
        if let Some(len) = content_length {
            while buf.len() < head_end + len && read_more(&mut stream, &mut buf).await {}
        } else if head.contains("transfer-encoding: chunked") {
            while !buf.ends_with(b"0\r\n\r\n") && read_more(&mut stream, &mut buf).await {}
        }

        let count = {
            let mut hits = hits.lock().unwrap();
            let count = hits.entry(path.clone()).or_insert(0);
            *count += 1;
            *count
        };
        let (status, body) = respond(&path, count);
        let response = format!(
            "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    }

    fn ok(body: &str) -> (u16, String) {
        (200, body.to_string())
    }

    const PAGES: &str = r#"{"pages":[{"text":"6. 창의적 체험활동상황\n"},{"text":"  "},{"text":"7. 교과학습발달상황"}]}"#;

    #[tokio::test]
    async fn result_fetch_retries_while_not_ready() {
        let server = MockServer::start(|_, hit| if hit < 3 { (404, "{}".into()) } else { ok(PAGES) }).await;
        let http = Client::new();

        let document = fetch_text_result(&http, "key", JOB, &server.config()).await.unwrap();

        assert_eq!(server.hits(RESULT_PATH), 3);
        assert_eq!(document.pages.len(), 3);
        assert_eq!(document.text(), "6. 창의적 체험활동상황\n7. 교과학습발달상황");
    }

    #[tokio::test]
    async fn result_fetch_gives_up_on_last_not_found() {
        let server = MockServer::start(|_, _| (404, r#"{"detail":"not found"}"#.into())).await;
        let http = Client::new();

        let err = fetch_text_result(&http, "key", JOB, &server.config()).await.unwrap_err();

        assert!(matches!(err, LlamaParseError::Api { status: 404, .. }));
        assert_eq!(server.hits(RESULT_PATH), 3);
    }

    #[tokio::test]
    async fn status_auth_failure_is_final() {
        let server = MockServer::start(|_, _| (401, r#"{"detail":"invalid key"}"#.into())).await;
        let http = Client::new();

        let err = wait_for_job(&http, "bad-key", JOB, &server.config()).await.unwrap_err();

        assert!(matches!(err, LlamaParseError::Api { status: 401, .. }));
        assert_eq!(server.hits(STATUS_PATH), 1);
    }

    #[tokio::test]
    async fn pending_job_times_out() {
        let server = MockServer::start(|_, _| ok(r#"{"id":"job-1","status":"PENDING"}"#)).await;
        let http = Client::new();

        let err = wait_for_job(&http, "key", JOB, &server.config()).await.unwrap_err();

        assert!(matches!(err, LlamaParseError::PollTimeout { attempts: 3, .. }));
        assert_eq!(server.hits(STATUS_PATH), 3);
    }

    #[tokio::test]
    async fn failed_job_carries_service_message() {
        let server =
            MockServer::start(|_, _| ok(r#"{"id":"job-1","status":"ERROR","error":"corrupt pdf"}"#)).await;
        let http = Client::new();

        let err = wait_for_job(&http, "key", JOB, &server.config()).await.unwrap_err();

        assert!(matches!(err, LlamaParseError::JobFailed { ref message, .. } if message == "corrupt pdf"));
    }

    #[tokio::test]
    async fn malformed_status_body_is_json_error() {
        let server = MockServer::start(|_, _| ok("<html>gateway</html>")).await;
        let http = Client::new();

        let err = wait_for_job(&http, "key", JOB, &server.config()).await.unwrap_err();

        assert!(matches!(err, LlamaParseError::JsonParseError(ref msg) if msg.contains("<html>")));
        assert_eq!(server.hits(STATUS_PATH), 3);
    }

    #[tokio::test]
    async fn full_job_uploads_polls_and_fetches() {
        let server = MockServer::start(|path, hit| match path {
            UPLOAD_PATH => ok(r#"{"id":"job-1"}"#),
            STATUS_PATH if hit == 1 => ok(r#"{"id":"job-1","status":"PENDING"}"#),
            STATUS_PATH => ok(r#"{"id":"job-1","status":"SUCCESS"}"#),
            RESULT_PATH => ok(PAGES),
            _ => (500, "{}".into()),
        })
        .await;
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("record.pdf");
        std::fs::write(&pdf, vec![b'%'; 2048]).unwrap();

        let document = run_parse_job(&Client::new(), "key", &pdf, &server.config()).await.unwrap();

        assert_eq!(document.job_id, JOB);
        assert_eq!(document.pages.len(), 3);
        assert_eq!(server.hits(UPLOAD_PATH), 1);
        assert_eq!(server.hits(STATUS_PATH), 2);
        assert_eq!(server.hits(RESULT_PATH), 1);
    }

    #[tokio::test]
    async fn upload_auth_failure_is_not_retried() {
        let server = MockServer::start(|_, _| (403, r#"{"detail":"forbidden"}"#.into())).await;
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("record.pdf");
        std::fs::write(&pdf, vec![b'%'; 2048]).unwrap();

        let err = run_parse_job(&Client::new(), "key", &pdf, &server.config()).await.unwrap_err();

        assert!(matches!(err, LlamaParseError::Api { status: 403, .. }));
        assert_eq!(server.hits(UPLOAD_PATH), 1);
    }
}
