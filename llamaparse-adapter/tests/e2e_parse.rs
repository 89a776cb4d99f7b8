//! End-to-end tests against the hosted LlamaParse service.
//!
//! These tests require a LlamaCloud API key and a sample student record.
//! They are marked `#[ignore]` to prevent CI failures in environments without
//! credentials.
//!
//! ## Requirements
//!
//! - `LLAMA_API_KEY` set
//! - `MEDSKY_SAMPLE_PDF` pointing at a scanned student record
//! - Network access for API calls
//!
//! ## Running E2E Tests
//!
//! ```bash
//! cargo test -p llamaparse-adapter -- --ignored
//! ```

use llamaparse_adapter::{LlamaParseClient, LlamaParseError, ParseConfig};
use std::path::PathBuf;

/// Builds a client from the environment, returns None if not configured.
fn get_client() -> Option<(LlamaParseClient, PathBuf)> {
    let sample = std::env::var("MEDSKY_SAMPLE_PDF").ok()?;
    let client = LlamaParseClient::from_env(ParseConfig::default()).ok()?;
    Some((client, PathBuf::from(sample)))
}

#[tokio::test]
#[ignore = "Requires LLAMA_API_KEY and MEDSKY_SAMPLE_PDF"]
async fn e2e_parse_sample_record() {
    let Some((client, sample)) = get_client() else {
        eprintln!("Skipping: LlamaParse not configured");
        return;
    };

    let document = client.parse_file(&sample).await.expect("parse should succeed");

    assert!(!document.pages.is_empty());
    assert!(!document.text().trim().is_empty());
}

#[tokio::test]
#[ignore = "Requires network access"]
async fn e2e_invalid_key_is_not_retried() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("blank.pdf");
    std::fs::write(&path, vec![b'x'; 2048]).expect("write sample");

    let config = ParseConfig {
        max_retries: 3,
        ..ParseConfig::default()
    };
    let client = LlamaParseClient::new("llx-invalid", config);

    let start = std::time::Instant::now();
    let err = client.parse_file(&path).await.unwrap_err();

    assert!(matches!(err, LlamaParseError::Api { status: 401 | 403, .. }));
    // No backoff sleeps happened.
    assert!(start.elapsed().as_secs() < 2);
}

#[tokio::test]
async fn rejects_non_pdf_before_network() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("record.docx");
    std::fs::write(&path, vec![b'x'; 2048]).expect("write sample");

    let client = LlamaParseClient::new("llx-unused", ParseConfig::default());
    let err = client.parse_file(&path).await.unwrap_err();

    assert!(matches!(err, LlamaParseError::InvalidFile(_)));
}
