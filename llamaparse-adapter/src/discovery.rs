//! Locates the LlamaParse API key and validates input files.

use crate::error::LlamaParseError;
use crate::types::ParseConfig;
use std::path::Path;

/// Environment variable holding the LlamaCloud API key.
pub const LLAMA_API_KEY_ENV_VAR: &str = "LLAMA_API_KEY";

/// Resolves the LlamaCloud API key.
///
/// Resolution order:
/// 1. `explicit` if provided and non-empty.
/// 2. The `LLAMA_API_KEY` environment variable.
/// 3. Helpful error.
///
/// # Errors
///
/// Returns `LlamaParseError::MissingApiKey` when no key is configured.
pub fn discover_api_key(explicit: Option<String>) -> Result<String, LlamaParseError> {
    // 1. Explicit value
    if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
        return Ok(key);
    }

    // 2. Environment variable
    if let Ok(key) = std::env::var(LLAMA_API_KEY_ENV_VAR) {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }

    // 3. Helpful error
    Err(LlamaParseError::MissingApiKey(format!(
        "set {LLAMA_API_KEY_ENV_VAR} or pass a key explicitly"
    )))
}

/// Checks that `path` looks like a PDF within the configured size bounds.
///
/// # Errors
///
/// Returns `LlamaParseError::InvalidFile` for a wrong extension or size and
/// `LlamaParseError::Io` if the file metadata cannot be read.
pub fn validate_input_file(path: &Path, config: &ParseConfig) -> Result<u64, LlamaParseError> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(LlamaParseError::InvalidFile(format!(
            "only PDF files are supported: {}",
            path.display()
        )));
    }

    let size = std::fs::metadata(path)?.len();
    if size > config.max_file_bytes {
        return Err(LlamaParseError::InvalidFile(format!(
            "file too large: {size} bytes (max {} bytes)",
            config.max_file_bytes
        )));
    }
    if size < config.min_file_bytes {
        return Err(LlamaParseError::InvalidFile(format!(
            "file too small: {size} bytes, the PDF appears to have no content"
        )));
    }

    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_key_wins() {
        let key = discover_api_key(Some("llx-explicit".to_string())).unwrap();
        assert_eq!(key, "llx-explicit");
    }

    #[test]
    fn rejects_non_pdf_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.txt");
        std::fs::write(&path, vec![b'x'; 2048]).unwrap();

        let err = validate_input_file(&path, &ParseConfig::default()).unwrap_err();
        assert!(matches!(err, LlamaParseError::InvalidFile(_)));
    }

    #[test]
    fn enforces_size_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let config = ParseConfig::default();

        let tiny = dir.path().join("tiny.pdf");
        std::fs::write(&tiny, b"%PDF-1.7").unwrap();
        assert!(matches!(
            validate_input_file(&tiny, &config),
            Err(LlamaParseError::InvalidFile(msg)) if msg.contains("too small")
        ));

        let ok = dir.path().join("Record.PDF");
        let mut file = std::fs::File::create(&ok).unwrap();
        file.write_all(&vec![b'x'; 4096]).unwrap();
        assert_eq!(validate_input_file(&ok, &config).unwrap(), 4096);

        let strict = ParseConfig {
            max_file_bytes: 2048,
            ..ParseConfig::default()
        };
        assert!(matches!(
            validate_input_file(&ok, &strict),
            Err(LlamaParseError::InvalidFile(msg)) if msg.contains("too large")
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = validate_input_file(Path::new("/nonexistent/record.pdf"), &ParseConfig::default())
            .unwrap_err();
        assert!(matches!(err, LlamaParseError::Io(_)));
    }
}
