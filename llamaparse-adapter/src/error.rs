use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlamaParseError {
    #[error("LlamaParse API key not found: {0}")]
    MissingApiKey(String),

    #[error("Invalid input file: {0}")]
    InvalidFile(String),

    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LlamaParse API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parsing job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    #[error("Parsing job {job_id} did not complete after {attempts} status checks")]
    PollTimeout { job_id: String, attempts: usize },

    #[error("Parsing job {0} produced no text")]
    EmptyResult(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParseError(String),
}

impl LlamaParseError {
    /// Whether a failed upload attempt may be retried.
    ///
    /// Authentication failures and local file problems are final.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => !matches!(*status, 401 | 403 | 413),
            Self::MissingApiKey(_) | Self::InvalidFile(_) | Self::Io(_) => false,
            _ => true,
        }
    }
}
