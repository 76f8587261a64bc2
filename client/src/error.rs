use reqwest::StatusCode;
use thiserror::Error;

/// Failure taxonomy for client calls. `Status` carries the server's flat
/// `{"error": ...}` message; transport-level failures land in `Network`,
/// which callers may treat as retry-able.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("server answered {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),
    #[error("response body did not decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("{0}")]
    InvalidUpload(String),
    #[error("flags file error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Whether retrying the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
