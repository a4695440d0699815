//! Error types for the pollbus client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Server answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Operation timed out")]
    Timeout,

    #[error("Server has dropped history")]
    HistoryDropped,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl ClientError {
    /// Check if the request is worth sending again unchanged.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Timeout | ClientError::Http(_) => true,
            ClientError::Status { status, .. } => {
                matches!(status, 408 | 425 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}
