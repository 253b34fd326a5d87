use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {message}")]
    Http {
        status: Option<u16>,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {duration:?} ({request_id})")]
    Timeout {
        duration: Duration,
        request_id: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl Error {
    pub fn timeout(duration: Duration, request_id: impl Into<String>) -> Self {
        Error::Timeout {
            duration,
            request_id: request_id.into(),
        }
    }

    /// Whether a request that failed with this error may be sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) | Error::Timeout { .. } => true,
            Error::Http { status, .. } => status.map_or(true, |s| s >= 500),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Error::Transport(format!("malformed response body: {err}"));
        }
        Error::Http {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
