//! Error types for the Parliament SDK.

use serde::{Deserialize, Serialize};

/// Result type for SDK operations.
pub type ParliamentResult<T> = Result<T, ParliamentError>;

#[derive(Debug, thiserror::Error)]
pub enum ParliamentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Tool arguments missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ParliamentError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Create an error from a status code and response body.
    ///
    /// The Parliament APIs answer failures either with a JSON problem document
    /// (`title` / `detail`) or with plain text.
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            404 => return Self::NotFound(truncate_body(body)),
            429 => return Self::RateLimited { retry_after_secs: None },
            _ => {}
        }

        if let Ok(problem) = serde_json::from_str::<ProblemDetails>(body) {
            Self::Api {
                status,
                message: problem.title,
                details: problem.detail,
            }
        } else {
            Self::Api {
                status,
                message: truncate_body(body),
                details: None,
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let mut short: String = body.chars().take(MAX).collect();
        short.push_str("...");
        short
    }
}

/// RFC 7807 problem document returned by the Parliament APIs.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
