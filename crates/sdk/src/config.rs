//! Configuration types for the Parliament SDK.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const MEMBERS_API_URL: &str = "https://members-api.parliament.uk/api";
pub const QUESTIONS_API_URL: &str = "https://questions-statements-api.parliament.uk/api";
pub const HANSARD_API_URL: &str = "https://hansard-api.parliament.uk";

/// Configuration for the Parliament client.
///
/// Deserializes from the `[apis]` section of `parliament.toml`; every field
/// has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the Members API.
    pub members_url: Url,
    /// Base URL of the Written Questions and Statements API.
    pub questions_url: Url,
    /// Base URL of the Hansard API.
    pub hansard_url: Url,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Backoff before the first retry, doubled for each further retry.
    pub initial_backoff_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            members_url: default_url(MEMBERS_API_URL),
            questions_url: default_url(QUESTIONS_API_URL),
            hansard_url: default_url(HANSARD_API_URL),
            timeout_secs: 30,
            max_retries: 2,
            initial_backoff_ms: 250,
        }
    }
}

fn default_url(raw: &str) -> Url {
    // The defaults are constant, well-formed URLs.
    Url::parse(raw).expect("valid default API url")
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Retry behaviour derived from the configured attempt count and backoff.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            ..Default::default()
        }
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries.
    pub max_retries: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
    /// HTTP status codes to retry on.
    pub retry_on_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            retry_on_status_codes: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate backoff duration for a given attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_ms = self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let backoff = Duration::from_millis(backoff_ms as u64);
        std::cmp::min(backoff, self.max_backoff)
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status_codes.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let config = RetryConfig::default();

        assert_eq!(config.backoff_for_attempt(0), Duration::from_millis(250));
        assert_eq!(config.backoff_for_attempt(1), Duration::from_millis(500));
        assert_eq!(config.backoff_for_attempt(2), Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_capped_at_max() {
        let config = RetryConfig {
            max_backoff: Duration::from_millis(500),
            ..Default::default()
        };

        assert_eq!(config.backoff_for_attempt(10), Duration::from_millis(500));
    }

    #[test]
    fn test_should_retry_status() {
        let config = RetryConfig::default();

        assert!(config.should_retry_status(429));
        assert!(config.should_retry_status(503));
        assert!(!config.should_retry_status(400));
        assert!(!config.should_retry_status(404));
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();

        assert_eq!(config.members_url.as_str(), "https://members-api.parliament.uk/api");
        assert_eq!(config.hansard_url.host_str(), Some("hansard-api.parliament.uk"));
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_config().max_retries, 2);
    }

    #[test]
    fn test_partial_apis_section() {
        let config: ClientConfig = from_json(
            r#"{"members_url": "http://localhost:9000/api", "max_retries": 0}"#,
        );

        assert_eq!(config.members_url.as_str(), "http://localhost:9000/api");
        assert_eq!(config.questions_url.as_str(), QUESTIONS_API_URL);
        assert_eq!(config.retry_config().max_retries, 0);
    }

    fn from_json(json: &str) -> ClientConfig {
        serde_json::from_str(json).unwrap()
    }
}
