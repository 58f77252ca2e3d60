//! HTTP transport layer for the Parliament SDK.

use crate::config::RetryConfig;
use crate::error::{ParliamentError, ParliamentResult};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// HTTP transport shared by every API accessor.
///
/// One `reqwest::Client` (and so one connection pool) serves all three
/// Parliament APIs.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    retry_config: RetryConfig,
}

impl HttpTransport {
    pub fn new(timeout: Duration, retry_config: RetryConfig) -> ParliamentResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(concat!("parliament-sdk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            retry_config,
        })
    }

    /// Append `path` to `base` as extra path segments.
    ///
    /// `Url::join` would replace the last segment of bases such as `/api`, so
    /// segments are pushed explicitly.
    pub(crate) fn build_url(&self, base: &Url, path: &str) -> ParliamentResult<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ParliamentError::Config(format!("{} cannot be a base URL", base)))?
            .pop_if_empty()
            .extend(path.trim_start_matches('/').split('/'));
        Ok(url)
    }

    /// Execute a request with retries.
    async fn execute_with_retry(&self, request_builder: RequestBuilder) -> ParliamentResult<Response> {
        let retry_config = &self.retry_config;
        let mut attempts = 0;

        loop {
            let request = request_builder
                .try_clone()
                .ok_or_else(|| ParliamentError::Config("Request cannot be cloned".to_string()))?;

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();

                    if response.status().is_success() {
                        return Ok(response);
                    }

                    if attempts < retry_config.max_retries
                        && retry_config.should_retry_status(status)
                    {
                        let backoff = retry_config.backoff_for_attempt(attempts);
                        warn!(
                            status = status,
                            attempt = attempts + 1,
                            backoff_ms = backoff.as_millis(),
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                        attempts += 1;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(ParliamentError::from_response(status, &body));
                }
                Err(e) => {
                    if attempts < retry_config.max_retries && (e.is_timeout() || e.is_connect()) {
                        let backoff = retry_config.backoff_for_attempt(attempts);
                        warn!(
                            attempt = attempts + 1,
                            backoff_ms = backoff.as_millis(),
                            error = %e,
                            "Request did not complete, retrying"
                        );
                        tokio::time::sleep(backoff).await;
                        attempts += 1;
                        continue;
                    }
                    if e.is_timeout() {
                        return Err(ParliamentError::Timeout);
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Execute a GET request.
    pub async fn get<T: DeserializeOwned>(&self, base: &Url, path: &str) -> ParliamentResult<T> {
        self.get_with_query(base, path, &[]).await
    }

    /// Execute a GET request with query parameters.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        base: &Url,
        path: &str,
        query: &[(&str, String)],
    ) -> ParliamentResult<T> {
        let url = self.build_url(base, path)?;
        debug!(url = %url, params = query.len(), "GET request");

        let response = self
            .execute_with_retry(self.client.get(url).query(query))
            .await?;
        let body = response.json().await?;
        Ok(body)
    }
}
