//! Main client for the Parliament SDK.

use crate::api::*;
use crate::config::{ClientConfig, RetryConfig};
use crate::error::{ParliamentError, ParliamentResult};
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Client for the Members, Written Questions and Hansard APIs.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ParliamentClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl ParliamentClient {
    pub fn builder() -> ParliamentClientBuilder {
        ParliamentClientBuilder::new()
    }

    /// Client against the public Parliament APIs with default settings.
    pub fn new() -> ParliamentResult<Self> {
        Self::from_config(ClientConfig::default())
    }

    pub fn from_config(config: ClientConfig) -> ParliamentResult<Self> {
        let http = HttpTransport::new(config.timeout(), config.retry_config())?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn constituencies(&self) -> ConstituenciesApi<'_> {
        ConstituenciesApi::new(self)
    }

    pub fn members(&self) -> MembersApi<'_> {
        MembersApi::new(self)
    }

    pub fn questions(&self) -> QuestionsApi<'_> {
        QuestionsApi::new(self)
    }

    pub fn hansard(&self) -> HansardApi<'_> {
        HansardApi::new(self)
    }

    pub fn reference(&self) -> ReferenceApi<'_> {
        ReferenceApi::new(self)
    }
}

/// Builder for creating a `ParliamentClient`.
pub struct ParliamentClientBuilder {
    config: ClientConfig,
    retry_config: Option<RetryConfig>,
    members_url: Option<String>,
    questions_url: Option<String>,
    hansard_url: Option<String>,
}

impl ParliamentClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            retry_config: None,
            members_url: None,
            questions_url: None,
            hansard_url: None,
        }
    }

    /// Start from an existing configuration, e.g. the `[apis]` section.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn members_url(mut self, url: impl Into<String>) -> Self {
        self.members_url = Some(url.into());
        self
    }

    pub fn questions_url(mut self, url: impl Into<String>) -> Self {
        self.questions_url = Some(url.into());
        self
    }

    pub fn hansard_url(mut self, url: impl Into<String>) -> Self {
        self.hansard_url = Some(url.into());
        self
    }

    /// Point all three APIs at one host, keeping their usual path prefixes.
    ///
    /// Useful against a local mock server.
    pub fn base_url(self, url: impl Into<String>) -> Self {
        let root = url.into();
        let root = root.trim_end_matches('/');
        self.members_url(format!("{}/api", root))
            .questions_url(format!("{}/api", root))
            .hansard_url(root.to_string())
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = Some(config);
        self
    }

    pub fn build(self) -> ParliamentResult<ParliamentClient> {
        let mut config = self.config;
        if let Some(url) = self.members_url {
            config.members_url = Url::parse(&url)?;
        }
        if let Some(url) = self.questions_url {
            config.questions_url = Url::parse(&url)?;
        }
        if let Some(url) = self.hansard_url {
            config.hansard_url = Url::parse(&url)?;
        }

        for url in [&config.members_url, &config.questions_url, &config.hansard_url] {
            if url.cannot_be_a_base() {
                return Err(ParliamentError::Config(format!("{} cannot be a base URL", url)));
            }
        }

        match self.retry_config {
            Some(retry) => {
                let http = HttpTransport::new(config.timeout(), retry)?;
                Ok(ParliamentClient {
                    config: Arc::new(config),
                    http,
                })
            }
            None => ParliamentClient::from_config(config),
        }
    }
}

impl Default for ParliamentClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use wiremock::MockServer;

    /// Client whose three APIs all live on `server`, without retries
    pub(crate) fn client_for(server: &MockServer) -> ParliamentClient {
        ParliamentClient::builder()
            .base_url(server.uri())
            .retry_config(RetryConfig::no_retry())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults_to_public_apis() {
        let client = ParliamentClient::builder().build().unwrap();
        assert_eq!(
            client.config().members_url.as_str(),
            "https://members-api.parliament.uk/api"
        );
    }

    #[test]
    fn test_base_url_keeps_prefixes() {
        let client = ParliamentClient::builder()
            .base_url("http://localhost:9000/")
            .build()
            .unwrap();
        assert_eq!(client.config().members_url.as_str(), "http://localhost:9000/api");
        assert_eq!(client.config().questions_url.as_str(), "http://localhost:9000/api");
        assert_eq!(client.config().hansard_url.as_str(), "http://localhost:9000/");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = ParliamentClient::builder().members_url("not a url").build();
        assert!(matches!(result, Err(ParliamentError::InvalidUrl(_))));

        let result = ParliamentClient::builder().hansard_url("mailto:a@b.c").build();
        assert!(matches!(result, Err(ParliamentError::Config(_))));
    }
}
