use anyhow::{Context, Result};
use parliament_core::config::{load_toml, PipelineConfig};
use parliament_core::{IntelligencePipeline, ToolExecutor};
use parliament_sdk::{ClientConfig, ParliamentClient};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(flatten)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub apis: ClientConfig,
}

/// `[server]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        load_toml(config_path)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IntelligencePipeline>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client: Arc<dyn ToolExecutor> = Arc::new(
            ParliamentClient::from_config(config.apis.clone())
                .context("Failed to create Parliament API client")?,
        );

        let pipeline = config
            .pipeline
            .build(Some(client))
            .context("Failed to build intelligence pipeline")?;

        Ok(Self::with_pipeline(pipeline))
    }

    pub fn with_pipeline(pipeline: IntelligencePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig::load(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(config.apis.max_retries, 2);
    }

    #[test]
    fn test_server_section() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("parliament.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [execution]
            max_tools = 1
            "#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:9000");
        assert_eq!(config.pipeline.execution.max_tools, 1);
        assert!(AppState::new(&config).is_ok());
    }
}
