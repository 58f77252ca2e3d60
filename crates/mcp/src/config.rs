use anyhow::Result;
use parliament_core::config::{load_toml, PipelineConfig};
use parliament_sdk::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `parliament.toml` as read by the MCP server: the pipeline sections plus
/// `[apis]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(flatten)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub apis: ClientConfig,
}

impl McpConfig {
    pub fn load(path: &Path) -> Result<Self> {
        load_toml(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parliament_core::config::BackendKind;
    use tempfile::TempDir;

    #[test]
    fn test_load_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("parliament.toml");
        std::fs::write(
            &path,
            r#"
            [execution]
            max_tools = 3

            [apis]
            members_url = "http://localhost:9000/api"
            timeout_secs = 5
            "#,
        )
        .unwrap();

        let config = McpConfig::load(&path).unwrap();
        assert_eq!(config.pipeline.execution.max_tools, 3);
        assert_eq!(config.pipeline.intelligence.backend, BackendKind::Rules);
        assert_eq!(config.apis.members_url.as_str(), "http://localhost:9000/api");
        assert_eq!(config.apis.timeout_secs, 5);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = McpConfig::load(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.apis.max_retries, 2);
    }
}
