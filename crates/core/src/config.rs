use crate::audit::AuditLog;
use crate::cache::ResultCache;
use crate::executor::ToolExecutor;
use crate::llm::{
    LlmClassifier, LlmClient, LlmEvaluator, LlmOptimizer, LlmRecommender, OpenAiCompatibleClient,
};
use crate::pipeline::{IntelligencePipeline, DEFAULT_MAX_QUERY_LENGTH, DEFAULT_MAX_TOOLS};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Which implementation backs the pipeline stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Rules,
    Llm,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntelligenceConfig {
    #[serde(default)]
    pub backend: BackendKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    20
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_llm_timeout_secs(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl LlmConfig {
    pub fn client(&self) -> Result<OpenAiCompatibleClient> {
        let api_key = std::env::var(&self.api_key_env)
            .with_context(|| format!("{} not set", self.api_key_env))?;

        Ok(OpenAiCompatibleClient::new(&self.endpoint, &self.model)
            .with_api_key(api_key)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry_backoff(Duration::from_millis(self.retry_backoff_ms)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Recommendations executed per search (1-3)
    pub max_tools: usize,
    pub tool_timeout_secs: u64,
    /// Zero disables the result cache
    pub cache_ttl_secs: u64,
    pub max_query_length: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_tools: DEFAULT_MAX_TOOLS,
            tool_timeout_secs: 30,
            cache_ttl_secs: 0,
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// JSON-lines file; unset disables auditing
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// The `[intelligence]`, `[llm]`, `[execution]` and `[audit]` sections of
/// `parliament.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub intelligence: IntelligenceConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub audit: AuditConfig,
}

impl PipelineConfig {
    pub fn build(&self, executor: Option<Arc<dyn ToolExecutor>>) -> Result<IntelligencePipeline> {
        let mut builder = IntelligencePipeline::builder()
            .max_tools(self.execution.max_tools)
            .tool_timeout(Duration::from_secs(self.execution.tool_timeout_secs))
            .max_query_length(self.execution.max_query_length);

        if self.intelligence.backend == BackendKind::Llm {
            let client: Arc<dyn LlmClient> =
                Arc::new(self.llm.client().context("Failed to configure LLM backend")?);
            builder = builder
                .classifier(Arc::new(LlmClassifier::new(client.clone())))
                .recommender(Arc::new(LlmRecommender::new(client.clone())))
                .optimizer(Arc::new(LlmOptimizer::new(client.clone())))
                .evaluator(Arc::new(LlmEvaluator::new(client)));
            tracing::info!(model = %self.llm.model, "Using LLM intelligence backend");
        }

        if let Some(executor) = executor {
            builder = builder.executor(executor);
        }

        if self.execution.cache_ttl_secs > 0 {
            builder = builder.cache(Arc::new(ResultCache::new(Duration::from_secs(
                self.execution.cache_ttl_secs,
            ))));
        }

        if let Some(path) = &self.audit.path {
            let audit = AuditLog::new(path).context("Failed to open audit log")?;
            builder = builder.audit_log(Arc::new(audit));
        }

        Ok(builder.build())
    }
}

/// Load a TOML file, falling back to defaults when it does not exist
pub fn load_toml<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "Configuration file not found, using defaults");
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    toml::from_str(&content).context("Failed to parse configuration file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.intelligence.backend, BackendKind::Rules);
        assert_eq!(config.execution.max_tools, 2);
        assert_eq!(config.execution.tool_timeout_secs, 30);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert!(config.audit.path.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [intelligence]
            backend = "llm"

            [execution]
            max_tools = 3
            cache_ttl_secs = 300
            "#,
        )
        .unwrap();
        assert_eq!(config.intelligence.backend, BackendKind::Llm);
        assert_eq!(config.execution.max_tools, 3);
        assert_eq!(config.execution.tool_timeout_secs, 30);
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config: PipelineConfig = load_toml(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.execution.max_tools, DEFAULT_MAX_TOOLS);
    }

    #[test]
    fn test_llm_backend_requires_key() {
        let mut config = PipelineConfig::default();
        config.intelligence.backend = BackendKind::Llm;
        config.llm.api_key_env = "PARLIAMENT_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(config.build(None).is_err());
    }

    #[tokio::test]
    async fn test_build_rule_pipeline_with_audit() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = PipelineConfig::default();
        config.audit.path = Some(temp_dir.path().join("audit.jsonl"));

        let pipeline = config.build(None).unwrap();
        assert_eq!(pipeline.backend_names(), ["rules", "rules", "rules", "heuristic"]);
        pipeline
            .search(&crate::types::IntelligentSearchRequest::new("debates on housing"))
            .await
            .unwrap();
        assert!(temp_dir.path().join("audit.jsonl").exists());
    }
}
