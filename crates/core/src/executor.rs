use crate::types::{Params, ToolName};
use async_trait::async_trait;
use serde_json::Value;

/// Runs a registered downstream tool.
///
/// The pipeline owns no HTTP state; whoever builds it injects an executor
/// (normally the Parliament API client).
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, tool: ToolName, params: &Params) -> anyhow::Result<Value>;
}
