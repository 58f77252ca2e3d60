// Parliament API tools, one per registry entry

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, Tool, ToolRegistry};
use anyhow::{bail, Result};
use parliament_core::registry::{self, ToolRegistryEntry};
use parliament_core::{ToolExecutor, ToolName};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Exposes one downstream Parliament tool over MCP.
///
/// The input schema is derived from the core registry, so the MCP surface
/// and the pipeline always agree on parameter names.
pub struct ParliamentTool {
    entry: &'static ToolRegistryEntry,
    executor: Arc<dyn ToolExecutor>,
}

impl ParliamentTool {
    pub fn new(tool: ToolName, executor: Arc<dyn ToolExecutor>) -> Self {
        Self {
            entry: registry::entry(tool),
            executor,
        }
    }
}

/// Register every registry tool against `executor`
pub fn register_all(registry: &mut ToolRegistry, executor: Arc<dyn ToolExecutor>) {
    for tool in ToolName::ALL {
        registry.register(Arc::new(ParliamentTool::new(tool, executor.clone())));
    }
}

pub fn input_schema(entry: &ToolRegistryEntry) -> Value {
    let properties: Map<String, Value> = entry
        .parameters
        .iter()
        .map(|p| {
            (
                p.name.to_string(),
                json!({ "type": p.kind.json_type(), "description": p.description }),
            )
        })
        .collect();
    let required = entry
        .parameters
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name)
        .collect();
    json_schema_object(Value::Object(properties), required)
}

#[async_trait::async_trait]
impl Tool for ParliamentTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.entry.name.as_str().to_string(),
            description: self.entry.description.to_string(),
            input_schema: input_schema(self.entry),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let params = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => bail!("Arguments for {} must be an object, got {}", self.entry.name, other),
        };

        match self.executor.execute(self.entry.name, &params).await {
            Ok(result) => Ok(CallToolResult::json(&result)),
            Err(e) => {
                tracing::warn!(tool = %self.entry.name, error = %format!("{:#}", e), "Parliament tool failed");
                Ok(CallToolResult::error(format!("{:#}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parliament_core::Params;

    struct Recording;

    #[async_trait::async_trait]
    impl ToolExecutor for Recording {
        async fn execute(&self, tool: ToolName, params: &Params) -> Result<Value> {
            if tool == ToolName::GetDepartments {
                bail!("HTTP 503 from Members API");
            }
            Ok(json!({ "tool": tool.as_str(), "params": params }))
        }
    }

    #[test]
    fn test_schema_from_registry() {
        let tool = ParliamentTool::new(ToolName::GetDetailedMemberInformation, Arc::new(Recording));
        let schema = tool.schema();

        assert_eq!(schema.name, "get_detailed_member_information");
        assert_eq!(schema.input_schema["properties"]["member_id"]["type"], "integer");
        assert_eq!(schema.input_schema["required"], json!(["member_id"]));
    }

    #[test]
    fn test_register_all() {
        let mut tools = ToolRegistry::new();
        register_all(&mut tools, Arc::new(Recording));
        assert_eq!(tools.len(), 11);
        assert!(tools.contains("search_contributions"));
    }

    #[tokio::test]
    async fn test_execute_passes_arguments() {
        let tool = ParliamentTool::new(ToolName::SearchDebates, Arc::new(Recording));
        let result = tool.execute(json!({"query": "housing"})).await.unwrap();

        assert!(result.is_error.is_none());
        let body: Value = serde_json::from_str(result.text().unwrap()).unwrap();
        assert_eq!(body["tool"], "search_debates");
        assert_eq!(body["params"]["query"], "housing");
    }

    #[tokio::test]
    async fn test_downstream_failure_is_tool_error() {
        let tool = ParliamentTool::new(ToolName::GetDepartments, Arc::new(Recording));
        let result = tool.execute(Value::Null).await.unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(result.text().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_non_object_arguments_rejected() {
        let tool = ParliamentTool::new(ToolName::SearchDebates, Arc::new(Recording));
        assert!(tool.execute(json!(["housing"])).await.is_err());
    }
}
