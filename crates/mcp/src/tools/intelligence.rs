// Intelligence tools backed by the query pipeline

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_boolean, json_schema_object, json_schema_string, Tool, ToolRegistry};
use anyhow::{Context, Result};
use parliament_core::{IntelligencePipeline, IntelligentSearchRequest, PipelineError, QueryContext};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
    #[serde(default)]
    context: Option<QueryContext>,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    context: Option<QueryContext>,
    #[serde(default = "enabled")]
    auto_execute: bool,
    #[serde(default = "enabled")]
    evaluation_enabled: bool,
}

fn enabled() -> bool {
    true
}

fn query_properties() -> serde_json::Value {
    json!({
        "query": json_schema_string("Natural-language question about Parliament"),
        "context": {
            "type": "object",
            "description": "Optional hints such as {\"location\": \"Leeds\"}"
        }
    })
}

/// Register the three intelligence tools against `pipeline`
pub fn register_all(registry: &mut ToolRegistry, pipeline: Arc<IntelligencePipeline>) {
    registry.register(Arc::new(IntelligentSearchTool::new(pipeline.clone())));
    registry.register(Arc::new(AnalyzeQueryIntentTool::new(pipeline.clone())));
    registry.register(Arc::new(ToolRecommendationsTool::new(pipeline)));
}

/// Full pipeline: analyze, recommend, optionally execute and evaluate.
pub struct IntelligentSearchTool {
    pipeline: Arc<IntelligencePipeline>,
}

impl IntelligentSearchTool {
    pub fn new(pipeline: Arc<IntelligencePipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait::async_trait]
impl Tool for IntelligentSearchTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = query_properties();
        properties["auto_execute"] =
            json_schema_boolean("Execute the recommended tools and return their results", true);
        properties["evaluation_enabled"] =
            json_schema_boolean("Score the quality of each executed result", true);

        ToolSchema {
            name: "intelligent_search".to_string(),
            description: "Analyze a question, pick the best Parliament tools and parameters, and optionally run them".to_string(),
            input_schema: json_schema_object(properties, vec!["query"]),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        self.execute_with_cancellation(arguments, CancellationToken::new())
            .await
    }

    async fn execute_with_cancellation(
        &self,
        arguments: serde_json::Value,
        token: CancellationToken,
    ) -> Result<CallToolResult> {
        let args: SearchArgs =
            serde_json::from_value(arguments).context("Invalid arguments for intelligent_search")?;

        let mut request = IntelligentSearchRequest::new(args.query)
            .auto_execute(args.auto_execute)
            .evaluation(args.evaluation_enabled);
        if let Some(context) = args.context {
            request = request.with_context(context);
        }

        match self.pipeline.search_with_cancellation(&request, token).await {
            Ok(response) => Ok(CallToolResult::json(&serde_json::to_value(&response)?)),
            Err(e @ PipelineError::InvalidInput(_)) => Ok(CallToolResult::error(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Intent classification only.
pub struct AnalyzeQueryIntentTool {
    pipeline: Arc<IntelligencePipeline>,
}

impl AnalyzeQueryIntentTool {
    pub fn new(pipeline: Arc<IntelligencePipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait::async_trait]
impl Tool for AnalyzeQueryIntentTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "analyze_query_intent".to_string(),
            description: "Classify the intent of a question and extract its entities, dates and keywords".to_string(),
            input_schema: json_schema_object(query_properties(), vec!["query"]),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: QueryArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for analyze_query_intent")?;

        let analysis = self.pipeline.analyze(&args.query, args.context.as_ref()).await;
        Ok(CallToolResult::json(&serde_json::to_value(&analysis)?))
    }
}

/// Analysis plus ranked tool recommendations, without execution.
pub struct ToolRecommendationsTool {
    pipeline: Arc<IntelligencePipeline>,
}

impl ToolRecommendationsTool {
    pub fn new(pipeline: Arc<IntelligencePipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait::async_trait]
impl Tool for ToolRecommendationsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_tool_recommendations".to_string(),
            description: "Recommend which Parliament tools to call for a question, with suggested parameters".to_string(),
            input_schema: json_schema_object(query_properties(), vec!["query"]),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: QueryArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for get_tool_recommendations")?;

        let (analysis, recommendations) =
            self.pipeline.recommend(&args.query, args.context.as_ref()).await;
        Ok(CallToolResult::json(&json!({
            "query_analysis": analysis,
            "recommended_tools": recommendations,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn pipeline() -> Arc<IntelligencePipeline> {
        Arc::new(IntelligencePipeline::rule_based())
    }

    fn body(result: &CallToolResult) -> Value {
        serde_json::from_str(result.text().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_query_intent() {
        let tool = AnalyzeQueryIntentTool::new(pipeline());
        let result = tool
            .execute(json!({"query": "Find Birmingham constituency information"}))
            .await
            .unwrap();
        let analysis = body(&result);
        assert_eq!(analysis["intent"], "constituency_search");
        assert!(analysis["entities"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e == "Birmingham"));
    }

    #[tokio::test]
    async fn test_recommendations_with_context() {
        let tool = ToolRecommendationsTool::new(pipeline());
        let result = tool
            .execute(json!({
                "query": "Show me parliamentary questions about NHS funding",
                "context": {"location": "Leeds"}
            }))
            .await
            .unwrap();
        let payload = body(&result);
        let tools: Vec<&str> = payload["recommended_tools"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["tool_name"].as_str())
            .collect();
        assert!(tools.contains(&"search_parliamentary_questions"));
        assert_eq!(payload["query_analysis"]["intent"], "policy_research");
    }

    #[tokio::test]
    async fn test_search_without_executor_returns_recommendations_only() {
        let tool = IntelligentSearchTool::new(pipeline());
        let result = tool
            .execute(json!({"query": "debates on housing"}))
            .await
            .unwrap();
        let payload = body(&result);
        assert!(payload["recommended_tools"].as_array().is_some());
        assert!(payload.get("executed_results").is_none());
    }

    #[tokio::test]
    async fn test_search_oversized_query_is_tool_error() {
        let tool = IntelligentSearchTool::new(pipeline());
        let result = tool
            .execute(json!({"query": "x".repeat(5000)}))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_search_honours_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let err = IntelligentSearchTool::new(pipeline())
            .execute_with_cancellation(json!({"query": "debates on housing"}), token)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }

    #[tokio::test]
    async fn test_missing_query_is_argument_error() {
        let tool = AnalyzeQueryIntentTool::new(pipeline());
        assert!(tool.execute(json!({})).await.is_err());
    }
}
