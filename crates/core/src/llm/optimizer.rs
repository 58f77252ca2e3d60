use super::{complete_json, prompts, LlmClient};
use crate::optimizer::{set_param, ParameterOptimizer};
use crate::types::{ParameterSuggestion, Params, QueryAnalysis, ToolName};
use std::sync::Arc;

/// Suggestions at or below this confidence are ignored
pub const APPLY_THRESHOLD: f64 = 0.7;

/// Model-backed [`ParameterOptimizer`]
pub struct LlmOptimizer {
    client: Arc<dyn LlmClient>,
}

impl LlmOptimizer {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

fn apply(tool: ToolName, base: &Params, suggestions: Vec<ParameterSuggestion>) -> Params {
    let mut params = base.clone();
    for suggestion in suggestions {
        if suggestion.confidence <= APPLY_THRESHOLD {
            continue;
        }
        if !set_param(tool, &mut params, &suggestion.parameter, suggestion.value) {
            tracing::debug!(
                tool = %tool,
                parameter = %suggestion.parameter,
                "Ignoring suggestion for unaccepted parameter"
            );
        }
    }
    params
}

#[async_trait::async_trait]
impl ParameterOptimizer for LlmOptimizer {
    async fn optimize(
        &self,
        tool: ToolName,
        base: &Params,
        analysis: &QueryAnalysis,
        query: &str,
    ) -> Params {
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let reply = complete_json::<Vec<ParameterSuggestion>>(
            self.client.as_ref(),
            prompts::optimization(tool, base, analysis, query, &today),
            0.1,
            800,
        )
        .await;

        match reply {
            Ok(suggestions) => apply(tool, base, suggestions),
            Err(e) => {
                tracing::error!(tool = %tool, error = %e, "Parameter optimization failed");
                base.clone()
            }
        }
    }

    fn name(&self) -> &str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedClient;
    use serde_json::json;

    #[tokio::test]
    async fn test_only_confident_accepted_suggestions_apply() {
        let client = ScriptedClient::replying(
            r#"[
              {"parameter": "dateFrom", "value": "2023-01-01", "reasoning": "recent", "confidence": 0.9},
              {"parameter": "maxResults", "value": 50, "confidence": 0.7},
              {"parameter": "colour", "value": "blue", "confidence": 0.99}
            ]"#,
        );
        let optimizer = LlmOptimizer::new(Arc::new(client));
        let mut base = Params::new();
        base.insert("query".to_string(), json!("housing"));

        let params = optimizer
            .optimize(ToolName::SearchDebates, &base, &QueryAnalysis::unknown(), "housing")
            .await;

        assert_eq!(params["dateFrom"], "2023-01-01");
        assert_eq!(params["query"], "housing");
        assert!(!params.contains_key("maxResults"));
        assert!(!params.contains_key("colour"));
    }

    #[tokio::test]
    async fn test_failure_returns_base() {
        let optimizer = LlmOptimizer::new(Arc::new(ScriptedClient::failing()));
        let mut base = Params::new();
        base.insert("take".to_string(), json!(3));
        let params = optimizer
            .optimize(ToolName::SearchMembers, &base, &QueryAnalysis::unknown(), "q")
            .await;
        assert_eq!(params, base);
    }
}
