use super::{complete_json, prompts, LlmClient};
use crate::evaluator::{count_results, ResultEvaluator};
use crate::types::{QueryIntent, RefinementSuggestion, ResultEvaluation, ToolName};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct RawEvaluation {
    quality_score: f64,
    completeness_score: f64,
    #[serde(default)]
    refinement_suggestions: Vec<RefinementSuggestion>,
    #[serde(default)]
    overall_assessment: String,
}

/// Model-backed [`ResultEvaluator`]
pub struct LlmEvaluator {
    client: Arc<dyn LlmClient>,
}

impl LlmEvaluator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ResultEvaluator for LlmEvaluator {
    async fn evaluate(
        &self,
        query: &str,
        tool: ToolName,
        results: &Value,
        expected_intent: QueryIntent,
    ) -> ResultEvaluation {
        let Some(count) = count_results(results) else {
            tracing::debug!(tool = %tool, "Results not assessable, using neutral evaluation");
            return ResultEvaluation::neutral();
        };

        let reply = complete_json::<RawEvaluation>(
            self.client.as_ref(),
            prompts::evaluation(query, tool, results, expected_intent),
            0.1,
            600,
        )
        .await;

        match reply {
            Ok(raw) => ResultEvaluation {
                quality_score: raw.quality_score.clamp(0.0, 1.0),
                completeness_score: raw.completeness_score.clamp(0.0, 1.0),
                result_count: count,
                refinement_suggestions: raw.refinement_suggestions,
                overall_assessment: raw.overall_assessment,
            },
            Err(e) => {
                tracing::error!(tool = %tool, error = %e, "Result evaluation failed");
                ResultEvaluation::neutral()
            }
        }
    }

    fn name(&self) -> &str {
        "llm"
    }
}
