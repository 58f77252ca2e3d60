//! Scoring of executed tool results.

use crate::recommender::{intent_tools, serves};
use crate::registry;
use crate::types::{
    QueryIntent, RefinementKind, RefinementSuggestion, ResultEvaluation, ToolName,
};
use serde_json::Value;

const BASE_QUALITY: f64 = 0.4;
const HAS_RESULTS_BONUS: f64 = 0.3;
const INTENT_MATCH_BONUS: f64 = 0.3;

/// Result count a lookup intent is satisfied by
pub const LOOKUP_TARGET: usize = 5;

/// Result count a research intent is satisfied by
pub const BROAD_TARGET: usize = 20;

/// Keys under which downstream APIs return their result collections
const COLLECTION_KEYS: [&str; 9] = [
    "items",
    "results",
    "data",
    "contributions",
    "debates",
    "questions",
    "members",
    "value",
    // get_detailed_member_information wraps its profile under "member"
    "member",
];

/// Assesses how well one tool's results answer a query.
///
/// Implementations never fail; unassessable input yields
/// [`ResultEvaluation::neutral`].
#[async_trait::async_trait]
pub trait ResultEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        query: &str,
        tool: ToolName,
        results: &Value,
        expected_intent: QueryIntent,
    ) -> ResultEvaluation;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Default)]
pub struct HeuristicEvaluator;

impl HeuristicEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, tool: ToolName, results: &Value, intent: QueryIntent) -> ResultEvaluation {
        let Some(count) = count_results(results) else {
            tracing::debug!(tool = %tool, "Results not assessable, using neutral evaluation");
            return ResultEvaluation::neutral();
        };

        let serves_intent = serves(tool, intent);
        let mut quality = BASE_QUALITY;
        if count > 0 {
            quality += HAS_RESULTS_BONUS;
        }
        if serves_intent {
            quality += INTENT_MATCH_BONUS;
        }

        let target = target_for(intent);
        let completeness = (count as f64 / target as f64).min(1.0);

        let mut suggestions = Vec::new();
        if count == 0 {
            suggestions.push(RefinementSuggestion {
                kind: RefinementKind::QueryRefinement,
                suggestion: "Broaden the search terms or remove date filters".to_string(),
                reasoning: format!("{} returned no results", tool),
            });
            if let Some(next) = intent_tools(intent).iter().find(|t| **t != tool) {
                suggestions.push(RefinementSuggestion {
                    kind: RefinementKind::AdditionalTool,
                    suggestion: format!("Try {}", next),
                    reasoning: format!("{} also serves {} queries", next, intent),
                });
            }
        }
        if !serves_intent {
            if let Some(best) = intent_tools(intent).first() {
                suggestions.push(RefinementSuggestion {
                    kind: RefinementKind::AdditionalTool,
                    suggestion: format!("Use {} for this query", best),
                    reasoning: format!("{} is not suited to {} queries", tool, intent),
                });
            }
        }
        if count >= target {
            if let Some(limit) = registry::entry(tool).result_limit_param {
                suggestions.push(RefinementSuggestion {
                    kind: RefinementKind::ParameterAdjustment,
                    suggestion: format!("Increase {} or add filters", limit),
                    reasoning: format!("{} results may be truncated", count),
                });
            }
        }

        let quality = round2(quality);
        ResultEvaluation {
            quality_score: quality,
            completeness_score: round2(completeness),
            result_count: count,
            refinement_suggestions: suggestions,
            overall_assessment: format!(
                "{} returned {} result(s); quality {:.2}",
                tool, count, quality
            ),
        }
    }
}

#[async_trait::async_trait]
impl ResultEvaluator for HeuristicEvaluator {
    async fn evaluate(
        &self,
        _query: &str,
        tool: ToolName,
        results: &Value,
        expected_intent: QueryIntent,
    ) -> ResultEvaluation {
        self.score(tool, results, expected_intent)
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

fn target_for(intent: QueryIntent) -> usize {
    if intent.is_lookup() {
        LOOKUP_TARGET
    } else {
        BROAD_TARGET
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Number of results in a tool payload, or `None` when the payload is an
/// error or has no recognisable result collection
pub fn count_results(results: &Value) -> Option<usize> {
    match results {
        Value::Array(items) => Some(items.len()),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed @ (Value::Array(_) | Value::Object(_))) => count_results(&parsed),
            _ => None,
        },
        Value::Object(map) => {
            if map.contains_key("error") {
                return None;
            }
            // Hansard capitalises its keys ("Results"), the other APIs do not.
            COLLECTION_KEYS
                .iter()
                .find_map(|key| {
                    map.iter()
                        .find(|(name, _)| name.eq_ignore_ascii_case(key))
                        .map(|(_, value)| value)
                })
                .and_then(|collection| match collection {
                    Value::Array(items) => Some(items.len()),
                    Value::Object(_) => Some(1),
                    Value::Null => Some(0),
                    _ => None,
                })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(n: usize) -> Value {
        json!({ "items": (0..n).map(|i| json!({ "id": i })).collect::<Vec<_>>() })
    }

    #[test]
    fn test_malformed_payloads_are_neutral() {
        let evaluator = HeuristicEvaluator::new();
        for payload in [
            json!("not json at all"),
            json!({ "error": "upstream 500" }),
            json!({ "unexpected": true }),
            json!(42),
            Value::Null,
        ] {
            let evaluation =
                evaluator.score(ToolName::SearchDebates, &payload, QueryIntent::DebateAnalysis);
            assert_eq!(evaluation.quality_score, 0.5);
            assert_eq!(evaluation.completeness_score, 0.5);
            assert_eq!(evaluation.result_count, 0);
            assert!(evaluation.refinement_suggestions.is_empty());
        }
    }

    #[test]
    fn test_serving_tool_with_results_scores_full_quality() {
        let evaluation = HeuristicEvaluator::new().score(
            ToolName::SearchConstituency,
            &items(3),
            QueryIntent::ConstituencySearch,
        );
        assert_eq!(evaluation.quality_score, 1.0);
        assert_eq!(evaluation.completeness_score, 0.6);
        assert_eq!(evaluation.result_count, 3);
        assert!(evaluation.refinement_suggestions.is_empty());
    }

    #[test]
    fn test_empty_results_suggest_refinement_and_next_tool() {
        let evaluation = HeuristicEvaluator::new().score(
            ToolName::SearchDebates,
            &json!([]),
            QueryIntent::DebateAnalysis,
        );
        assert_eq!(evaluation.quality_score, 0.7);
        assert_eq!(evaluation.completeness_score, 0.0);
        let kinds: Vec<_> = evaluation
            .refinement_suggestions
            .iter()
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![RefinementKind::QueryRefinement, RefinementKind::AdditionalTool]
        );
        assert!(evaluation.refinement_suggestions[1]
            .suggestion
            .contains("search_contributions"));
    }

    #[test]
    fn test_tool_not_serving_intent() {
        let evaluation = HeuristicEvaluator::new().score(
            ToolName::GetDepartments,
            &json!({ "value": [{ "id": 1 }] }),
            QueryIntent::PolicyResearch,
        );
        assert_eq!(evaluation.quality_score, 0.7);
        assert_eq!(
            evaluation.refinement_suggestions[0].kind,
            RefinementKind::AdditionalTool
        );
    }

    #[test]
    fn test_saturated_limit_suggests_parameter_adjustment() {
        let evaluation = HeuristicEvaluator::new().score(
            ToolName::SearchParliamentaryQuestions,
            &items(25),
            QueryIntent::PolicyResearch,
        );
        assert_eq!(evaluation.completeness_score, 1.0);
        assert!(evaluation
            .refinement_suggestions
            .iter()
            .any(|s| s.kind == RefinementKind::ParameterAdjustment
                && s.suggestion.contains("take")));
    }

    #[test]
    fn test_count_results_shapes() {
        assert_eq!(count_results(&json!([1, 2])), Some(2));
        assert_eq!(count_results(&json!({ "results": [1] })), Some(1));
        assert_eq!(count_results(&json!({ "contributions": [] })), Some(0));
        assert_eq!(count_results(&json!({ "value": { "id": 4 } })), Some(1));
        assert_eq!(count_results(&json!("[1,2,3]")), Some(3));
        assert_eq!(count_results(&json!({ "Results": [1, 2], "TotalResultCount": 2 })), Some(2));
        assert_eq!(
            count_results(&json!({
                "member": { "value": { "id": 172 } },
                "synopsis": { "error": "HTTP 503" }
            })),
            Some(1)
        );
        assert_eq!(count_results(&json!({ "error": "x", "items": [] })), None);
    }
}
