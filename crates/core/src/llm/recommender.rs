use super::{complete_json, prompts, LlmClient};
use crate::recommender::{self, RuleBasedRecommender, ToolRecommender};
use crate::types::{Params, QueryAnalysis, ToolName, ToolRecommendation};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct RawRecommendation {
    tool_name: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    suggested_parameters: Params,
    #[serde(default)]
    priority: Option<u32>,
}

/// Model-backed [`ToolRecommender`] that falls back to the rule table
pub struct LlmRecommender {
    client: Arc<dyn LlmClient>,
    fallback: RuleBasedRecommender,
}

impl LlmRecommender {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            fallback: RuleBasedRecommender::new(),
        }
    }
}

fn convert(raw: Vec<RawRecommendation>) -> Vec<ToolRecommendation> {
    let recommendations = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let tool_name = match item.tool_name.parse::<ToolName>() {
                Ok(tool) => tool,
                Err(_) => {
                    tracing::warn!(tool = %item.tool_name, "Dropping unregistered tool from recommendations");
                    return None;
                }
            };
            let reasoning = item
                .reasoning
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| format!("Suggested by model for {}", tool_name));
            Some(ToolRecommendation {
                tool_name,
                confidence: item.confidence.unwrap_or(0.5),
                reasoning,
                suggested_parameters: item.suggested_parameters,
                priority: item.priority.unwrap_or(index as u32 + 1),
            })
        })
        .collect();

    recommender::normalize(recommendations)
}

#[async_trait::async_trait]
impl ToolRecommender for LlmRecommender {
    async fn recommend(&self, analysis: &QueryAnalysis, query: &str) -> Vec<ToolRecommendation> {
        let reply = complete_json::<Vec<RawRecommendation>>(
            self.client.as_ref(),
            prompts::recommendation(query, analysis),
            0.2,
            1000,
        )
        .await;

        match reply.map(convert) {
            Ok(recommendations) if !recommendations.is_empty() => recommendations,
            Ok(_) => {
                tracing::warn!("Model recommended no registered tools, using rule table");
                self.fallback.recommendations(analysis)
            }
            Err(e) => {
                tracing::error!(error = %e, "Tool recommendation failed, using rule table");
                self.fallback.recommendations(analysis)
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

    async fn recommend(reply: &str) -> Vec<ToolRecommendation> {
        let recommender = LlmRecommender::new(Arc::new(ScriptedClient::replying(reply)));
        recommender
            .recommend(&QueryAnalysis::unknown(), "anything")
            .await
    }

    #[tokio::test]
    async fn test_reply_is_parsed_sorted_and_filtered() {
        let recs = recommend(
            r#"[
              {"tool_name": "search_debates", "confidence": 0.6, "reasoning": "debates", "priority": 2,
               "suggested_parameters": {"query": "housing", "colour": "blue"}},
              {"tool_name": "search_everything", "confidence": 0.9, "priority": 1},
              {"tool_name": "search_contributions", "confidence": 0.8, "priority": 1}
            ]"#,
        )
        .await;

        let tools: Vec<_> = recs.iter().map(|r| r.tool_name).collect();
        assert_eq!(tools, vec![ToolName::SearchContributions, ToolName::SearchDebates]);
        assert!(!recs[0].reasoning.is_empty());
        assert_eq!(recs[1].suggested_parameters.len(), 1);
    }

    #[tokio::test]
    async fn test_garbage_falls_back_to_default_pair() {
        let recs = recommend("not json").await;
        let tools: Vec<_> = recs.iter().map(|r| r.tool_name).collect();
        assert_eq!(tools, vec![ToolName::SearchConstituency, ToolName::SearchMembers]);
    }

    #[tokio::test]
    async fn test_only_unregistered_tools_falls_back() {
        let recs = recommend(r#"[{"tool_name": "search_everything"}]"#).await;
        assert_eq!(recs.len(), 2);
    }
}
