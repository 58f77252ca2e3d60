use super::{complete_json, prompts, LlmClient, LlmError};
use crate::analyzer::{QueryClassifier, MAX_KEYWORDS};
use crate::types::{QueryAnalysis, QueryContext, QueryIntent};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    intent: String,
    #[serde(default)]
    entities: Vec<String>,
    #[serde(default)]
    temporal_context: Option<String>,
    #[serde(default)]
    geographic_context: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Model-backed [`QueryClassifier`]
pub struct LlmClassifier {
    client: Arc<dyn LlmClient>,
}

impl LlmClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    async fn try_analyze(
        &self,
        query: &str,
        context: Option<&QueryContext>,
    ) -> Result<QueryAnalysis, LlmError> {
        let raw: RawAnalysis = complete_json(
            self.client.as_ref(),
            prompts::analysis(query, context),
            0.1,
            500,
        )
        .await?;
        validate(raw)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

fn validate(raw: RawAnalysis) -> Result<QueryAnalysis, LlmError> {
    let intent: QueryIntent = raw
        .intent
        .parse()
        .map_err(|e| LlmError::InvalidResponse(format!("intent: {}", e)))?;

    let confidence = raw.confidence.unwrap_or(0.5);
    if !(0.0..=1.0).contains(&confidence) {
        return Err(LlmError::InvalidResponse(format!(
            "confidence out of range: {}",
            confidence
        )));
    }

    let mut keywords = raw.keywords;
    keywords.truncate(MAX_KEYWORDS);

    Ok(QueryAnalysis {
        intent,
        entities: raw.entities,
        temporal_context: non_empty(raw.temporal_context),
        geographic_context: non_empty(raw.geographic_context),
        confidence: if intent == QueryIntent::Unknown {
            0.0
        } else {
            confidence
        },
        keywords,
    })
}

#[async_trait::async_trait]
impl QueryClassifier for LlmClassifier {
    async fn analyze(&self, query: &str, context: Option<&QueryContext>) -> QueryAnalysis {
        if query.trim().is_empty() {
            return QueryAnalysis::unknown();
        }

        match self.try_analyze(query, context).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!(error = %e, "Query analysis failed");
                QueryAnalysis::unknown()
            }
        }
    }

    fn name(&self) -> &str {
        "llm"
    }
}
