use super::ApiResult;
use crate::config::AppState;
use axum::{extract::State, Json};
use parliament_core::{
    registry, IntelligentSearchRequest, IntelligentSearchResponse, QueryAnalysis, QueryContext,
    QueryIntent, ResultEvaluation, ToolName, ToolRecommendation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tool catalogue plus the active stage backends
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "tools": registry::catalogue_json(),
        "backends": state.pipeline.backend_names(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub context: Option<QueryContext>,
}

/// Classify a query
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Json<QueryAnalysis> {
    Json(state.pipeline.analyze(&req.query, req.context.as_ref()).await)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub query_analysis: QueryAnalysis,
    pub recommended_tools: Vec<ToolRecommendation>,
}

/// Classify a query and rank the tools for it
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Json<RecommendResponse> {
    let (query_analysis, recommended_tools) =
        state.pipeline.recommend(&req.query, req.context.as_ref()).await;

    Json(RecommendResponse {
        query_analysis,
        recommended_tools,
    })
}

/// Full pipeline run
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IntelligentSearchRequest>,
) -> ApiResult<Json<IntelligentSearchResponse>> {
    let response = state.pipeline.search(&req).await?;
    Ok(Json(response))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResultRequest {
    pub query: String,
    pub tool_name: ToolName,
    pub results: serde_json::Value,
    #[serde(default = "unknown_intent")]
    pub expected_intent: QueryIntent,
}

fn unknown_intent() -> QueryIntent {
    QueryIntent::Unknown
}

/// Score results the caller already has
pub async fn evaluate_result(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateResultRequest>,
) -> Json<ResultEvaluation> {
    tracing::debug!(tool = %req.tool_name, intent = %req.expected_intent, "Evaluating supplied results");

    Json(
        state
            .pipeline
            .evaluate_result(&req.query, req.tool_name, &req.results, req.expected_intent)
            .await,
    )
}
