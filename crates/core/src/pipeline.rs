//! Orchestration of analysis, recommendation, optimization, execution and
//! evaluation for a single query.

use crate::analyzer::{QueryClassifier, RuleBasedClassifier};
use crate::audit::{AuditLog, AuditRecord};
use crate::cache::ResultCache;
use crate::error::{PipelineError, PipelineResult};
use crate::evaluator::{HeuristicEvaluator, ResultEvaluator};
use crate::executor::ToolExecutor;
use crate::optimizer::{ParameterOptimizer, RuleBasedOptimizer};
use crate::recommender::{RuleBasedRecommender, ToolRecommender, MAX_RECOMMENDATIONS};
use crate::types::{
    IntelligentSearchRequest, IntelligentSearchResponse, QueryAnalysis, QueryContext,
    QueryIntent, ResultEvaluation, ToolExecutionResult, ToolName, ToolRecommendation,
};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_TOOLS: usize = 2;
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 1000;

pub struct IntelligencePipeline {
    classifier: Arc<dyn QueryClassifier>,
    recommender: Arc<dyn ToolRecommender>,
    optimizer: Arc<dyn ParameterOptimizer>,
    evaluator: Arc<dyn ResultEvaluator>,
    executor: Option<Arc<dyn ToolExecutor>>,
    cache: Option<Arc<ResultCache>>,
    audit: Option<Arc<AuditLog>>,
    max_tools: usize,
    tool_timeout: Duration,
    max_query_length: usize,
}

impl IntelligencePipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Deterministic pipeline with no executor
    pub fn rule_based() -> Self {
        Self::builder().build()
    }

    pub fn executor(&self) -> Option<&Arc<dyn ToolExecutor>> {
        self.executor.as_ref()
    }

    pub fn backend_names(&self) -> [&str; 4] {
        [
            self.classifier.name(),
            self.recommender.name(),
            self.optimizer.name(),
            self.evaluator.name(),
        ]
    }

    pub async fn analyze(&self, query: &str, context: Option<&QueryContext>) -> QueryAnalysis {
        self.classifier.analyze(query, context).await
    }

    pub async fn recommend(
        &self,
        query: &str,
        context: Option<&QueryContext>,
    ) -> (QueryAnalysis, Vec<ToolRecommendation>) {
        let analysis = self.analyze(query, context).await;
        let recommendations = self.recommender.recommend(&analysis, query).await;
        (analysis, recommendations)
    }

    pub async fn evaluate_result(
        &self,
        query: &str,
        tool: ToolName,
        results: &Value,
        expected_intent: QueryIntent,
    ) -> ResultEvaluation {
        self.evaluator
            .evaluate(query, tool, results, expected_intent)
            .await
    }

    fn validate<'a>(&self, request: &'a IntelligentSearchRequest) -> PipelineResult<&'a str> {
        let query = request
            .query
            .as_deref()
            .ok_or_else(|| PipelineError::InvalidInput("query is required".to_string()))?;
        if query.chars().count() > self.max_query_length {
            return Err(PipelineError::InvalidInput(format!(
                "query exceeds {} characters",
                self.max_query_length
            )));
        }
        Ok(query)
    }

    pub async fn search(
        &self,
        request: &IntelligentSearchRequest,
    ) -> PipelineResult<IntelligentSearchResponse> {
        let query = self.validate(request)?;
        let (analysis, recommendations) = self.recommend(query, request.context.as_ref()).await;

        let executed_results = match (&self.executor, request.auto_execute) {
            (Some(executor), true) => Some(
                self.execute_top(
                    executor,
                    query,
                    &analysis,
                    &recommendations,
                    request.evaluation_enabled,
                )
                .await,
            ),
            (None, true) => {
                warn!("auto_execute requested but no tool executor is configured");
                None
            }
            (_, false) => None,
        };

        let overall_assessment = executed_results
            .as_deref()
            .filter(|_| request.evaluation_enabled)
            .map(overall_assessment);

        let response = IntelligentSearchResponse {
            query_analysis: analysis,
            recommended_tools: recommendations,
            executed_results,
            overall_assessment,
        };

        info!(
            intent = %response.query_analysis.intent,
            confidence = response.query_analysis.confidence,
            recommended = response.recommended_tools.len(),
            executed = response.executed_results.as_ref().map_or(0, Vec::len),
            "Search completed"
        );

        if let Some(audit) = &self.audit {
            let record = AuditRecord::from_response(query, &response);
            if let Err(e) = audit.append(&record).await {
                warn!(error = %e, "Failed to write audit record");
            }
        }

        Ok(response)
    }

    /// Like [`search`](Self::search), abandoning in-flight downstream calls
    /// once `token` is cancelled
    pub async fn search_with_cancellation(
        &self,
        request: &IntelligentSearchRequest,
        token: CancellationToken,
    ) -> PipelineResult<IntelligentSearchResponse> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Search cancelled by caller");
                Err(PipelineError::Cancelled)
            }
            result = self.search(request) => result,
        }
    }

    async fn execute_top(
        &self,
        executor: &Arc<dyn ToolExecutor>,
        query: &str,
        analysis: &QueryAnalysis,
        recommendations: &[ToolRecommendation],
        evaluate: bool,
    ) -> Vec<ToolExecutionResult> {
        let calls = recommendations
            .iter()
            .take(self.max_tools)
            .map(|rec| self.execute_one(executor.as_ref(), query, analysis, rec, evaluate));
        join_all(calls).await
    }

    async fn execute_one(
        &self,
        executor: &dyn ToolExecutor,
        query: &str,
        analysis: &QueryAnalysis,
        rec: &ToolRecommendation,
        evaluate: bool,
    ) -> ToolExecutionResult {
        let tool = rec.tool_name;
        let params = self
            .optimizer
            .optimize(tool, &rec.suggested_parameters, analysis, query)
            .await;

        let cached = match &self.cache {
            Some(cache) => cache.get(tool, &params).await,
            None => None,
        };

        let results = match cached {
            Some(value) => value,
            None => match tokio::time::timeout(self.tool_timeout, executor.execute(tool, &params))
                .await
            {
                Ok(Ok(value)) => {
                    if let Some(cache) = &self.cache {
                        cache.insert(tool, &params, value.clone()).await;
                    }
                    value
                }
                Ok(Err(e)) => {
                    warn!(tool = %tool, error = %e, "Tool execution failed");
                    return ToolExecutionResult::failed(rec, params, format!("{:#}", e));
                }
                Err(_) => {
                    warn!(tool = %tool, timeout_secs = self.tool_timeout.as_secs(), "Tool execution timed out");
                    return ToolExecutionResult::failed(
                        rec,
                        params,
                        format!("timed out after {}s", self.tool_timeout.as_secs()),
                    );
                }
            },
        };

        let evaluation = if evaluate {
            Some(
                self.evaluator
                    .evaluate(query, tool, &results, analysis.intent)
                    .await,
            )
        } else {
            None
        };
        debug!(tool = %tool, "Tool executed");

        ToolExecutionResult {
            tool_name: tool,
            results,
            parameters_used: params,
            confidence: rec.confidence,
            reasoning: rec.reasoning.clone(),
            evaluation,
            error: None,
        }
    }
}

fn overall_assessment(results: &[ToolExecutionResult]) -> String {
    let scores: Vec<f64> = results
        .iter()
        .filter_map(|r| r.evaluation.as_ref())
        .map(|e| e.quality_score)
        .collect();
    let average = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };
    format!(
        "Query executed with {} tools. Average result quality: {:.2}",
        results.len(),
        average
    )
}

/// Assembles an [`IntelligencePipeline`]; unset stages use the rule-based
/// implementations.
pub struct PipelineBuilder {
    classifier: Arc<dyn QueryClassifier>,
    recommender: Arc<dyn ToolRecommender>,
    optimizer: Arc<dyn ParameterOptimizer>,
    evaluator: Arc<dyn ResultEvaluator>,
    executor: Option<Arc<dyn ToolExecutor>>,
    cache: Option<Arc<ResultCache>>,
    audit: Option<Arc<AuditLog>>,
    max_tools: usize,
    tool_timeout: Duration,
    max_query_length: usize,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            classifier: Arc::new(RuleBasedClassifier::new()),
            recommender: Arc::new(RuleBasedRecommender::new()),
            optimizer: Arc::new(RuleBasedOptimizer::new()),
            evaluator: Arc::new(HeuristicEvaluator::new()),
            executor: None,
            cache: None,
            audit: None,
            max_tools: DEFAULT_MAX_TOOLS,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
        }
    }
}

impl PipelineBuilder {
    pub fn classifier(mut self, classifier: Arc<dyn QueryClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn recommender(mut self, recommender: Arc<dyn ToolRecommender>) -> Self {
        self.recommender = recommender;
        self
    }

    pub fn optimizer(mut self, optimizer: Arc<dyn ParameterOptimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn ResultEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn executor(mut self, executor: Arc<dyn ToolExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn audit_log(mut self, audit: Arc<AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Number of recommendations executed per search, clamped to 1..=3
    pub fn max_tools(mut self, max_tools: usize) -> Self {
        self.max_tools = max_tools.clamp(1, MAX_RECOMMENDATIONS);
        self
    }

    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn max_query_length(mut self, length: usize) -> Self {
        self.max_query_length = length;
        self
    }

    pub fn build(self) -> IntelligencePipeline {
        IntelligencePipeline {
            classifier: self.classifier,
            recommender: self.recommender,
            optimizer: self.optimizer,
            evaluator: self.evaluator,
            executor: self.executor,
            cache: self.cache,
            audit: self.audit,
            max_tools: self.max_tools,
            tool_timeout: self.tool_timeout,
            max_query_length: self.max_query_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::RECENT_CUTOFF;
    use crate::types::Params;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    enum Behaviour {
        Items(usize),
        Fail,
        Hang,
    }

    struct FakeExecutor {
        behaviour: HashMap<ToolName, Behaviour>,
        calls: Mutex<Vec<(ToolName, Params)>>,
    }

    impl FakeExecutor {
        fn new(behaviour: Vec<(ToolName, Behaviour)>) -> Arc<Self> {
            Arc::new(Self {
                behaviour: behaviour.into_iter().collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ToolExecutor for FakeExecutor {
        async fn execute(&self, tool: ToolName, params: &Params) -> anyhow::Result<Value> {
            self.calls.lock().unwrap().push((tool, params.clone()));
            match self.behaviour.get(&tool) {
                Some(Behaviour::Items(n)) => Ok(json!({ "items": vec![json!({}); *n] })),
                Some(Behaviour::Fail) => anyhow::bail!("upstream returned 500"),
                Some(Behaviour::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(json!([]))
                }
                None => Ok(json!([])),
            }
        }
    }

    fn tools(response: &IntelligentSearchResponse) -> Vec<ToolName> {
        response.recommended_tools.iter().map(|r| r.tool_name).collect()
    }

    #[tokio::test]
    async fn test_recommend_only_by_default() {
        let executor = FakeExecutor::new(vec![]);
        let pipeline = IntelligencePipeline::builder().executor(executor.clone()).build();

        let response = pipeline
            .search(&IntelligentSearchRequest::new(
                "Find Birmingham constituency information",
            ))
            .await
            .unwrap();

        assert_eq!(response.query_analysis.intent, QueryIntent::ConstituencySearch);
        assert_eq!(
            tools(&response),
            vec![ToolName::SearchConstituency, ToolName::GetElectionResults]
        );
        assert!(response.executed_results.is_none());
        assert!(response.overall_assessment.is_none());
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_query_gets_default_pair() {
        let pipeline = IntelligencePipeline::rule_based();
        let response = pipeline
            .search(&IntelligentSearchRequest::new(""))
            .await
            .unwrap();
        assert_eq!(response.query_analysis, QueryAnalysis::unknown());
        assert_eq!(
            tools(&response),
            vec![ToolName::SearchConstituency, ToolName::SearchMembers]
        );
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let pipeline = IntelligencePipeline::builder().max_query_length(10).build();

        let missing: IntelligentSearchRequest = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            pipeline.search(&missing).await,
            Err(PipelineError::InvalidInput(_))
        ));

        let long = IntelligentSearchRequest::new("a".repeat(11));
        assert!(matches!(
            pipeline.search(&long).await,
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_auto_execute_evaluates_and_summarises() {
        let executor = FakeExecutor::new(vec![
            (ToolName::SearchParliamentaryQuestions, Behaviour::Items(4)),
            (ToolName::SearchDebates, Behaviour::Items(2)),
        ]);
        let pipeline = IntelligencePipeline::builder().executor(executor.clone()).build();

        let request =
            IntelligentSearchRequest::new("Show me recent parliamentary questions about NHS funding")
                .auto_execute(true);
        let response = pipeline.search(&request).await.unwrap();

        let executed = response.executed_results.as_ref().unwrap();
        assert_eq!(executed.len(), 2);
        assert!(executed.iter().all(|r| !r.is_error()));
        assert_eq!(executed[0].parameters_used["dateFrom"], RECENT_CUTOFF);
        assert_eq!(executed[0].parameters_used["query"], "NHS");
        assert_eq!(executed[0].evaluation.as_ref().unwrap().quality_score, 1.0);
        assert_eq!(
            response.overall_assessment.as_deref(),
            Some("Query executed with 2 tools. Average result quality: 1.00")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_and_timeouts_become_placeholders() {
        let executor = FakeExecutor::new(vec![
            (ToolName::SearchMembers, Behaviour::Items(1)),
            (ToolName::GetDetailedMemberInformation, Behaviour::Fail),
            (ToolName::SearchContributions, Behaviour::Hang),
        ]);
        let pipeline = IntelligencePipeline::builder()
            .executor(executor)
            .max_tools(3)
            .tool_timeout(Duration::from_secs(30))
            .build();

        let request = IntelligentSearchRequest::new("Who is the MP for Leeds?").auto_execute(true);
        let response = pipeline.search(&request).await.unwrap();
        let executed = response.executed_results.unwrap();

        assert_eq!(executed.len(), 3);
        assert!(!executed[0].is_error());
        assert_eq!(executed[1].results["error"], "upstream returned 500");
        assert!(executed[1].reasoning.starts_with("Execution failed:"));
        assert_eq!(executed[2].error.as_deref(), Some("timed out after 30s"));
        assert_eq!(
            response.overall_assessment.as_deref(),
            Some("Query executed with 3 tools. Average result quality: 1.00")
        );
    }

    #[tokio::test]
    async fn test_cache_skips_repeat_calls() {
        let executor = FakeExecutor::new(vec![]);
        let pipeline = IntelligencePipeline::builder()
            .executor(executor.clone())
            .cache(Arc::new(ResultCache::new(Duration::from_secs(60))))
            .build();

        let request = IntelligentSearchRequest::new("List government departments").auto_execute(true);
        pipeline.search(&request).await.unwrap();
        pipeline.search(&request).await.unwrap();

        assert_eq!(executor.call_count(), 2);
    }

    #[tokio::test]
    async fn test_evaluation_disabled() {
        let executor = FakeExecutor::new(vec![]);
        let pipeline = IntelligencePipeline::builder().executor(executor).build();
        let request = IntelligentSearchRequest::new("debates on housing")
            .auto_execute(true)
            .evaluation(false);
        let response = pipeline.search(&request).await.unwrap();
        assert!(response
            .executed_results
            .unwrap()
            .iter()
            .all(|r| r.evaluation.is_none()));
        assert!(response.overall_assessment.is_none());
    }

    #[tokio::test]
    async fn test_one_audit_record_per_search() {
        let temp_dir = TempDir::new().unwrap();
        let audit = Arc::new(AuditLog::new(temp_dir.path().join("audit.jsonl")).unwrap());
        let pipeline = IntelligencePipeline::builder()
            .executor(FakeExecutor::new(vec![(ToolName::SearchDebates, Behaviour::Fail)]))
            .audit_log(audit.clone())
            .build();

        pipeline
            .search(&IntelligentSearchRequest::new("Show me recent debates about climate change").auto_execute(true))
            .await
            .unwrap();
        pipeline
            .search(&IntelligentSearchRequest::new("asdfgh"))
            .await
            .unwrap();

        let records = audit.read_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].intent, QueryIntent::DebateAnalysis);
        assert_eq!(records[0].failed_tools, vec![ToolName::SearchDebates]);
        assert_eq!(records[0].executed_tools, vec![ToolName::SearchContributions]);
        assert_eq!(records[1].intent, QueryIntent::Unknown);
        assert!(records[1].executed_tools.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_abandons_in_flight_calls() {
        let executor = FakeExecutor::new(vec![(ToolName::SearchDebates, Behaviour::Hang)]);
        let pipeline = IntelligencePipeline::builder()
            .executor(executor)
            .tool_timeout(Duration::from_secs(7200))
            .build();

        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let request = IntelligentSearchRequest::new("debates on housing").auto_execute(true);
        let result = pipeline.search_with_cancellation(&request, token).await;
        assert_eq!(result.unwrap_err(), PipelineError::Cancelled);
    }

    #[test]
    fn test_max_tools_is_clamped() {
        assert_eq!(IntelligencePipeline::builder().max_tools(10).build().max_tools, 3);
        assert_eq!(IntelligencePipeline::builder().max_tools(0).build().max_tools, 1);
    }
}
