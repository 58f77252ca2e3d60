use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parameter mapping passed to a downstream tool
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Flat key-value context supplied alongside a query
pub type QueryContext = serde_json::Map<String, serde_json::Value>;

/// What kind of information a query is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    ConstituencySearch,
    MemberSearch,
    PolicyResearch,
    DebateAnalysis,
    VotingRecord,
    ElectionData,
    ReferenceData,
    Unknown,
}

impl QueryIntent {
    pub const ALL: [QueryIntent; 8] = [
        QueryIntent::ConstituencySearch,
        QueryIntent::MemberSearch,
        QueryIntent::PolicyResearch,
        QueryIntent::DebateAnalysis,
        QueryIntent::VotingRecord,
        QueryIntent::ElectionData,
        QueryIntent::ReferenceData,
        QueryIntent::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::ConstituencySearch => "constituency_search",
            QueryIntent::MemberSearch => "member_search",
            QueryIntent::PolicyResearch => "policy_research",
            QueryIntent::DebateAnalysis => "debate_analysis",
            QueryIntent::VotingRecord => "voting_record",
            QueryIntent::ElectionData => "election_data",
            QueryIntent::ReferenceData => "reference_data",
            QueryIntent::Unknown => "unknown",
        }
    }

    /// Lookup intents favour a few precise results over broad recall
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            QueryIntent::ConstituencySearch | QueryIntent::MemberSearch
        )
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryIntent {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryIntent::ALL
            .into_iter()
            .find(|intent| intent.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Name of a downstream tool in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    SearchConstituency,
    GetElectionResults,
    SearchMembers,
    GetDetailedMemberInformation,
    SearchParliamentaryQuestions,
    SearchDebates,
    SearchContributions,
    GetStateOfTheParties,
    GetGovernmentPosts,
    GetOppositionPosts,
    GetDepartments,
}

impl ToolName {
    pub const ALL: [ToolName; 11] = [
        ToolName::SearchConstituency,
        ToolName::GetElectionResults,
        ToolName::SearchMembers,
        ToolName::GetDetailedMemberInformation,
        ToolName::SearchParliamentaryQuestions,
        ToolName::SearchDebates,
        ToolName::SearchContributions,
        ToolName::GetStateOfTheParties,
        ToolName::GetGovernmentPosts,
        ToolName::GetOppositionPosts,
        ToolName::GetDepartments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SearchConstituency => "search_constituency",
            ToolName::GetElectionResults => "get_election_results",
            ToolName::SearchMembers => "search_members",
            ToolName::GetDetailedMemberInformation => "get_detailed_member_information",
            ToolName::SearchParliamentaryQuestions => "search_parliamentary_questions",
            ToolName::SearchDebates => "search_debates",
            ToolName::SearchContributions => "search_contributions",
            ToolName::GetStateOfTheParties => "get_state_of_the_parties",
            ToolName::GetGovernmentPosts => "get_government_posts",
            ToolName::GetOppositionPosts => "get_opposition_posts",
            ToolName::GetDepartments => "get_departments",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Returned when a string does not name a known intent or tool
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// Analysis of a user query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub intent: QueryIntent,
    pub entities: Vec<String>,
    pub temporal_context: Option<String>,
    pub geographic_context: Option<String>,
    pub confidence: f64,
    pub keywords: Vec<String>,
}

impl QueryAnalysis {
    /// The analysis returned whenever intent cannot be determined
    pub fn unknown() -> Self {
        Self {
            intent: QueryIntent::Unknown,
            entities: Vec::new(),
            temporal_context: None,
            geographic_context: None,
            confidence: 0.0,
            keywords: Vec::new(),
        }
    }
}

/// A tool recommendation with reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecommendation {
    pub tool_name: ToolName,
    pub confidence: f64,
    pub reasoning: String,
    pub suggested_parameters: Params,
    /// Lower runs first
    pub priority: u32,
}

/// A single parameter change proposed by an optimizer backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSuggestion {
    pub parameter: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default = "default_suggestion_confidence")]
    pub confidence: f64,
}

fn default_suggestion_confidence() -> f64 {
    0.5
}

/// How a search could be improved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementKind {
    ParameterAdjustment,
    AdditionalTool,
    QueryRefinement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementSuggestion {
    #[serde(rename = "type")]
    pub kind: RefinementKind,
    pub suggestion: String,
    #[serde(default)]
    pub reasoning: String,
}

/// Quality assessment of one tool's results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEvaluation {
    pub quality_score: f64,
    pub completeness_score: f64,
    pub result_count: usize,
    pub refinement_suggestions: Vec<RefinementSuggestion>,
    #[serde(default)]
    pub overall_assessment: String,
}

impl ResultEvaluation {
    pub const NEUTRAL_SCORE: f64 = 0.5;

    /// Returned when results cannot be assessed
    pub fn neutral() -> Self {
        Self {
            quality_score: Self::NEUTRAL_SCORE,
            completeness_score: Self::NEUTRAL_SCORE,
            result_count: 0,
            refinement_suggestions: Vec::new(),
            overall_assessment: "Evaluation failed".to_string(),
        }
    }
}

/// Result of executing a recommended tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecutionResult {
    pub tool_name: ToolName,
    pub results: serde_json::Value,
    pub parameters_used: Params,
    pub confidence: f64,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<ResultEvaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolExecutionResult {
    /// Placeholder for a tool call that failed or timed out
    pub fn failed(recommendation: &ToolRecommendation, parameters: Params, error: String) -> Self {
        Self {
            tool_name: recommendation.tool_name,
            results: serde_json::json!({ "error": error }),
            parameters_used: parameters,
            confidence: recommendation.confidence,
            reasoning: format!("Execution failed: {}", error),
            evaluation: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Request for intelligent tool selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligentSearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub context: Option<QueryContext>,
    #[serde(default)]
    pub auto_execute: bool,
    #[serde(default = "default_true")]
    pub evaluation_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl IntelligentSearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            context: None,
            auto_execute: false,
            evaluation_enabled: true,
        }
    }

    pub fn with_context(mut self, context: QueryContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn auto_execute(mut self, enabled: bool) -> Self {
        self.auto_execute = enabled;
        self
    }

    pub fn evaluation(mut self, enabled: bool) -> Self {
        self.evaluation_enabled = enabled;
        self
    }
}

/// Response from intelligent search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligentSearchResponse {
    pub query_analysis: QueryAnalysis,
    pub recommended_tools: Vec<ToolRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_results: Option<Vec<ToolExecutionResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_assessment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_round_trips_through_str() {
        for intent in QueryIntent::ALL {
            assert_eq!(intent.as_str().parse::<QueryIntent>().unwrap(), intent);
        }
        assert_eq!(
            serde_json::to_value(QueryIntent::ConstituencySearch).unwrap(),
            serde_json::json!("constituency_search")
        );
    }

    #[test]
    fn test_tool_name_serde_matches_as_str() {
        for tool in ToolName::ALL {
            assert_eq!(
                serde_json::to_value(tool).unwrap(),
                serde_json::json!(tool.as_str())
            );
        }
        assert!("search_everything".parse::<ToolName>().is_err());
    }

    #[test]
    fn test_request_defaults() {
        let request: IntelligentSearchRequest =
            serde_json::from_value(serde_json::json!({ "query": "NHS" })).unwrap();
        assert!(!request.auto_execute);
        assert!(request.evaluation_enabled);
        assert!(request.context.is_none());
    }

    #[test]
    fn test_failed_result_placeholder() {
        let rec = ToolRecommendation {
            tool_name: ToolName::SearchDebates,
            confidence: 0.7,
            reasoning: "debates".to_string(),
            suggested_parameters: Params::new(),
            priority: 1,
        };
        let result = ToolExecutionResult::failed(&rec, Params::new(), "timed out".to_string());
        assert!(result.is_error());
        assert_eq!(result.results["error"], "timed out");
        assert_eq!(result.reasoning, "Execution failed: timed out");
    }
}
