//! Tool selection: which downstream tools answer an analysed query.

use crate::registry;
use crate::types::{Params, QueryAnalysis, QueryIntent, ToolName, ToolRecommendation};

/// Confidence given to the default pair when the intent is unknown
pub const UNKNOWN_CONFIDENCE: f64 = 0.2;

/// Confidence lost per priority step
pub const PRIORITY_DECAY: f64 = 0.1;

pub const MAX_RECOMMENDATIONS: usize = 3;

/// Tools serving each intent, in priority order
pub fn intent_tools(intent: QueryIntent) -> &'static [ToolName] {
    use ToolName::*;
    match intent {
        QueryIntent::ConstituencySearch => &[SearchConstituency, GetElectionResults],
        QueryIntent::MemberSearch => &[
            SearchMembers,
            GetDetailedMemberInformation,
            SearchContributions,
        ],
        QueryIntent::PolicyResearch => &[SearchParliamentaryQuestions, SearchDebates],
        QueryIntent::DebateAnalysis => &[SearchDebates, SearchContributions],
        QueryIntent::VotingRecord => &[SearchMembers, GetDetailedMemberInformation],
        QueryIntent::ElectionData => &[GetElectionResults, SearchConstituency],
        QueryIntent::ReferenceData => &[
            GetGovernmentPosts,
            GetOppositionPosts,
            GetStateOfTheParties,
        ],
        QueryIntent::Unknown => &[SearchConstituency, SearchMembers],
    }
}

/// Whether `tool` appears in the table row for `intent`
pub fn serves(tool: ToolName, intent: QueryIntent) -> bool {
    intent_tools(intent).contains(&tool)
}

/// Chooses downstream tools for an analysed query.
///
/// Implementations never fail and never name a tool outside the registry.
#[async_trait::async_trait]
pub trait ToolRecommender: Send + Sync {
    async fn recommend(&self, analysis: &QueryAnalysis, query: &str) -> Vec<ToolRecommendation>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Default)]
pub struct RuleBasedRecommender;

impl RuleBasedRecommender {
    pub fn new() -> Self {
        Self
    }

    pub fn recommendations(&self, analysis: &QueryAnalysis) -> Vec<ToolRecommendation> {
        let base = match analysis.intent {
            QueryIntent::Unknown => UNKNOWN_CONFIDENCE,
            _ => analysis.confidence,
        };

        intent_tools(analysis.intent)
            .iter()
            .take(MAX_RECOMMENDATIONS)
            .enumerate()
            .map(|(index, &tool)| {
                let entry = registry::entry(tool);
                let reasoning = match analysis.intent {
                    QueryIntent::Unknown => {
                        format!("Intent unclear, trying a general search: {}", entry.description)
                    }
                    intent => format!("Serves {} queries: {}", intent, entry.description),
                };
                ToolRecommendation {
                    tool_name: tool,
                    confidence: decayed(base, index),
                    reasoning,
                    suggested_parameters: seed_parameters(tool, analysis),
                    priority: index as u32 + 1,
                }
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ToolRecommender for RuleBasedRecommender {
    async fn recommend(&self, analysis: &QueryAnalysis, _query: &str) -> Vec<ToolRecommendation> {
        self.recommendations(analysis)
    }

    fn name(&self) -> &str {
        "rules"
    }
}

fn decayed(base: f64, steps: usize) -> f64 {
    let value = (base - PRIORITY_DECAY * steps as f64).clamp(0.0, 1.0);
    (value * 100.0).round() / 100.0
}

/// Starting parameters taken straight from the analysis
pub fn seed_parameters(tool: ToolName, analysis: &QueryAnalysis) -> Params {
    let entry = registry::entry(tool);
    let mut params = Params::new();

    if let Some(place) = &analysis.geographic_context {
        if entry.accepts("searchText") {
            params.insert("searchText".to_string(), place.clone().into());
        }
    }
    if !analysis.keywords.is_empty() && entry.accepts("query") {
        params.insert("query".to_string(), analysis.keywords.join(" ").into());
    }

    params
}

/// Sort by priority and enforce the registry and size invariants on an
/// externally produced list.
pub fn normalize(mut recommendations: Vec<ToolRecommendation>) -> Vec<ToolRecommendation> {
    recommendations.sort_by_key(|r| r.priority);
    let mut seen: Vec<ToolName> = Vec::new();
    recommendations.retain(|r| {
        if seen.contains(&r.tool_name) {
            return false;
        }
        seen.push(r.tool_name);
        true
    });
    recommendations.truncate(MAX_RECOMMENDATIONS);
    for rec in &mut recommendations {
        let entry = registry::entry(rec.tool_name);
        rec.suggested_parameters.retain(|k, _| entry.accepts(k));
        rec.confidence = rec.confidence.clamp(0.0, 1.0);
    }
    recommendations
}
