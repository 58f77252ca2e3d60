//! Parameter refinement from temporal, geographic and entity context.

use crate::analyzer::RECENT;
use crate::entities::{self, EntityKind};
use crate::registry;
use crate::types::{Params, QueryAnalysis, ToolName};
use serde_json::Value;

/// Earliest date used when a query asks for recent material
pub const RECENT_CUTOFF: &str = "2024-01-01";

/// Result limit ceiling for lookup intents
pub const LOOKUP_LIMIT: u64 = 5;

/// Result limit floor for research intents
pub const BROAD_LIMIT: u64 = 20;

/// Refines the parameters of a single tool call.
///
/// Returns a new mapping; the base mapping is never modified. Implementations
/// never fail and only emit parameters the tool accepts.
#[async_trait::async_trait]
pub trait ParameterOptimizer: Send + Sync {
    async fn optimize(
        &self,
        tool: ToolName,
        base: &Params,
        analysis: &QueryAnalysis,
        query: &str,
    ) -> Params;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Default)]
pub struct RuleBasedOptimizer;

impl RuleBasedOptimizer {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, tool: ToolName, base: &Params, analysis: &QueryAnalysis) -> Params {
        let mut params = base.clone();
        apply_temporal(tool, &mut params, analysis);
        apply_entities(tool, &mut params, analysis);
        apply_result_limit(tool, &mut params, analysis);
        params
    }
}

#[async_trait::async_trait]
impl ParameterOptimizer for RuleBasedOptimizer {
    async fn optimize(
        &self,
        tool: ToolName,
        base: &Params,
        analysis: &QueryAnalysis,
        _query: &str,
    ) -> Params {
        self.apply(tool, base, analysis)
    }

    fn name(&self) -> &str {
        "rules"
    }
}

/// Set `key` if the tool accepts it; returns whether anything was written
pub(crate) fn set_param(tool: ToolName, params: &mut Params, key: &str, value: Value) -> bool {
    if !registry::accepts(tool, key) {
        return false;
    }
    match params.insert(key.to_string(), value.clone()) {
        Some(previous) if previous != value => {
            tracing::debug!(
                tool = %tool,
                parameter = key,
                previous = %previous,
                value = %value,
                "Overwrote base parameter"
            );
        }
        _ => {}
    }
    true
}

fn apply_temporal(tool: ToolName, params: &mut Params, analysis: &QueryAnalysis) {
    let Some(temporal) = analysis.temporal_context.as_deref() else {
        return;
    };

    if temporal == RECENT {
        set_param(tool, params, "dateFrom", RECENT_CUTOFF.into());
    } else if is_year(temporal) {
        set_param(tool, params, "dateFrom", format!("{}-01-01", temporal).into());
        set_param(tool, params, "dateTo", format!("{}-12-31", temporal).into());
    }
}

fn is_year(value: &str) -> bool {
    value.len() == 4 && value.chars().all(|c| c.is_ascii_digit())
}

fn apply_entities(tool: ToolName, params: &mut Params, analysis: &QueryAnalysis) {
    let mut place: Option<&str> = None;
    let mut person: Option<&str> = None;
    let mut party: Option<&str> = None;
    let mut topics: Vec<&str> = Vec::new();

    for entity in &analysis.entities {
        match entities::classify(entity) {
            Some(EntityKind::Place) => {
                place.get_or_insert(entity.as_str());
            }
            Some(EntityKind::Person) => {
                person.get_or_insert(entity.as_str());
            }
            Some(EntityKind::Party) => {
                party.get_or_insert(entity.as_str());
            }
            Some(EntityKind::Topic) => topics.push(entity.as_str()),
            Some(EntityKind::Date) | None => {}
        }
    }

    if let Some(place) = place {
        set_param(tool, params, "searchText", place.into());
    }
    if let Some(person) = person {
        if !set_param(tool, params, "Name", person.into()) {
            set_param(tool, params, "member_name", person.into());
        }
    }
    if let Some(party) = party {
        set_param(tool, params, "party", party.into());
    }
    if !topics.is_empty() {
        set_param(tool, params, "query", topics.join(" ").into());
    }
}

fn apply_result_limit(tool: ToolName, params: &mut Params, analysis: &QueryAnalysis) {
    let Some(limit_param) = registry::entry(tool).result_limit_param else {
        return;
    };

    let current = params.get(limit_param).and_then(Value::as_u64);
    let limit = if analysis.intent.is_lookup() {
        current.map_or(LOOKUP_LIMIT, |c| c.min(LOOKUP_LIMIT))
    } else {
        current.map_or(BROAD_LIMIT, |c| c.max(BROAD_LIMIT))
    };
    set_param(tool, params, limit_param, limit.into());
}
