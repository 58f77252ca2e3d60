//! Prompt templates. Each asks for a single JSON document.

use crate::registry;
use crate::types::{Params, QueryAnalysis, QueryContext, QueryIntent, ToolName};

pub const SYSTEM: &str =
    "You support a UK Parliament research service. Reply with valid JSON only, no prose.";

/// Largest slice of a tool payload shown to the evaluator
pub const RESULT_EXCERPT_CHARS: usize = 2000;

fn intent_list() -> String {
    QueryIntent::ALL
        .iter()
        .map(|intent| format!("  - {}", intent))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe(analysis: &QueryAnalysis) -> String {
    format!(
        "- intent: {}\n- entities: {:?}\n- temporal context: {}\n- geographic context: {}\n- keywords: {:?}\n- confidence: {:.2}",
        analysis.intent,
        analysis.entities,
        analysis.temporal_context.as_deref().unwrap_or("none"),
        analysis.geographic_context.as_deref().unwrap_or("none"),
        analysis.keywords,
        analysis.confidence,
    )
}

pub fn analysis(query: &str, context: Option<&QueryContext>) -> String {
    let context = context
        .map(|c| serde_json::to_string_pretty(c).unwrap_or_default())
        .unwrap_or_else(|| "{}".to_string());

    format!(
        r#"Classify this question about the UK Parliament.

Query: "{query}"
Context: {context}

Pick exactly one intent:
{intents}

Extract the people, places, constituencies, parties, dates and topics it mentions.
Set temporal_context to "recent" for relative references such as "latest", to a
four-digit year if one is given, otherwise null. Set geographic_context to the
first place or constituency mentioned, otherwise null. List at most five search
keywords.

Reply with:
{{
  "intent": "<intent>",
  "entities": ["..."],
  "temporal_context": "recent" | "YYYY" | null,
  "geographic_context": "..." | null,
  "confidence": 0.0-1.0,
  "keywords": ["..."]
}}"#,
        query = query,
        context = context,
        intents = intent_list(),
    )
}

pub fn recommendation(query: &str, analysis: &QueryAnalysis) -> String {
    let catalogue =
        serde_json::to_string_pretty(&registry::catalogue_json()).unwrap_or_default();

    format!(
        r#"Choose the Parliament API tools that best answer this query.

Query: "{query}"

Analysis:
{analysis}

Available tools:
{catalogue}

Recommend one to three tools in priority order (1 runs first). Only use tool
names from the list above and only suggest parameters the tool accepts.

Reply with a JSON array:
[
  {{
    "tool_name": "<tool>",
    "confidence": 0.0-1.0,
    "reasoning": "...",
    "suggested_parameters": {{ "<param>": "<value>" }},
    "priority": 1
  }}
]"#,
        query = query,
        analysis = describe(analysis),
        catalogue = catalogue,
    )
}

pub fn optimization(
    tool: ToolName,
    base: &Params,
    analysis: &QueryAnalysis,
    query: &str,
    today: &str,
) -> String {
    let entry = registry::entry(tool);
    let base = serde_json::to_string_pretty(base).unwrap_or_default();

    format!(
        r#"Improve the parameters of a call to the '{tool}' tool.

Query: "{query}"
Tool description: {description}
Accepted parameters: {parameters:?}
Current parameters: {base}
Today: {today}

Analysis:
{analysis}

Consider date ranges from the temporal context, filters from places and
people, result limits matching the scope of the question, and search terms
from the entities. Only suggest changes that would clearly improve results.

Reply with a JSON array:
[
  {{ "parameter": "<name>", "value": <value>, "reasoning": "...", "confidence": 0.0-1.0 }}
]"#,
        tool = tool,
        query = query,
        description = entry.description,
        parameters = entry.parameter_names(),
        base = base,
        today = today,
        analysis = describe(analysis),
    )
}

pub fn evaluation(
    query: &str,
    tool: ToolName,
    results: &serde_json::Value,
    expected_intent: QueryIntent,
) -> String {
    let rendered = serde_json::to_string_pretty(results).unwrap_or_default();
    let excerpt = super::truncate(&rendered, RESULT_EXCERPT_CHARS);

    format!(
        r#"Assess how well these results answer the query.

Query: "{query}"
Expected intent: {intent}
Tool used: {tool}

Results (may be truncated):
{excerpt}

Reply with:
{{
  "quality_score": 0.0-1.0,
  "completeness_score": 0.0-1.0,
  "result_count": <number>,
  "refinement_suggestions": [
    {{ "type": "parameter_adjustment" | "additional_tool" | "query_refinement", "suggestion": "...", "reasoning": "..." }}
  ],
  "overall_assessment": "..."
}}"#,
        query = query,
        intent = expected_intent,
        tool = tool,
        excerpt = excerpt,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_lists_every_intent() {
        let prompt = analysis("Who is the MP for Leeds?", None);
        for intent in QueryIntent::ALL {
            assert!(prompt.contains(intent.as_str()));
        }
        assert!(prompt.contains("Who is the MP for Leeds?"));
    }

    #[test]
    fn test_recommendation_prompt_includes_catalogue() {
        let prompt = recommendation("debates on housing", &QueryAnalysis::unknown());
        for tool in ToolName::ALL {
            assert!(prompt.contains(tool.as_str()));
        }
    }

    #[test]
    fn test_evaluation_prompt_truncates_results() {
        let big = serde_json::json!({ "items": vec!["x".repeat(100); 100] });
        let prompt = evaluation("q", ToolName::SearchDebates, &big, QueryIntent::DebateAnalysis);
        assert!(prompt.len() < RESULT_EXCERPT_CHARS + 1000);
    }
}
