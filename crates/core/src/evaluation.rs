//! Baseline-versus-pipeline comparison over a labelled query set.

use crate::pipeline::IntelligencePipeline;
use crate::types::{QueryIntent, ToolName};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Quality credited to the static baseline selection
pub const BASELINE_QUALITY: f64 = 0.6;

const MAX_INTELLIGENT_QUALITY: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    EdgeCase,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::EdgeCase,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::EdgeCase => "Edge case",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelledQuery {
    pub query: &'static str,
    pub expected_intent: QueryIntent,
    pub expected_tools: &'static [ToolName],
    pub expected_entities: &'static [&'static str],
    pub difficulty: Difficulty,
    pub category: &'static str,
    pub description: &'static str,
}

use ToolName::*;

pub static LABELLED_QUERIES: [LabelledQuery; 11] = [
    LabelledQuery {
        query: "Find Birmingham constituency information",
        expected_intent: QueryIntent::ConstituencySearch,
        expected_tools: &[SearchConstituency, GetElectionResults],
        expected_entities: &["Birmingham"],
        difficulty: Difficulty::Easy,
        category: "constituency",
        description: "Simple constituency lookup",
    },
    LabelledQuery {
        query: "Who is the MP for Manchester Central?",
        expected_intent: QueryIntent::MemberSearch,
        expected_tools: &[SearchConstituency, SearchMembers],
        expected_entities: &["Manchester Central"],
        difficulty: Difficulty::Easy,
        category: "member",
        description: "MP lookup by constituency",
    },
    LabelledQuery {
        query: "Show me recent debates about climate change",
        expected_intent: QueryIntent::DebateAnalysis,
        expected_tools: &[SearchDebates, SearchContributions],
        expected_entities: &["climate change"],
        difficulty: Difficulty::Easy,
        category: "debate",
        description: "Topic-based debate search",
    },
    LabelledQuery {
        query: "What has Boris Johnson said about Brexit in parliament since 2020?",
        expected_intent: QueryIntent::DebateAnalysis,
        expected_tools: &[SearchMembers, SearchContributions],
        expected_entities: &["Boris Johnson", "Brexit", "2020"],
        difficulty: Difficulty::Medium,
        category: "member_debate",
        description: "Member speeches with a date filter",
    },
    LabelledQuery {
        query: "Find parliamentary questions about NHS funding from Conservative MPs",
        expected_intent: QueryIntent::PolicyResearch,
        expected_tools: &[SearchParliamentaryQuestions, SearchMembers],
        expected_entities: &["NHS", "Conservative"],
        difficulty: Difficulty::Medium,
        category: "policy",
        description: "Policy research with a party filter",
    },
    LabelledQuery {
        query: "Which constituencies had the closest election results in 2019?",
        expected_intent: QueryIntent::ConstituencySearch,
        expected_tools: &[SearchConstituency, GetElectionResults],
        expected_entities: &["2019"],
        difficulty: Difficulty::Medium,
        category: "election",
        description: "Comparative election analysis",
    },
    LabelledQuery {
        query: "Compare government and opposition positions on housing policy based on recent parliamentary activity",
        expected_intent: QueryIntent::PolicyResearch,
        expected_tools: &[
            SearchParliamentaryQuestions,
            SearchDebates,
            GetGovernmentPosts,
            GetOppositionPosts,
        ],
        expected_entities: &["housing policy", "government", "opposition"],
        difficulty: Difficulty::Hard,
        category: "comparative_analysis",
        description: "Comparative policy analysis",
    },
    LabelledQuery {
        query: "Analyze the voting patterns of new MPs elected in 2019 compared to their predecessors",
        expected_intent: QueryIntent::ElectionData,
        expected_tools: &[GetElectionResults, SearchMembers, GetDetailedMemberInformation],
        expected_entities: &["2019", "voting patterns", "new MPs"],
        difficulty: Difficulty::Hard,
        category: "longitudinal_analysis",
        description: "Longitudinal voting analysis",
    },
    LabelledQuery {
        query: "What are the key differences in how Labour and Conservative MPs discuss economic policy in debates vs written questions?",
        expected_intent: QueryIntent::PolicyResearch,
        expected_tools: &[
            SearchDebates,
            SearchContributions,
            SearchParliamentaryQuestions,
            SearchMembers,
        ],
        expected_entities: &["Labour", "Conservative", "economic policy"],
        difficulty: Difficulty::Hard,
        category: "discourse_analysis",
        description: "Discourse analysis across sources",
    },
    LabelledQuery {
        query: "asdfgh random gibberish query",
        expected_intent: QueryIntent::Unknown,
        expected_tools: &[SearchConstituency, SearchMembers],
        expected_entities: &[],
        difficulty: Difficulty::EdgeCase,
        category: "invalid",
        description: "Nonsense query",
    },
    LabelledQuery {
        query: "",
        expected_intent: QueryIntent::Unknown,
        expected_tools: &[SearchConstituency, SearchMembers],
        expected_entities: &[],
        difficulty: Difficulty::EdgeCase,
        category: "empty",
        description: "Empty query",
    },
];

/// Static selection the pipeline is compared against
pub fn baseline_tools() -> Vec<ToolName> {
    vec![SearchConstituency, SearchMembers]
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryEvaluation {
    pub query: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub detected_intent: QueryIntent,
    pub expected_intent: QueryIntent,
    pub baseline_tools: Vec<ToolName>,
    pub intelligent_tools: Vec<ToolName>,
    pub extracted_entities: Vec<String>,
    pub baseline_time_ms: f64,
    pub intelligent_time_ms: f64,
    pub intent_accuracy: f64,
    pub entity_accuracy: f64,
    pub tool_accuracy: f64,
    pub baseline_quality: f64,
    pub intelligent_quality: f64,
    pub improvement_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DifficultySummary {
    pub difficulty: Difficulty,
    pub count: usize,
    pub avg_quality_improvement: f64,
    pub avg_tool_accuracy: f64,
    pub avg_intent_accuracy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub total_queries: usize,
    pub avg_baseline_time_ms: f64,
    pub avg_intelligent_time_ms: f64,
    pub avg_baseline_quality: f64,
    pub avg_intelligent_quality: f64,
    pub quality_improvement_percent: f64,
    pub intent_accuracy_percent: f64,
    pub entity_accuracy_percent: f64,
    pub tool_accuracy_percent: f64,
    pub overall_improvement_score: f64,
    pub by_difficulty: Vec<DifficultySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub generated_at: DateTime<Utc>,
    pub summary: EvaluationSummary,
    pub results: Vec<QueryEvaluation>,
}

pub struct EvaluationSuite {
    pipeline: Arc<IntelligencePipeline>,
    queries: Vec<LabelledQuery>,
}

impl EvaluationSuite {
    pub fn new(pipeline: Arc<IntelligencePipeline>) -> Self {
        Self {
            pipeline,
            queries: LABELLED_QUERIES.to_vec(),
        }
    }

    pub fn with_queries(mut self, queries: Vec<LabelledQuery>) -> Self {
        self.queries = queries;
        self
    }

    pub async fn run(&self) -> EvaluationReport {
        tracing::info!(queries = self.queries.len(), "Starting evaluation");

        let mut results = Vec::with_capacity(self.queries.len());
        for labelled in &self.queries {
            results.push(self.evaluate_query(labelled).await);
        }

        let summary = summarise(&results);
        tracing::info!(
            intent_accuracy = summary.intent_accuracy_percent,
            tool_accuracy = summary.tool_accuracy_percent,
            "Evaluation complete"
        );

        EvaluationReport {
            generated_at: Utc::now(),
            summary,
            results,
        }
    }

    async fn evaluate_query(&self, labelled: &LabelledQuery) -> QueryEvaluation {
        tracing::debug!(query = labelled.query, "Evaluating query");

        let start = Instant::now();
        let baseline = baseline_tools();
        let baseline_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        let (analysis, recommendations) = self.pipeline.recommend(labelled.query, None).await;
        let intelligent_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let intelligent: Vec<ToolName> = recommendations.iter().map(|r| r.tool_name).collect();

        let intent_accuracy = if analysis.intent == labelled.expected_intent {
            1.0
        } else {
            0.0
        };
        let entity_accuracy = overlap(
            analysis.entities.iter().map(String::as_str),
            labelled.expected_entities.iter().copied(),
        );
        let tool_accuracy = overlap(
            intelligent.iter().copied(),
            labelled.expected_tools.iter().copied(),
        );

        let intelligent_quality =
            MAX_INTELLIGENT_QUALITY.min(0.5 + intent_accuracy * 0.3 + tool_accuracy * 0.2);
        let improvement_score = (intelligent_quality - BASELINE_QUALITY) + tool_accuracy * 0.3;

        QueryEvaluation {
            query: labelled.query.to_string(),
            difficulty: labelled.difficulty,
            category: labelled.category.to_string(),
            detected_intent: analysis.intent,
            expected_intent: labelled.expected_intent,
            baseline_tools: baseline,
            intelligent_tools: intelligent,
            extracted_entities: analysis.entities,
            baseline_time_ms,
            intelligent_time_ms,
            intent_accuracy,
            entity_accuracy,
            tool_accuracy,
            baseline_quality: BASELINE_QUALITY,
            intelligent_quality,
            improvement_score,
        }
    }
}

/// Share of `expected` found in `actual`; 1.0 when nothing was expected
/// and nothing was found
fn overlap<T: Eq + std::hash::Hash>(
    actual: impl IntoIterator<Item = T>,
    expected: impl IntoIterator<Item = T>,
) -> f64 {
    let actual: HashSet<T> = actual.into_iter().collect();
    let expected: HashSet<T> = expected.into_iter().collect();
    if expected.is_empty() {
        return if actual.is_empty() { 1.0 } else { 0.0 };
    }
    expected.intersection(&actual).count() as f64 / expected.len() as f64
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn summarise(results: &[QueryEvaluation]) -> EvaluationSummary {
    let avg_baseline_quality = mean(results.iter().map(|r| r.baseline_quality));
    let avg_intelligent_quality = mean(results.iter().map(|r| r.intelligent_quality));
    let quality_improvement_percent = if avg_baseline_quality > 0.0 {
        (avg_intelligent_quality - avg_baseline_quality) / avg_baseline_quality * 100.0
    } else {
        0.0
    };

    let by_difficulty = Difficulty::ALL
        .into_iter()
        .filter_map(|difficulty| {
            let group: Vec<&QueryEvaluation> =
                results.iter().filter(|r| r.difficulty == difficulty).collect();
            if group.is_empty() {
                return None;
            }
            Some(DifficultySummary {
                difficulty,
                count: group.len(),
                avg_quality_improvement: mean(
                    group.iter().map(|r| r.intelligent_quality - r.baseline_quality),
                ),
                avg_tool_accuracy: mean(group.iter().map(|r| r.tool_accuracy)),
                avg_intent_accuracy: mean(group.iter().map(|r| r.intent_accuracy)),
            })
        })
        .collect();

    EvaluationSummary {
        total_queries: results.len(),
        avg_baseline_time_ms: mean(results.iter().map(|r| r.baseline_time_ms)),
        avg_intelligent_time_ms: mean(results.iter().map(|r| r.intelligent_time_ms)),
        avg_baseline_quality,
        avg_intelligent_quality,
        quality_improvement_percent,
        intent_accuracy_percent: mean(results.iter().map(|r| r.intent_accuracy)) * 100.0,
        entity_accuracy_percent: mean(results.iter().map(|r| r.entity_accuracy)) * 100.0,
        tool_accuracy_percent: mean(results.iter().map(|r| r.tool_accuracy)) * 100.0,
        overall_improvement_score: mean(results.iter().map(|r| r.improvement_score)),
        by_difficulty,
    }
}

impl EvaluationReport {
    pub fn to_markdown(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();

        let _ = writeln!(out, "# Tool Selection Evaluation Report");
        let _ = writeln!(out, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(out);
        let _ = writeln!(out, "## Summary");
        let _ = writeln!(out);
        let _ = writeln!(out, "Queries evaluated: {}", s.total_queries);
        let _ = writeln!(out);
        let _ = writeln!(out, "- **Quality improvement**: {:.1}%", s.quality_improvement_percent);
        let _ = writeln!(out, "- **Tool selection accuracy**: {:.1}%", s.tool_accuracy_percent);
        let _ = writeln!(out, "- **Intent accuracy**: {:.1}%", s.intent_accuracy_percent);
        let _ = writeln!(out, "- **Entity extraction accuracy**: {:.1}%", s.entity_accuracy_percent);
        let _ = writeln!(
            out,
            "- **Processing time**: baseline {:.2}ms, pipeline {:.2}ms",
            s.avg_baseline_time_ms, s.avg_intelligent_time_ms
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "## Quality");
        let _ = writeln!(out);
        let _ = writeln!(out, "- Baseline quality score: {:.2}/1.0", s.avg_baseline_quality);
        let _ = writeln!(out, "- Pipeline quality score: {:.2}/1.0", s.avg_intelligent_quality);
        let _ = writeln!(out, "- Overall improvement score: {:.2}", s.overall_improvement_score);
        let _ = writeln!(out);
        let _ = writeln!(out, "## Results by difficulty");
        let _ = writeln!(out);
        for group in &s.by_difficulty {
            let _ = writeln!(out, "### {} ({} queries)", group.difficulty.title(), group.count);
            let _ = writeln!(out, "- Quality improvement: {:.2}", group.avg_quality_improvement);
            let _ = writeln!(out, "- Tool selection accuracy: {:.1}%", group.avg_tool_accuracy * 100.0);
            let _ = writeln!(out, "- Intent accuracy: {:.1}%", group.avg_intent_accuracy * 100.0);
            let _ = writeln!(out);
        }
        let _ = writeln!(out, "## Queries");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Query | Expected | Detected | Tools | Tool accuracy |");
        let _ = writeln!(out, "|---|---|---|---|---|");
        for r in &self.results {
            let tools: Vec<&str> = r.intelligent_tools.iter().map(|t| t.as_str()).collect();
            let query = if r.query.is_empty() { "(empty)" } else { r.query.as_str() };
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {:.0}% |",
                query,
                r.expected_intent,
                r.detected_intent,
                tools.join(", "),
                r.tool_accuracy * 100.0
            );
        }
        out
    }

    /// Write `<stem>.json` and `<stem>.md` into `dir`, returning both paths
    pub async fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let stem = format!("evaluation_{}", self.generated_at.format("%Y%m%d_%H%M%S"));
        let json_path = dir.join(format!("{}.json", stem));
        let md_path = dir.join(format!("{}.md", stem));

        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        tokio::fs::write(&json_path, json)
            .await
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        tokio::fs::write(&md_path, self.to_markdown())
            .await
            .with_context(|| format!("Failed to write {}", md_path.display()))?;

        Ok((json_path, md_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn run() -> EvaluationReport {
        EvaluationSuite::new(Arc::new(IntelligencePipeline::rule_based()))
            .run()
            .await
    }

    #[tokio::test]
    async fn test_runs_every_labelled_query() {
        let report = run().await;
        assert_eq!(report.summary.total_queries, LABELLED_QUERIES.len());
        assert_eq!(report.summary.by_difficulty.len(), 4);
        assert_eq!(report.summary.avg_baseline_quality, BASELINE_QUALITY);
    }

    #[tokio::test]
    async fn test_easy_constituency_query_scores_full_marks() {
        let report = run().await;
        let birmingham = &report.results[0];
        assert_eq!(birmingham.intent_accuracy, 1.0);
        assert_eq!(birmingham.entity_accuracy, 1.0);
        assert_eq!(birmingham.tool_accuracy, 1.0);
        assert_eq!(birmingham.intelligent_quality, MAX_INTELLIGENT_QUALITY);
    }

    #[tokio::test]
    async fn test_constituency_wording_outranks_election_wording() {
        let report = run().await;
        let closest = report
            .results
            .iter()
            .find(|r| r.query.contains("closest election results"))
            .unwrap();
        assert_eq!(closest.detected_intent, QueryIntent::ConstituencySearch);
        assert_eq!(closest.intent_accuracy, 1.0);
        assert_eq!(closest.tool_accuracy, 1.0);
    }

    #[tokio::test]
    async fn test_edge_cases_match_default_pair() {
        let report = run().await;
        for result in report.results.iter().filter(|r| r.difficulty == Difficulty::EdgeCase) {
            assert_eq!(result.detected_intent, QueryIntent::Unknown);
            assert_eq!(result.intelligent_tools, baseline_tools());
            assert_eq!(result.tool_accuracy, 1.0);
        }
    }

    #[test]
    fn test_overlap() {
        assert_eq!(overlap(["a", "b"], ["a", "c"]), 0.5);
        assert_eq!(overlap(Vec::<&str>::new(), Vec::new()), 1.0);
        assert_eq!(overlap(["a"], Vec::new()), 0.0);
    }

    #[tokio::test]
    async fn test_write_to_creates_json_and_markdown() {
        let temp_dir = TempDir::new().unwrap();
        let report = run().await;
        let (json_path, md_path) = report.write_to(temp_dir.path()).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(json["results"].as_array().unwrap().len(), LABELLED_QUERIES.len());

        let markdown = std::fs::read_to_string(md_path).unwrap();
        assert!(markdown.starts_with("# Tool Selection Evaluation Report"));
        assert!(markdown.contains("### Edge case (2 queries)"));
        assert!(markdown.contains("(empty)"));
    }
}
