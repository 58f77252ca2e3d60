//! Query analysis: free text to intent, entities and keywords.

use crate::entities::{self, EntityKind};
use crate::types::{QueryAnalysis, QueryContext, QueryIntent};

/// Confidence reported when a rule matched
pub const RULE_MATCH_CONFIDENCE: f64 = 0.8;

/// Confidence reported when only a bare place name was recognised
pub const PLACE_ONLY_CONFIDENCE: f64 = 0.6;

pub const MAX_KEYWORDS: usize = 5;

/// Temporal context value meaning "restrict to recent material"
pub const RECENT: &str = "recent";

/// Classifies a free-text query.
///
/// Implementations never fail: anything that goes wrong internally resolves to
/// [`QueryAnalysis::unknown`] and is logged.
#[async_trait::async_trait]
pub trait QueryClassifier: Send + Sync {
    async fn analyze(&self, query: &str, context: Option<&QueryContext>) -> QueryAnalysis;

    fn name(&self) -> &str;
}

struct IntentRule {
    intent: QueryIntent,
    /// Matched against whole tokens
    words: &'static [&'static str],
    /// Matched as substrings of the normalized query
    fragments: &'static [&'static str],
    /// Any recognised person triggers the rule
    on_person: bool,
}

/// Evaluated in order; the first rule that matches decides the intent.
static RULES: [IntentRule; 7] = [
    IntentRule {
        intent: QueryIntent::ConstituencySearch,
        words: &["borough"],
        fragments: &["constituenc"],
        on_person: false,
    },
    IntentRule {
        intent: QueryIntent::MemberSearch,
        words: &[
            "mp", "mps", "member", "members", "minister", "ministers", "lord", "lords",
            "baroness", "peer", "peers",
        ],
        fragments: &[],
        on_person: true,
    },
    IntentRule {
        intent: QueryIntent::PolicyResearch,
        words: &["question", "questions", "policy", "policies", "funding", "asked"],
        fragments: &[],
        on_person: false,
    },
    IntentRule {
        intent: QueryIntent::VotingRecord,
        words: &[
            "vote", "votes", "voted", "voting", "division", "divisions", "bill", "bills",
            "rebel", "rebelled",
        ],
        fragments: &[],
        on_person: false,
    },
    IntentRule {
        intent: QueryIntent::ElectionData,
        words: &[
            "election", "elections", "elected", "majority", "marginal", "turnout", "result",
            "results",
        ],
        fragments: &[],
        on_person: false,
    },
    IntentRule {
        intent: QueryIntent::DebateAnalysis,
        words: &[
            "debate", "debates", "debated", "speech", "speeches", "hansard", "said", "says",
            "contribution", "contributions", "discussed",
        ],
        fragments: &[],
        on_person: false,
    },
    IntentRule {
        intent: QueryIntent::ReferenceData,
        words: &["department", "departments", "cabinet", "shadow", "frontbench"],
        fragments: &[
            " state of the parties ",
            " government posts ",
            " opposition posts ",
            " party composition ",
        ],
        on_person: false,
    },
];

static RECENT_WORDS: &[&str] = &["recent", "recently", "latest", "lately", "current"];
static RECENT_PHRASES: &[&str] = &[" this week ", " this month ", " this year ", " last month "];

static STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "for", "about", "in", "on", "to", "and", "or", "me", "show", "find",
    "get", "what", "which", "who", "whom", "is", "are", "was", "were", "be", "has", "have",
    "had", "did", "does", "do", "with", "from", "by", "since", "how", "tell", "give", "list",
    "please", "i", "you", "my", "this", "that", "these", "those", "at", "as", "it", "its",
    "their", "there", "all", "any", "can", "could", "would", "should",
];

/// Deterministic keyword classifier
#[derive(Debug, Clone, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous form of [`QueryClassifier::analyze`]
    pub fn classify(&self, query: &str, context: Option<&QueryContext>) -> QueryAnalysis {
        let normalized = entities::normalize(query);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        if tokens.is_empty() {
            return QueryAnalysis::unknown();
        }

        let extracted = entities::extract(query);
        let has_person = extracted.iter().any(|e| e.kind == EntityKind::Person);

        let geographic_context = extracted
            .iter()
            .find(|e| e.kind == EntityKind::Place)
            .map(|e| e.text.clone())
            .or_else(|| context_location(context));

        let matched = RULES.iter().find(|rule| {
            (rule.on_person && has_person)
                || rule.words.iter().any(|w| tokens.contains(w))
                || rule.fragments.iter().any(|f| normalized.contains(f))
        });

        let (intent, confidence) = match matched {
            Some(rule) => (rule.intent, RULE_MATCH_CONFIDENCE),
            None if geographic_context.is_some() => {
                (QueryIntent::ConstituencySearch, PLACE_ONLY_CONFIDENCE)
            }
            None => (QueryIntent::Unknown, 0.0),
        };

        tracing::debug!(
            intent = %intent,
            confidence = confidence,
            entities = extracted.len(),
            "Classified query"
        );

        QueryAnalysis {
            intent,
            entities: extracted.into_iter().map(|e| e.text).collect(),
            temporal_context: temporal_context(&normalized, &tokens, query),
            geographic_context,
            confidence,
            keywords: keywords(&tokens),
        }
    }
}

#[async_trait::async_trait]
impl QueryClassifier for RuleBasedClassifier {
    async fn analyze(&self, query: &str, context: Option<&QueryContext>) -> QueryAnalysis {
        self.classify(query, context)
    }

    fn name(&self) -> &str {
        "rules"
    }
}

fn temporal_context(normalized: &str, tokens: &[&str], query: &str) -> Option<String> {
    let recent = RECENT_WORDS.iter().any(|w| tokens.contains(w))
        || RECENT_PHRASES.iter().any(|p| normalized.contains(p));
    if recent {
        return Some(RECENT.to_string());
    }
    entities::first_year(query)
}

fn keywords(tokens: &[&str]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in tokens {
        if keywords.len() == MAX_KEYWORDS {
            break;
        }
        if STOPWORDS.contains(token) || keywords.iter().any(|k| k == token) {
            continue;
        }
        keywords.push(token.to_string());
    }
    keywords
}

fn context_location(context: Option<&QueryContext>) -> Option<String> {
    let context = context?;
    ["location", "constituency", "place"]
        .iter()
        .filter_map(|key| context.get(*key))
        .filter_map(|value| value.as_str())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(query: &str) -> QueryAnalysis {
        RuleBasedClassifier::new().classify(query, None)
    }

    #[test]
    fn test_constituency_substring_always_wins() {
        for query in [
            "constituency",
            "Find Birmingham constituency information",
            "Which MP votes in this constituency on the election bill debate?",
            "mp question vote election constituency",
            "Which constituencies had the closest election results in 2019?",
        ] {
            assert_eq!(
                classify(query).intent,
                QueryIntent::ConstituencySearch,
                "query: {}",
                query
            );
        }
    }

    #[test]
    fn test_birmingham_scenario() {
        let analysis = classify("Find Birmingham constituency information");
        assert_eq!(analysis.intent, QueryIntent::ConstituencySearch);
        assert!(analysis.entities.contains(&"Birmingham".to_string()));
        assert_eq!(analysis.geographic_context.as_deref(), Some("Birmingham"));
        assert_eq!(analysis.confidence, RULE_MATCH_CONFIDENCE);
        assert_eq!(analysis.keywords, vec!["birmingham", "constituency", "information"]);
    }

    #[test]
    fn test_nhs_questions_are_policy_research() {
        let analysis = classify("Show me parliamentary questions about NHS funding");
        assert_eq!(analysis.intent, QueryIntent::PolicyResearch);
        assert_eq!(analysis.entities, vec!["NHS"]);
    }

    #[test]
    fn test_precedence_order() {
        assert_eq!(classify("Who is the MP for Leeds?").intent, QueryIntent::MemberSearch);
        assert_eq!(
            classify("What has Keir Starmer said about the economy recently?").intent,
            QueryIntent::MemberSearch
        );
        assert_eq!(
            classify("questions about the recent bill").intent,
            QueryIntent::PolicyResearch
        );
        assert_eq!(
            classify("how did the vote on the election act go").intent,
            QueryIntent::VotingRecord
        );
        assert_eq!(
            classify("Get election results for marginal seats in 2019").intent,
            QueryIntent::ElectionData
        );
        assert_eq!(
            classify("Show me recent debates about climate change").intent,
            QueryIntent::DebateAnalysis
        );
        assert_eq!(
            classify("List government departments").intent,
            QueryIntent::ReferenceData
        );
    }

    #[test]
    fn test_short_terms_do_not_match_inside_words() {
        // "mp" inside "compare", "vote" inside "devoted"
        let analysis = classify("compare devoted gardeners");
        assert_eq!(analysis.intent, QueryIntent::Unknown);
        assert_eq!(analysis.confidence, 0.0);
    }

    #[test]
    fn test_empty_query_is_unknown() {
        for query in ["", "   ", "?!"] {
            assert_eq!(classify(query), QueryAnalysis::unknown());
        }
    }

    #[test]
    fn test_gibberish_keeps_keywords() {
        let analysis = classify("asdfgh random gibberish query");
        assert_eq!(analysis.intent, QueryIntent::Unknown);
        assert!(analysis.entities.is_empty());
        assert_eq!(analysis.keywords, vec!["asdfgh", "random", "gibberish", "query"]);
    }

    #[test]
    fn test_keywords_capped_and_deduplicated() {
        let analysis = classify("nhs nhs funding waiting lists winter pressures hospitals");
        assert_eq!(analysis.keywords.len(), MAX_KEYWORDS);
        assert_eq!(analysis.keywords, vec!["nhs", "funding", "waiting", "lists", "winter"]);
    }

    #[test]
    fn test_temporal_context() {
        assert_eq!(
            classify("recent debates on housing").temporal_context.as_deref(),
            Some(RECENT)
        );
        assert_eq!(
            classify("election results in 2019").temporal_context.as_deref(),
            Some("2019")
        );
        assert_eq!(classify("housing debates").temporal_context, None);
    }

    #[test]
    fn test_place_only_falls_back_to_constituency() {
        let analysis = classify("Tell me about Harrow");
        assert_eq!(analysis.intent, QueryIntent::ConstituencySearch);
        assert_eq!(analysis.confidence, PLACE_ONLY_CONFIDENCE);
    }

    #[test]
    fn test_context_supplies_location() {
        let mut context = QueryContext::new();
        context.insert("location".to_string(), serde_json::json!("Harrow"));
        let analysis = RuleBasedClassifier::new().classify("debates on roads", Some(&context));
        assert_eq!(analysis.geographic_context.as_deref(), Some("Harrow"));
        assert_eq!(analysis.intent, QueryIntent::DebateAnalysis);
    }

    #[tokio::test]
    async fn test_analyze_is_idempotent() {
        let classifier = RuleBasedClassifier::new();
        let query = "What has Boris Johnson said about Brexit in parliament since 2020?";
        let first = classifier.analyze(query, None).await;
        let second = classifier.analyze(query, None).await;
        assert_eq!(first, second);
    }
}
