//! Static catalogue of the downstream Parliament tools.
//!
//! The registry is consulted by the recommender (to describe tools), the
//! optimizer (to decide which parameters a tool accepts) and the MCP server
//! (to derive input schemas). It is immutable for the life of the process.

use crate::types::{QueryIntent, ToolName};
use serde::Serialize;

/// JSON type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
}

impl ParamKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolRegistryEntry {
    pub name: ToolName,
    pub description: &'static str,
    pub parameters: &'static [ParameterSpec],
    pub use_cases: &'static [&'static str],
    pub primary_intent: QueryIntent,
    /// Parameter bounding the number of results, when the tool has one
    pub result_limit_param: Option<&'static str>,
}

impl ToolRegistryEntry {
    pub fn accepts(&self, parameter: &str) -> bool {
        self.parameters.iter().any(|p| p.name == parameter)
    }

    pub fn parameter_names(&self) -> Vec<&'static str> {
        self.parameters.iter().map(|p| p.name).collect()
    }
}

const fn param(
    name: &'static str,
    kind: ParamKind,
    description: &'static str,
) -> ParameterSpec {
    ParameterSpec {
        name,
        kind,
        description,
        required: false,
    }
}

const fn required(
    name: &'static str,
    kind: ParamKind,
    description: &'static str,
) -> ParameterSpec {
    ParameterSpec {
        name,
        kind,
        description,
        required: true,
    }
}

use ParamKind::{Boolean, Integer, String as Text};

/// Entries are stored in `ToolName::ALL` order.
pub static REGISTRY: [ToolRegistryEntry; 11] = [
    ToolRegistryEntry {
        name: ToolName::SearchConstituency,
        description: "Search for constituencies by name or get comprehensive constituency details by ID",
        parameters: &[
            param("searchText", Text, "Constituency name or fragment to search for"),
            param("constituency_id", Integer, "Constituency ID for a direct lookup"),
            param("skip", Integer, "Number of results to skip"),
            param("take", Integer, "Maximum number of results to return"),
        ],
        use_cases: &[
            "finding constituency by name",
            "getting constituency details",
            "exploring geographic areas",
        ],
        primary_intent: QueryIntent::ConstituencySearch,
        result_limit_param: Some("take"),
    },
    ToolRegistryEntry {
        name: ToolName::GetElectionResults,
        description: "Get election results for constituencies or specific members",
        parameters: &[
            param("constituency_id", Integer, "Constituency ID"),
            param("election_id", Integer, "Specific election ID"),
            param("member_id", Integer, "Member ID for their latest election result"),
        ],
        use_cases: &["election outcomes", "voting statistics", "electoral history"],
        primary_intent: QueryIntent::ElectionData,
        result_limit_param: None,
    },
    ToolRegistryEntry {
        name: ToolName::SearchMembers,
        description: "Search for members of the Commons or Lords by various criteria",
        parameters: &[
            param("Name", Text, "Full or partial member name"),
            param("PartyId", Integer, "Party ID"),
            param("House", Text, "Commons or Lords"),
            param("ConstituencyId", Integer, "Constituency ID"),
            param("Gender", Text, "M or F"),
            param("member_since", Text, "Membership started since (YYYY-MM-DD)"),
            param("member_until", Text, "Membership ended since (YYYY-MM-DD)"),
            param("IsCurrentMember", Boolean, "Only current members"),
            param("skip", Integer, "Number of results to skip"),
            param("take", Integer, "Maximum number of results to return"),
        ],
        use_cases: &["finding MPs", "party analysis", "demographic research"],
        primary_intent: QueryIntent::MemberSearch,
        result_limit_param: Some("take"),
    },
    ToolRegistryEntry {
        name: ToolName::GetDetailedMemberInformation,
        description: "Get comprehensive member information including biography, contact, interests, and voting record",
        parameters: &[
            required("member_id", Integer, "Member ID"),
            param("include_synopsis", Boolean, "Include the member synopsis"),
            param("include_biography", Boolean, "Include the biography"),
            param("include_contact", Boolean, "Include contact details"),
            param("include_registered_interests", Boolean, "Include registered interests"),
            param("include_voting_record", Boolean, "Include recent voting record"),
        ],
        use_cases: &[
            "MP profiles",
            "biographical research",
            "conflict of interest analysis",
        ],
        primary_intent: QueryIntent::MemberSearch,
        result_limit_param: None,
    },
    ToolRegistryEntry {
        name: ToolName::SearchParliamentaryQuestions,
        description: "Search Parliamentary Written Questions by topic, date, party, or member",
        parameters: &[
            param("query", Text, "Search term"),
            param("dateFrom", Text, "Tabled on or after (YYYY-MM-DD)"),
            param("dateTo", Text, "Tabled on or before (YYYY-MM-DD)"),
            param("party", Text, "Party of the asking member"),
            param("member_name", Text, "Name of the asking member"),
            param("member_id", Integer, "ID of the asking member"),
            param("take", Integer, "Maximum number of results to return"),
        ],
        use_cases: &["policy research", "accountability tracking", "issue analysis"],
        primary_intent: QueryIntent::PolicyResearch,
        result_limit_param: Some("take"),
    },
    ToolRegistryEntry {
        name: ToolName::SearchDebates,
        description: "Search through debate titles to find relevant debates",
        parameters: &[
            param("query", Text, "Search term"),
            param("dateFrom", Text, "Start date (YYYY-MM-DD)"),
            param("dateTo", Text, "End date (YYYY-MM-DD)"),
            param("house", Text, "Commons or Lords"),
            param("maxResults", Integer, "Maximum number of results to return"),
        ],
        use_cases: &[
            "legislative analysis",
            "debate discovery",
            "parliamentary proceedings",
        ],
        primary_intent: QueryIntent::DebateAnalysis,
        result_limit_param: Some("maxResults"),
    },
    ToolRegistryEntry {
        name: ToolName::SearchContributions,
        description: "Search Hansard parliamentary records for actual spoken contributions during debates",
        parameters: &[
            param("query", Text, "Search term"),
            param("memberId", Integer, "Member ID of the speaker"),
            param("dateFrom", Text, "Start date (YYYY-MM-DD)"),
            param("dateTo", Text, "End date (YYYY-MM-DD)"),
            param("debateId", Text, "Debate section ID"),
            param("house", Text, "Commons or Lords"),
            param("maxResults", Integer, "Maximum number of results to return"),
        ],
        use_cases: &["speech analysis", "MP positions", "debate participation"],
        primary_intent: QueryIntent::DebateAnalysis,
        result_limit_param: Some("maxResults"),
    },
    ToolRegistryEntry {
        name: ToolName::GetStateOfTheParties,
        description: "Get state of the parties for a house on a specific date",
        parameters: &[
            param("house", Text, "Commons or Lords (default: Commons)"),
            param("forDate", Text, "Date (YYYY-MM-DD, default: today)"),
        ],
        use_cases: &["party composition", "historical analysis", "political balance"],
        primary_intent: QueryIntent::ReferenceData,
        result_limit_param: None,
    },
    ToolRegistryEntry {
        name: ToolName::GetGovernmentPosts,
        description: "Get exhaustive list of all government posts and their current holders",
        parameters: &[],
        use_cases: &[
            "government structure",
            "ministerial roles",
            "executive analysis",
        ],
        primary_intent: QueryIntent::ReferenceData,
        result_limit_param: None,
    },
    ToolRegistryEntry {
        name: ToolName::GetOppositionPosts,
        description: "Get exhaustive list of all opposition posts and their current holders",
        parameters: &[],
        use_cases: &[
            "opposition structure",
            "shadow cabinet",
            "political organization",
        ],
        primary_intent: QueryIntent::ReferenceData,
        result_limit_param: None,
    },
    ToolRegistryEntry {
        name: ToolName::GetDepartments,
        description: "Get reference data for government departments",
        parameters: &[],
        use_cases: &[
            "government structure",
            "departmental analysis",
            "administrative research",
        ],
        primary_intent: QueryIntent::ReferenceData,
        result_limit_param: None,
    },
];

/// Look up the registry entry for a tool
pub fn entry(tool: ToolName) -> &'static ToolRegistryEntry {
    &REGISTRY[tool as usize]
}

pub fn all() -> &'static [ToolRegistryEntry] {
    &REGISTRY
}

/// Whether `tool` takes a parameter called `parameter`
pub fn accepts(tool: ToolName, parameter: &str) -> bool {
    entry(tool).accepts(parameter)
}

/// Registry rendered as JSON for prompts and catalogue endpoints
pub fn catalogue_json() -> serde_json::Value {
    serde_json::Value::Object(
        REGISTRY
            .iter()
            .map(|e| {
                (
                    e.name.as_str().to_string(),
                    serde_json::json!({
                        "description": e.description,
                        "parameters": e.parameter_names(),
                        "use_cases": e.use_cases,
                    }),
                )
            })
            .collect(),
    )
}
