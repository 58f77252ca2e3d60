//! Hansard search endpoints.

use super::{bounded_take, house_name, lenient, push_opt, Query};
use crate::client::ParliamentClient;
use crate::error::ParliamentResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_TAKE: u32 = 20;
const MAX_TAKE: u32 = 100;

/// Arguments of `search_debates`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebateSearchArgs {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub query: Option<String>,
    #[serde(rename = "dateFrom", default, deserialize_with = "lenient::opt_string")]
    pub date_from: Option<String>,
    #[serde(rename = "dateTo", default, deserialize_with = "lenient::opt_string")]
    pub date_to: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub house: Option<String>,
    #[serde(rename = "maxResults", default, deserialize_with = "lenient::opt_u32")]
    pub max_results: Option<u32>,
}

/// Arguments of `search_contributions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContributionSearchArgs {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub query: Option<String>,
    #[serde(rename = "memberId", default, deserialize_with = "lenient::opt_u64")]
    pub member_id: Option<u64>,
    #[serde(rename = "dateFrom", default, deserialize_with = "lenient::opt_string")]
    pub date_from: Option<String>,
    #[serde(rename = "dateTo", default, deserialize_with = "lenient::opt_string")]
    pub date_to: Option<String>,
    #[serde(rename = "debateId", default, deserialize_with = "lenient::opt_string")]
    pub debate_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub house: Option<String>,
    #[serde(rename = "maxResults", default, deserialize_with = "lenient::opt_u32")]
    pub max_results: Option<u32>,
}

pub struct HansardApi<'a> {
    client: &'a ParliamentClient,
}

impl<'a> HansardApi<'a> {
    pub(crate) fn new(client: &'a ParliamentClient) -> Self {
        Self { client }
    }

    /// Search debate titles.
    pub async fn debates(&self, args: &DebateSearchArgs) -> ParliamentResult<Value> {
        let mut query: Query = Vec::new();
        push_opt(&mut query, "queryParameters.searchTerm", args.query.as_deref());
        push_opt(&mut query, "queryParameters.startDate", args.date_from.as_deref());
        push_opt(&mut query, "queryParameters.endDate", args.date_to.as_deref());
        if let Some(house) = &args.house {
            query.push(("queryParameters.house", house_name(house)?.to_string()));
        }
        query.push((
            "queryParameters.take",
            bounded_take(args.max_results, DEFAULT_TAKE, MAX_TAKE).to_string(),
        ));

        self.client
            .http
            .get_with_query(&self.client.config().hansard_url, "search/debates.json", &query)
            .await
    }

    /// Search spoken contributions.
    pub async fn contributions(&self, args: &ContributionSearchArgs) -> ParliamentResult<Value> {
        let mut query: Query = Vec::new();
        push_opt(&mut query, "queryParameters.searchTerm", args.query.as_deref());
        push_opt(&mut query, "queryParameters.memberId", args.member_id);
        push_opt(&mut query, "queryParameters.startDate", args.date_from.as_deref());
        push_opt(&mut query, "queryParameters.endDate", args.date_to.as_deref());
        push_opt(&mut query, "queryParameters.debateSectionId", args.debate_id.as_deref());
        if let Some(house) = &args.house {
            query.push(("queryParameters.house", house_name(house)?.to_string()));
        }
        query.push((
            "queryParameters.take",
            bounded_take(args.max_results, DEFAULT_TAKE, MAX_TAKE).to_string(),
        ));

        self.client
            .http
            .get_with_query(
                &self.client.config().hansard_url,
                "search/contributions/Spoken.json",
                &query,
            )
            .await
    }
}
