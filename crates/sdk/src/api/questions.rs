//! Written questions endpoint of the Questions and Statements API.

use super::{bounded_take, lenient, push_opt, Query};
use crate::client::ParliamentClient;
use crate::error::ParliamentResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_TAKE: u32 = 20;
const MAX_TAKE: u32 = 100;

/// Arguments of `search_parliamentary_questions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionSearchArgs {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub query: Option<String>,
    #[serde(rename = "dateFrom", default, deserialize_with = "lenient::opt_string")]
    pub date_from: Option<String>,
    #[serde(rename = "dateTo", default, deserialize_with = "lenient::opt_string")]
    pub date_to: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub party: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub member_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub member_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub take: Option<u32>,
}

pub struct QuestionsApi<'a> {
    client: &'a ParliamentClient,
}

impl<'a> QuestionsApi<'a> {
    pub(crate) fn new(client: &'a ParliamentClient) -> Self {
        Self { client }
    }

    /// Search written questions.
    ///
    /// The API filters by asking member ID only, so a member name is first
    /// resolved through the Members API; party is matched against the
    /// expanded asking member of each result.
    pub async fn search(&self, args: &QuestionSearchArgs) -> ParliamentResult<Value> {
        let mut asking_member = args.member_id;
        if asking_member.is_none() {
            if let Some(name) = &args.member_name {
                asking_member = self.client.members().resolve_id(name).await?;
                if asking_member.is_none() {
                    tracing::debug!(member_name = %name, "No member matched, searching all askers");
                }
            }
        }

        let mut query: Query = vec![("expandMember", "true".to_string())];
        push_opt(&mut query, "searchTerm", args.query.as_deref());
        push_opt(&mut query, "tabledWhenFrom", args.date_from.as_deref());
        push_opt(&mut query, "tabledWhenTo", args.date_to.as_deref());
        push_opt(&mut query, "askingMemberId", asking_member);
        query.push(("take", bounded_take(args.take, DEFAULT_TAKE, MAX_TAKE).to_string()));

        let mut response: Value = self
            .client
            .http
            .get_with_query(
                &self.client.config().questions_url,
                "writtenquestions/questions",
                &query,
            )
            .await?;

        if let Some(party) = &args.party {
            retain_party(&mut response, party);
        }
        Ok(response)
    }
}

fn retain_party(response: &mut Value, party: &str) {
    let wanted = party.to_lowercase();
    if let Some(results) = response.get_mut("results").and_then(Value::as_array_mut) {
        results.retain(|question| {
            question["value"]["askingMember"]["party"]
                .as_str()
                .map(|p| p.to_lowercase().contains(&wanted))
                .unwrap_or(false)
        });
    }
}
