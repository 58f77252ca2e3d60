//! Constituency and election result endpoints of the Members API.

use super::{bounded_take, lenient, push_opt, Query};
use crate::client::ParliamentClient;
use crate::error::{ParliamentError, ParliamentResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_TAKE: u32 = 5;
const MAX_TAKE: u32 = 20;

/// Arguments of `search_constituency`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstituencySearchArgs {
    #[serde(rename = "searchText", default, deserialize_with = "lenient::opt_string")]
    pub search_text: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub constituency_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub skip: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub take: Option<u32>,
}

/// Arguments of `get_election_results`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectionResultsArgs {
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub constituency_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub election_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub member_id: Option<u64>,
}

pub struct ConstituenciesApi<'a> {
    client: &'a ParliamentClient,
}

impl<'a> ConstituenciesApi<'a> {
    pub(crate) fn new(client: &'a ParliamentClient) -> Self {
        Self { client }
    }

    /// Look a constituency up by ID, or search constituencies by name.
    ///
    /// An ID wins over search text when both are given.
    pub async fn search(&self, args: &ConstituencySearchArgs) -> ParliamentResult<Value> {
        let base = &self.client.config().members_url;

        if let Some(id) = args.constituency_id {
            return self
                .client
                .http
                .get(base, &format!("Location/Constituency/{}", id))
                .await;
        }

        let search_text = args.search_text.as_deref().ok_or_else(|| {
            ParliamentError::InvalidInput("searchText or constituency_id is required".to_string())
        })?;

        let mut query: Query = vec![("searchText", search_text.to_string())];
        push_opt(&mut query, "skip", args.skip);
        query.push(("take", bounded_take(args.take, DEFAULT_TAKE, MAX_TAKE).to_string()));

        self.client
            .http
            .get_with_query(base, "Location/Constituency/Search", &query)
            .await
    }

    /// Election results for a constituency (all, or one election), or the
    /// latest result of a member.
    pub async fn election_results(&self, args: &ElectionResultsArgs) -> ParliamentResult<Value> {
        let base = &self.client.config().members_url;

        let path = match (args.constituency_id, args.election_id, args.member_id) {
            (Some(constituency), Some(election), _) => format!(
                "Location/Constituency/{}/ElectionResult/{}",
                constituency, election
            ),
            (Some(constituency), None, _) => {
                format!("Location/Constituency/{}/ElectionResults", constituency)
            }
            (None, _, Some(member)) => format!("Members/{}/LatestElectionResult", member),
            (None, _, None) => {
                return Err(ParliamentError::InvalidInput(
                    "constituency_id or member_id is required".to_string(),
                ))
            }
        };

        self.client.http.get(base, &path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::client_for;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_search_by_text_caps_take() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Location/Constituency/Search"))
            .and(query_param("searchText", "Birmingham"))
            .and(query_param("take", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"value": {"id": 3910, "name": "Birmingham, Edgbaston"}}],
                "totalResults": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let args = ConstituencySearchArgs {
            search_text: Some("Birmingham".into()),
            take: Some(100),
            ..Default::default()
        };
        let result = client.constituencies().search(&args).await.unwrap();
        assert_eq!(result["items"][0]["value"]["id"], 3910);
    }

    #[tokio::test]
    async fn test_search_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Location/Constituency/4359"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": {"id": 4359, "name": "Harrow East"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let args = ConstituencySearchArgs {
            constituency_id: Some(4359),
            search_text: Some("ignored".into()),
            ..Default::default()
        };
        let result = client.constituencies().search(&args).await.unwrap();
        assert_eq!(result["value"]["name"], "Harrow East");
    }

    #[tokio::test]
    async fn test_search_requires_text_or_id() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let err = client
            .constituencies()
            .search(&ConstituencySearchArgs::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ParliamentError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_election_result_routes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Location/Constituency/4359/ElectionResult/397"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": {"electionId": 397}})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/Members/4514/LatestElectionResult"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": {"result": "Lab Hold"}})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let one = client
            .constituencies()
            .election_results(&ElectionResultsArgs {
                constituency_id: Some(4359),
                election_id: Some(397),
                member_id: None,
            })
            .await
            .unwrap();
        assert_eq!(one["value"]["electionId"], 397);

        let latest = client
            .constituencies()
            .election_results(&ElectionResultsArgs {
                member_id: Some(4514),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(latest["value"]["result"], "Lab Hold");

        assert!(client
            .constituencies()
            .election_results(&ElectionResultsArgs::default())
            .await
            .is_err());
    }
}
