//! Parties, posts and departments reference data of the Members API.

use super::{house_number, lenient};
use crate::client::ParliamentClient;
use crate::error::ParliamentResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments of `get_state_of_the_parties`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateOfThePartiesArgs {
    /// Defaults to the Commons
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub house: Option<String>,
    /// `YYYY-MM-DD`, defaults to today
    #[serde(rename = "forDate", default, deserialize_with = "lenient::opt_string")]
    pub for_date: Option<String>,
}

pub struct ReferenceApi<'a> {
    client: &'a ParliamentClient,
}

impl<'a> ReferenceApi<'a> {
    pub(crate) fn new(client: &'a ParliamentClient) -> Self {
        Self { client }
    }

    async fn members_get(&self, path: &str) -> ParliamentResult<Value> {
        self.client
            .http
            .get(&self.client.config().members_url, path)
            .await
    }

    pub async fn state_of_the_parties(&self, args: &StateOfThePartiesArgs) -> ParliamentResult<Value> {
        let house = house_number(args.house.as_deref().unwrap_or("Commons"))?;
        let date = args
            .for_date
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string());

        self.client
            .http
            .get(
                &self.client.config().members_url,
                &format!("Parties/StateOfTheParties/{}/{}", house, date),
            )
            .await
    }

    pub async fn government_posts(&self) -> ParliamentResult<Value> {
        self.members_get("Posts/GovernmentPosts").await
    }

    pub async fn opposition_posts(&self) -> ParliamentResult<Value> {
        self.members_get("Posts/OppositionPosts").await
    }

    pub async fn departments(&self) -> ParliamentResult<Value> {
        self.members_get("Reference/Departments").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::client_for;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_state_of_the_parties_for_lords() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Parties/StateOfTheParties/2/2024-07-05"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [{"value": {}}]})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let args = StateOfThePartiesArgs {
            house: Some("Lords".into()),
            for_date: Some("2024-07-05".into()),
        };
        client.reference().state_of_the_parties(&args).await.unwrap();
    }

    #[tokio::test]
    async fn test_posts_and_departments() {
        let server = MockServer::start().await;
        for endpoint in [
            "/api/Posts/GovernmentPosts",
            "/api/Posts/OppositionPosts",
            "/api/Reference/Departments",
        ] {
            Mock::given(method("GET"))
                .and(path(endpoint))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"value": {"id": 1}}])))
                .expect(1)
                .mount(&server)
                .await;
        }

        let client = client_for(&server);
        let reference = client.reference();
        assert!(reference.government_posts().await.unwrap().is_array());
        assert!(reference.opposition_posts().await.unwrap().is_array());
        assert!(reference.departments().await.unwrap().is_array());
    }
}
