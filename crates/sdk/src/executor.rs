use crate::api::{
    ConstituencySearchArgs, ContributionSearchArgs, DebateSearchArgs, ElectionResultsArgs,
    MemberDetailArgs, MemberSearchArgs, QuestionSearchArgs, StateOfThePartiesArgs,
};
use crate::client::ParliamentClient;
use crate::error::{ParliamentError, ParliamentResult};
use async_trait::async_trait;
use parliament_core::{Params, ToolExecutor, ToolName};
use serde::de::DeserializeOwned;
use serde_json::Value;

impl ParliamentClient {
    /// Run one registry tool with its raw parameters.
    pub async fn call(&self, tool: ToolName, params: &Params) -> ParliamentResult<Value> {
        tracing::debug!(tool = tool.as_str(), params = params.len(), "Calling Parliament tool");

        match tool {
            ToolName::SearchConstituency => {
                self.constituencies()
                    .search(&args::<ConstituencySearchArgs>(tool, params)?)
                    .await
            }
            ToolName::GetElectionResults => {
                self.constituencies()
                    .election_results(&args::<ElectionResultsArgs>(tool, params)?)
                    .await
            }
            ToolName::SearchMembers => {
                self.members()
                    .search(&args::<MemberSearchArgs>(tool, params)?)
                    .await
            }
            ToolName::GetDetailedMemberInformation => {
                self.members()
                    .detailed(&args::<MemberDetailArgs>(tool, params)?)
                    .await
            }
            ToolName::SearchParliamentaryQuestions => {
                self.questions()
                    .search(&args::<QuestionSearchArgs>(tool, params)?)
                    .await
            }
            ToolName::SearchDebates => {
                self.hansard()
                    .debates(&args::<DebateSearchArgs>(tool, params)?)
                    .await
            }
            ToolName::SearchContributions => {
                self.hansard()
                    .contributions(&args::<ContributionSearchArgs>(tool, params)?)
                    .await
            }
            ToolName::GetStateOfTheParties => {
                self.reference()
                    .state_of_the_parties(&args::<StateOfThePartiesArgs>(tool, params)?)
                    .await
            }
            ToolName::GetGovernmentPosts => self.reference().government_posts().await,
            ToolName::GetOppositionPosts => self.reference().opposition_posts().await,
            ToolName::GetDepartments => self.reference().departments().await,
        }
    }
}

fn args<T: DeserializeOwned>(tool: ToolName, params: &Params) -> ParliamentResult<T> {
    serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| ParliamentError::InvalidInput(format!("{}: {}", tool.as_str(), e)))
}

#[async_trait]
impl ToolExecutor for ParliamentClient {
    async fn execute(&self, tool: ToolName, params: &Params) -> anyhow::Result<Value> {
        Ok(self.call(tool, params).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::client_for;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("params must be an object"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_through_executor_seam() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/debates.json"))
            .and(query_param("queryParameters.searchTerm", "housing"))
            .and(query_param("queryParameters.startDate", "2024-01-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Results": [{}, {}]})))
            .mount(&server)
            .await;

        let executor: Arc<dyn ToolExecutor> = Arc::new(client_for(&server));
        let result = executor
            .execute(
                ToolName::SearchDebates,
                &params(json!({"query": "housing", "dateFrom": "2024-01-01", "maxResults": 20})),
            )
            .await
            .unwrap();
        assert_eq!(result["Results"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_arguments_are_invalid_input() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let err = client
            .call(
                ToolName::SearchConstituency,
                &params(json!({"constituency_id": "not-a-number"})),
            )
            .await
            .unwrap_err();
        match err {
            ParliamentError::InvalidInput(message) => {
                assert!(message.starts_with("search_constituency"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_downstream_failure_surfaces_as_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Reference/Departments"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .execute(ToolName::GetDepartments, &Params::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
