//! Member search and member profile endpoints of the Members API.

use super::{bounded_take, house_number, lenient, push_opt, Query};
use crate::client::ParliamentClient;
use crate::error::{ParliamentError, ParliamentResult};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const DEFAULT_TAKE: u32 = 20;
const MAX_TAKE: u32 = 20;

/// Arguments of `search_members`. Field names follow the Members API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberSearchArgs {
    #[serde(rename = "Name", default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(rename = "PartyId", default, deserialize_with = "lenient::opt_u64")]
    pub party_id: Option<u64>,
    #[serde(rename = "House", default, deserialize_with = "lenient::opt_string")]
    pub house: Option<String>,
    #[serde(rename = "ConstituencyId", default, deserialize_with = "lenient::opt_u64")]
    pub constituency_id: Option<u64>,
    #[serde(rename = "Gender", default, deserialize_with = "lenient::opt_string")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub member_since: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub member_until: Option<String>,
    #[serde(rename = "IsCurrentMember", default, deserialize_with = "lenient::opt_bool")]
    pub is_current_member: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub skip: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub take: Option<u32>,
}

/// Arguments of `get_detailed_member_information`.
///
/// Synopsis, biography and contact details are included unless switched
/// off; registered interests and the voting record are opt-in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberDetailArgs {
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub member_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub include_synopsis: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub include_biography: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub include_contact: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub include_registered_interests: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub include_voting_record: Option<bool>,
}

impl MemberDetailArgs {
    pub fn for_member(member_id: u64) -> Self {
        Self {
            member_id: Some(member_id),
            ..Default::default()
        }
    }

    /// Profile sections to fetch, as `(response key, endpoint suffix)`
    fn sections(&self) -> Vec<(&'static str, &'static str)> {
        let mut sections = Vec::new();
        if self.include_synopsis.unwrap_or(true) {
            sections.push(("synopsis", "Synopsis"));
        }
        if self.include_biography.unwrap_or(true) {
            sections.push(("biography", "Biography"));
        }
        if self.include_contact.unwrap_or(true) {
            sections.push(("contact", "Contact"));
        }
        if self.include_registered_interests.unwrap_or(false) {
            sections.push(("registered_interests", "RegisteredInterests"));
        }
        sections
    }
}

pub struct MembersApi<'a> {
    client: &'a ParliamentClient,
}

impl<'a> MembersApi<'a> {
    pub(crate) fn new(client: &'a ParliamentClient) -> Self {
        Self { client }
    }

    pub async fn search(&self, args: &MemberSearchArgs) -> ParliamentResult<Value> {
        let mut query: Query = Vec::new();
        push_opt(&mut query, "Name", args.name.as_deref());
        push_opt(&mut query, "PartyId", args.party_id);
        if let Some(house) = &args.house {
            query.push(("House", house_number(house)?.to_string()));
        }
        push_opt(&mut query, "ConstituencyId", args.constituency_id);
        push_opt(&mut query, "Gender", args.gender.as_deref());
        push_opt(&mut query, "MembershipStartedSince", args.member_since.as_deref());
        push_opt(&mut query, "MembershipEndedSince", args.member_until.as_deref());
        push_opt(&mut query, "IsCurrentMember", args.is_current_member);
        push_opt(&mut query, "skip", args.skip);
        query.push(("take", bounded_take(args.take, DEFAULT_TAKE, MAX_TAKE).to_string()));

        self.client
            .http
            .get_with_query(&self.client.config().members_url, "Members/Search", &query)
            .await
    }

    /// Member ID of the first search hit for `name`, if any
    pub async fn resolve_id(&self, name: &str) -> ParliamentResult<Option<u64>> {
        let args = MemberSearchArgs {
            name: Some(name.to_string()),
            take: Some(1),
            ..Default::default()
        };
        let found = self.search(&args).await?;
        Ok(found["items"][0]["value"]["id"].as_u64())
    }

    /// Member profile plus the requested sections.
    ///
    /// The base record must load; a failing section is reported in place as
    /// `{"error": ...}` so one missing biography does not hide the rest.
    pub async fn detailed(&self, args: &MemberDetailArgs) -> ParliamentResult<Value> {
        let member_id = args
            .member_id
            .ok_or_else(|| ParliamentError::InvalidInput("member_id is required".to_string()))?;
        let base = &self.client.config().members_url;
        let http = &self.client.http;

        let member: Value = http.get(base, &format!("Members/{}", member_id)).await?;

        let sections = args.sections();
        let paths: Vec<String> = sections
            .iter()
            .map(|(_, suffix)| format!("Members/{}/{}", member_id, suffix))
            .collect();
        let fetched = join_all(paths.iter().map(|path| http.get::<Value>(base, path))).await;

        let mut profile = Map::new();
        for ((key, _), result) in sections.iter().zip(fetched) {
            profile.insert(key.to_string(), section_or_error(key, result));
        }

        if args.include_voting_record.unwrap_or(false) {
            let house = member["value"]["latestHouseMembership"]["house"]
                .as_u64()
                .unwrap_or(1);
            let voting = http
                .get_with_query::<Value>(
                    base,
                    &format!("Members/{}/Voting", member_id),
                    &[("house", house.to_string())],
                )
                .await;
            profile.insert("voting_record".to_string(), section_or_error("voting_record", voting));
        }

        profile.insert("member".to_string(), member);
        Ok(Value::Object(profile))
    }
}

fn section_or_error(section: &str, result: ParliamentResult<Value>) -> Value {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(section = section, error = %e, "Member profile section unavailable");
            json!({ "error": e.to_string() })
        }
    }
}
