//! Endpoint groups of the Parliament APIs.
//!
//! Each accessor borrows the client and exposes one method per downstream
//! tool, taking a typed argument struct that deserializes from the tool's
//! registry parameters.

pub mod constituencies;
pub mod hansard;
pub mod members;
pub mod questions;
pub mod reference;

pub use constituencies::{ConstituenciesApi, ConstituencySearchArgs, ElectionResultsArgs};
pub use hansard::{ContributionSearchArgs, DebateSearchArgs, HansardApi};
pub use members::{MemberDetailArgs, MemberSearchArgs, MembersApi};
pub use questions::{QuestionSearchArgs, QuestionsApi};
pub use reference::{ReferenceApi, StateOfThePartiesArgs};

use crate::error::{ParliamentError, ParliamentResult};

/// Query string pairs for a GET request
pub(crate) type Query = Vec<(&'static str, String)>;

pub(crate) fn push_opt<T: ToString>(query: &mut Query, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        query.push((key, value.to_string()));
    }
}

/// Members API house identifier: 1 for the Commons, 2 for the Lords.
pub(crate) fn house_number(house: &str) -> ParliamentResult<u8> {
    match house.trim().to_ascii_lowercase().as_str() {
        "commons" | "house of commons" | "1" => Ok(1),
        "lords" | "house of lords" | "2" => Ok(2),
        other => Err(ParliamentError::InvalidInput(format!(
            "house must be Commons or Lords, got '{other}'"
        ))),
    }
}

/// Canonical house name as Hansard expects it.
pub(crate) fn house_name(house: &str) -> ParliamentResult<&'static str> {
    Ok(match house_number(house)? {
        1 => "Commons",
        _ => "Lords",
    })
}

pub(crate) fn bounded_take(take: Option<u32>, default: u32, max: u32) -> u32 {
    take.unwrap_or(default).clamp(1, max)
}

/// Deserializers that accept numbers and booleans sent as strings.
///
/// Parameters suggested by a language model frequently arrive as `"4359"` or
/// `"true"`.
pub(crate) mod lenient {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;
    use serde_json::Value;
    use std::str::FromStr;

    fn parse<T: FromStr, E: de::Error>(value: Value) -> Result<Option<T>, E> {
        match value {
            Value::Null => Ok(None),
            Value::String(raw) if raw.trim().is_empty() => Ok(None),
            Value::String(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| E::custom(format!("cannot parse '{raw}'"))),
            Value::Number(n) => n
                .to_string()
                .parse()
                .map(Some)
                .map_err(|_| E::custom(format!("number {n} out of range"))),
            Value::Bool(b) => b
                .to_string()
                .parse()
                .map(Some)
                .map_err(|_| E::custom(format!("unexpected boolean {b}"))),
            other => Err(E::custom(format!("unexpected value {other}"))),
        }
    }

    pub fn opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        parse(Value::deserialize(d)?)
    }

    pub fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        parse(Value::deserialize(d)?)
    }

    pub fn opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        parse(Value::deserialize(d)?)
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() || s == "null" => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }
}
