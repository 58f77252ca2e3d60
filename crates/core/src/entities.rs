//! Named-entity extraction backed by a small static gazetteer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Category of a recognised entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Place,
    Person,
    Party,
    Topic,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub kind: EntityKind,
}

struct GazetteerEntry {
    canonical: &'static str,
    kind: EntityKind,
    /// Lowercase spellings matched on word boundaries
    aliases: &'static [&'static str],
}

const fn place(canonical: &'static str, aliases: &'static [&'static str]) -> GazetteerEntry {
    GazetteerEntry {
        canonical,
        kind: EntityKind::Place,
        aliases,
    }
}

const fn person(canonical: &'static str, aliases: &'static [&'static str]) -> GazetteerEntry {
    GazetteerEntry {
        canonical,
        kind: EntityKind::Person,
        aliases,
    }
}

const fn party(canonical: &'static str, aliases: &'static [&'static str]) -> GazetteerEntry {
    GazetteerEntry {
        canonical,
        kind: EntityKind::Party,
        aliases,
    }
}

const fn topic(canonical: &'static str, aliases: &'static [&'static str]) -> GazetteerEntry {
    GazetteerEntry {
        canonical,
        kind: EntityKind::Topic,
        aliases,
    }
}

static GAZETTEER: &[GazetteerEntry] = &[
    place("Birmingham", &["birmingham"]),
    place("Manchester Central", &["manchester central"]),
    place("Manchester", &["manchester"]),
    place("Cities of London and Westminster", &["cities of london and westminster"]),
    place("Holborn and St Pancras", &["holborn and st pancras"]),
    place("Uxbridge and South Ruislip", &["uxbridge and south ruislip"]),
    place("Islington North", &["islington north"]),
    place("Harrow", &["harrow"]),
    place("London", &["london"]),
    place("Westminster", &["westminster"]),
    place("Leeds", &["leeds"]),
    place("Liverpool", &["liverpool"]),
    place("Sheffield", &["sheffield"]),
    place("Bristol", &["bristol"]),
    place("Newcastle", &["newcastle"]),
    place("Glasgow", &["glasgow"]),
    place("Edinburgh", &["edinburgh"]),
    place("Cardiff", &["cardiff"]),
    place("Belfast", &["belfast"]),
    person("Keir Starmer", &["keir starmer", "starmer"]),
    person("Rishi Sunak", &["rishi sunak", "sunak"]),
    person("Boris Johnson", &["boris johnson"]),
    person("Theresa May", &["theresa may"]),
    person("Kemi Badenoch", &["kemi badenoch", "badenoch"]),
    person("Angela Rayner", &["angela rayner", "rayner"]),
    person("Rachel Reeves", &["rachel reeves"]),
    person("Jeremy Corbyn", &["jeremy corbyn", "corbyn"]),
    person("Ed Davey", &["ed davey"]),
    person("Tim Eggar", &["tim eggar", "eggar"]),
    party("Labour", &["labour"]),
    party("Conservative", &["conservative", "conservatives", "tory", "tories"]),
    party("Liberal Democrat", &["liberal democrat", "liberal democrats", "lib dem", "lib dems"]),
    party("Scottish National Party", &["scottish national party", "snp"]),
    party("Green Party", &["green party", "greens"]),
    party("Reform UK", &["reform uk"]),
    party("Plaid Cymru", &["plaid cymru"]),
    topic("NHS", &["nhs", "national health service"]),
    topic("climate change", &["climate change", "climate"]),
    topic("Brexit", &["brexit"]),
    topic("economic policy", &["economic policy"]),
    topic("economy", &["economy"]),
    topic("housing policy", &["housing policy"]),
    topic("housing", &["housing"]),
    topic("immigration", &["immigration"]),
    topic("education", &["education", "schools"]),
    topic("defence", &["defence", "defense"]),
    topic("energy", &["energy"]),
    topic("cost of living", &["cost of living"]),
];

fn year_pattern() -> &'static Regex {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid regex"))
}

/// Lowercase `text` and collapse every non-alphanumeric run into one space,
/// padding both ends so phrases can be matched as ` phrase `.
pub(crate) fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    let mut last_space = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    if !last_space {
        out.push(' ');
    }
    out
}

/// Extract gazetteer entities and years from `query`, in order of first
/// appearance. Overlapping matches keep the longest phrase.
pub fn extract(query: &str) -> Vec<Entity> {
    let normalized = normalize(query);

    // (start, end, text, kind)
    let mut spans: Vec<(usize, usize, String, EntityKind)> = Vec::new();

    for entry in GAZETTEER {
        let first = entry
            .aliases
            .iter()
            .filter_map(|alias| {
                let needle = format!(" {} ", alias);
                normalized
                    .find(&needle)
                    .map(|pos| (pos + 1, pos + 1 + alias.len()))
            })
            .min_by_key(|(start, end)| (*start, std::cmp::Reverse(*end)));

        if let Some((start, end)) = first {
            spans.push((start, end, entry.canonical.to_string(), entry.kind));
        }
    }

    for m in year_pattern().find_iter(&normalized) {
        spans.push((m.start(), m.end(), m.as_str().to_string(), EntityKind::Date));
    }

    spans.sort_by_key(|(start, end, _, _)| (*start, std::cmp::Reverse(*end)));

    let mut entities: Vec<Entity> = Vec::new();
    let mut covered_until = 0;
    for (start, end, text, kind) in spans {
        if start < covered_until {
            continue;
        }
        covered_until = end;
        if !entities.iter().any(|e| e.text == text) {
            entities.push(Entity { text, kind });
        }
    }

    entities
}

/// Category of an entity string produced by any extractor, if recognised
pub fn classify(entity: &str) -> Option<EntityKind> {
    let normalized = normalize(entity);
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }

    let known = GAZETTEER.iter().find(|entry| {
        entry.canonical.eq_ignore_ascii_case(trimmed) || entry.aliases.contains(&trimmed)
    });
    if let Some(entry) = known {
        return Some(entry.kind);
    }

    let year = year_pattern();
    year.find(trimmed)
        .filter(|m| m.start() == 0 && m.end() == trimmed.len())
        .map(|_| EntityKind::Date)
}

/// First four-digit year mentioned in `query`
pub fn first_year(query: &str) -> Option<String> {
    year_pattern()
        .find(query)
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn test_extract_place() {
        let entities = extract("Find Birmingham constituency information");
        assert_eq!(texts(&entities), vec!["Birmingham"]);
        assert_eq!(entities[0].kind, EntityKind::Place);
    }

    #[test]
    fn test_longest_phrase_wins() {
        let entities = extract("Who is the MP for Manchester Central?");
        assert_eq!(texts(&entities), vec!["Manchester Central"]);
    }

    #[test]
    fn test_order_of_appearance_with_years() {
        let entities = extract("What has Boris Johnson said about Brexit in parliament since 2020?");
        assert_eq!(texts(&entities), vec!["Boris Johnson", "Brexit", "2020"]);
        assert_eq!(entities[2].kind, EntityKind::Date);
    }

    #[test]
    fn test_aliases_map_to_canonical() {
        let entities = extract("tories and the national health service");
        assert_eq!(texts(&entities), vec!["Conservative", "NHS"]);
    }

    #[test]
    fn test_no_partial_word_matches() {
        assert!(extract("leedsville harrowing").is_empty());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("birmingham"), Some(EntityKind::Place));
        assert_eq!(classify("Keir Starmer"), Some(EntityKind::Person));
        assert_eq!(classify("Labour"), Some(EntityKind::Party));
        assert_eq!(classify("NHS"), Some(EntityKind::Topic));
        assert_eq!(classify("2019"), Some(EntityKind::Date));
        assert_eq!(classify("asdfgh"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_first_year() {
        assert_eq!(first_year("results in 2019 and 2024"), Some("2019".to_string()));
        assert_eq!(first_year("no dates here"), None);
    }
}
