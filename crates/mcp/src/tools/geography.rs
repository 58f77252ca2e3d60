// Geography tools: place search, area data and boundaries for UK locations

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_integer, json_schema_object, json_schema_string, Tool, ToolRegistry};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const DEFAULT_PLACE_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Coordinates,
    pub administrative_area: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataDetail {
    #[default]
    Basic,
    Detailed,
    Full,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryType {
    Administrative,
    Electoral,
    Postal,
    #[default]
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministrativeArea {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeographicData {
    pub location: String,
    pub data_type: DataDetail,
    pub coordinates: Coordinates,
    pub administrative_areas: Vec<AdministrativeArea>,
    pub constituency: String,
    /// Postcode districts; only for detailed and full requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode_districts: Option<Vec<String>>,
    pub data_source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministrativeBoundary {
    pub country: String,
    pub region: String,
    pub local_authority: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectoralBoundary {
    pub constituency: String,
    pub region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostalBoundary {
    pub postcode_area: String,
    pub postcode_districts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boundaries {
    pub location: String,
    pub boundary_type: BoundaryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrative: Option<AdministrativeBoundary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electoral: Option<ElectoralBoundary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal: Option<PostalBoundary>,
}

/// Source of geographic reference data.
#[async_trait::async_trait]
pub trait GeographyProvider: Send + Sync {
    async fn search_places(&self, query: &str, limit: usize) -> Result<Vec<Place>>;

    async fn geographic_data(&self, location: &str, detail: DataDetail) -> Result<GeographicData>;

    async fn boundaries(&self, location: &str, boundary_type: BoundaryType) -> Result<Boundaries>;
}

struct Gazetteer {
    name: &'static str,
    kind: &'static str,
    latitude: f64,
    longitude: f64,
    country: &'static str,
    region: &'static str,
    local_authority: &'static str,
    constituency: &'static str,
    postcode_area: &'static str,
    postcode_districts: &'static [&'static str],
}

static GAZETTEER: &[Gazetteer] = &[
    Gazetteer {
        name: "Westminster",
        kind: "city",
        latitude: 51.4975,
        longitude: -0.1357,
        country: "England",
        region: "London",
        local_authority: "City of Westminster",
        constituency: "Cities of London and Westminster",
        postcode_area: "SW",
        postcode_districts: &["SW1A", "SW1P", "SW1H"],
    },
    Gazetteer {
        name: "City of London",
        kind: "city",
        latitude: 51.5155,
        longitude: -0.0922,
        country: "England",
        region: "London",
        local_authority: "City of London",
        constituency: "Cities of London and Westminster",
        postcode_area: "EC",
        postcode_districts: &["EC2V", "EC3V", "EC4M"],
    },
    Gazetteer {
        name: "Hackney",
        kind: "borough",
        latitude: 51.5450,
        longitude: -0.0553,
        country: "England",
        region: "London",
        local_authority: "London Borough of Hackney",
        constituency: "Hackney North and Stoke Newington",
        postcode_area: "N",
        postcode_districts: &["N16", "E5", "E8"],
    },
    Gazetteer {
        name: "Harrow",
        kind: "borough",
        latitude: 51.5806,
        longitude: -0.3420,
        country: "England",
        region: "London",
        local_authority: "London Borough of Harrow",
        constituency: "Harrow East",
        postcode_area: "HA",
        postcode_districts: &["HA1", "HA3", "HA8"],
    },
    Gazetteer {
        name: "Birmingham",
        kind: "city",
        latitude: 52.4862,
        longitude: -1.8904,
        country: "England",
        region: "West Midlands",
        local_authority: "Birmingham City Council",
        constituency: "Birmingham Ladywood",
        postcode_area: "B",
        postcode_districts: &["B1", "B15", "B16"],
    },
    Gazetteer {
        name: "Manchester",
        kind: "city",
        latitude: 53.4808,
        longitude: -2.2426,
        country: "England",
        region: "North West",
        local_authority: "Manchester City Council",
        constituency: "Manchester Central",
        postcode_area: "M",
        postcode_districts: &["M1", "M2", "M4"],
    },
    Gazetteer {
        name: "Leeds",
        kind: "city",
        latitude: 53.8008,
        longitude: -1.5491,
        country: "England",
        region: "Yorkshire and the Humber",
        local_authority: "Leeds City Council",
        constituency: "Leeds Central and Headingley",
        postcode_area: "LS",
        postcode_districts: &["LS1", "LS2", "LS6"],
    },
    Gazetteer {
        name: "Cardiff",
        kind: "city",
        latitude: 51.4816,
        longitude: -3.1791,
        country: "Wales",
        region: "Wales",
        local_authority: "Cardiff Council",
        constituency: "Cardiff South and Penarth",
        postcode_area: "CF",
        postcode_districts: &["CF10", "CF11", "CF24"],
    },
    Gazetteer {
        name: "Edinburgh",
        kind: "city",
        latitude: 55.9533,
        longitude: -3.1883,
        country: "Scotland",
        region: "Scotland",
        local_authority: "City of Edinburgh Council",
        constituency: "Edinburgh East and Musselburgh",
        postcode_area: "EH",
        postcode_districts: &["EH1", "EH2", "EH8"],
    },
    Gazetteer {
        name: "Belfast",
        kind: "city",
        latitude: 54.5973,
        longitude: -5.9301,
        country: "Northern Ireland",
        region: "Northern Ireland",
        local_authority: "Belfast City Council",
        constituency: "Belfast South and Mid Down",
        postcode_area: "BT",
        postcode_districts: &["BT1", "BT7", "BT9"],
    },
];

/// Offline gazetteer of major UK locations.
///
/// Stands in for a live mapping service; a location matches by place name,
/// local authority or constituency, case-insensitively.
#[derive(Debug, Default)]
pub struct StaticGeography;

impl StaticGeography {
    pub fn new() -> Self {
        Self
    }

    fn lookup(location: &str) -> Result<&'static Gazetteer> {
        let wanted = location.trim().to_lowercase();
        if wanted.is_empty() {
            bail!("location must not be empty");
        }
        GAZETTEER
            .iter()
            .find(|g| g.name.to_lowercase() == wanted || g.constituency.to_lowercase() == wanted)
            .or_else(|| GAZETTEER.iter().find(|g| Self::score(g, &wanted) > 0.0))
            .with_context(|| format!("No geographic data for '{}'", location.trim()))
    }

    /// Match strength of `query` (lowercased) against one entry; 0 means no match
    fn score(entry: &Gazetteer, query: &str) -> f64 {
        let name = entry.name.to_lowercase();
        if name == query {
            0.95
        } else if name.contains(query) || query.contains(&name) {
            0.8
        } else if entry.constituency.to_lowercase().contains(query)
            || entry.local_authority.to_lowercase().contains(query)
        {
            0.6
        } else {
            0.0
        }
    }
}

#[async_trait::async_trait]
impl GeographyProvider for StaticGeography {
    async fn search_places(&self, query: &str, limit: usize) -> Result<Vec<Place>> {
        let wanted = query.trim().to_lowercase();
        if wanted.is_empty() {
            bail!("query must not be empty");
        }

        let mut places: Vec<Place> = GAZETTEER
            .iter()
            .map(|g| (g, Self::score(g, &wanted)))
            .filter(|(_, score)| *score > 0.0)
            .map(|(g, score)| Place {
                name: g.name.to_string(),
                kind: g.kind.to_string(),
                coordinates: Coordinates {
                    latitude: g.latitude,
                    longitude: g.longitude,
                },
                administrative_area: g.local_authority.to_string(),
                confidence: score,
            })
            .collect();
        places.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        places.truncate(limit);
        Ok(places)
    }

    async fn geographic_data(&self, location: &str, detail: DataDetail) -> Result<GeographicData> {
        let g = Self::lookup(location)?;
        Ok(GeographicData {
            location: g.name.to_string(),
            data_type: detail,
            coordinates: Coordinates {
                latitude: g.latitude,
                longitude: g.longitude,
            },
            administrative_areas: vec![
                AdministrativeArea {
                    name: g.region.to_string(),
                    kind: "region".to_string(),
                },
                AdministrativeArea {
                    name: g.local_authority.to_string(),
                    kind: "local_authority".to_string(),
                },
            ],
            constituency: g.constituency.to_string(),
            postcode_districts: (detail != DataDetail::Basic)
                .then(|| g.postcode_districts.iter().map(|d| d.to_string()).collect()),
            data_source: "static gazetteer".to_string(),
        })
    }

    async fn boundaries(&self, location: &str, boundary_type: BoundaryType) -> Result<Boundaries> {
        let g = Self::lookup(location)?;
        let wants = |kind: BoundaryType| boundary_type == BoundaryType::All || boundary_type == kind;

        Ok(Boundaries {
            location: g.name.to_string(),
            boundary_type,
            administrative: wants(BoundaryType::Administrative).then(|| AdministrativeBoundary {
                country: g.country.to_string(),
                region: g.region.to_string(),
                local_authority: g.local_authority.to_string(),
            }),
            electoral: wants(BoundaryType::Electoral).then(|| ElectoralBoundary {
                constituency: g.constituency.to_string(),
                region: g.region.to_string(),
            }),
            postal: wants(BoundaryType::Postal).then(|| PostalBoundary {
                postcode_area: g.postcode_area.to_string(),
                postcode_districts: g.postcode_districts.iter().map(|d| d.to_string()).collect(),
            }),
        })
    }
}

/// Register the four geography tools against `provider`
pub fn register_all(registry: &mut ToolRegistry, provider: Arc<dyn GeographyProvider>) {
    registry.register(Arc::new(SearchPlacesTool::new(provider.clone())));
    registry.register(Arc::new(GeographicDataTool::new(provider.clone())));
    registry.register(Arc::new(BoundariesTool::new(provider.clone())));
    registry.register(Arc::new(ConstituencyGeographyTool::new(provider)));
}

/// Wrap a provider outcome in the `{success, data, message}` envelope.
fn envelope<T: Serialize>(outcome: Result<T>, message: String) -> Result<CallToolResult> {
    match outcome {
        Ok(data) => Ok(CallToolResult::json(&json!({
            "success": true,
            "data": data,
            "message": message,
        }))),
        Err(e) => {
            tracing::debug!(error = %e, "Geography lookup failed");
            Ok(CallToolResult::error(e.to_string()))
        }
    }
}

pub struct SearchPlacesTool {
    provider: Arc<dyn GeographyProvider>,
}

impl SearchPlacesTool {
    pub fn new(provider: Arc<dyn GeographyProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Deserialize)]
struct SearchPlacesArgs {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
}

#[async_trait::async_trait]
impl Tool for SearchPlacesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_places".to_string(),
            description: "Search UK settlements and areas by name".to_string(),
            input_schema: json_schema_object(
                json!({
                    "query": json_schema_string("Place name or fragment"),
                    "limit": json_schema_integer("Maximum number of places (default: 10)")
                }),
                vec!["query"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: SearchPlacesArgs =
            serde_json::from_value(arguments).context("Invalid arguments for search_places")?;
        let limit = args.limit.unwrap_or(DEFAULT_PLACE_LIMIT).max(1);

        let places = self.provider.search_places(&args.query, limit).await;
        let message = match &places {
            Ok(found) => format!("Found {} places matching '{}'", found.len(), args.query),
            Err(_) => String::new(),
        };
        envelope(places, message)
    }
}

pub struct GeographicDataTool {
    provider: Arc<dyn GeographyProvider>,
}

impl GeographicDataTool {
    pub fn new(provider: Arc<dyn GeographyProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Deserialize)]
struct GeographicDataArgs {
    location: String,
    #[serde(default)]
    data_type: DataDetail,
}

#[async_trait::async_trait]
impl Tool for GeographicDataTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_geographic_data".to_string(),
            description: "Coordinates, administrative areas and constituency for a UK location".to_string(),
            input_schema: json_schema_object(
                json!({
                    "location": json_schema_string("Location name"),
                    "data_type": {
                        "type": "string",
                        "enum": ["basic", "detailed", "full"],
                        "description": "Level of detail (default: basic)"
                    }
                }),
                vec!["location"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: GeographicDataArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for get_geographic_data")?;

        let data = self.provider.geographic_data(&args.location, args.data_type).await;
        envelope(data, format!("Geographic data retrieved for {}", args.location))
    }
}

pub struct BoundariesTool {
    provider: Arc<dyn GeographyProvider>,
}

impl BoundariesTool {
    pub fn new(provider: Arc<dyn GeographyProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Deserialize)]
struct BoundariesArgs {
    location: String,
    #[serde(default)]
    boundary_type: BoundaryType,
}

#[async_trait::async_trait]
impl Tool for BoundariesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_boundaries".to_string(),
            description: "Administrative, electoral and postal boundaries of a UK location".to_string(),
            input_schema: json_schema_object(
                json!({
                    "location": json_schema_string("Location name"),
                    "boundary_type": {
                        "type": "string",
                        "enum": ["administrative", "electoral", "postal", "all"],
                        "description": "Boundaries to include (default: all)"
                    }
                }),
                vec!["location"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: BoundariesArgs =
            serde_json::from_value(arguments).context("Invalid arguments for get_boundaries")?;

        let boundaries = self.provider.boundaries(&args.location, args.boundary_type).await;
        envelope(boundaries, format!("Boundary information retrieved for {}", args.location))
    }
}

/// Geographic data and electoral boundaries for a constituency in one call.
pub struct ConstituencyGeographyTool {
    provider: Arc<dyn GeographyProvider>,
}

impl ConstituencyGeographyTool {
    pub fn new(provider: Arc<dyn GeographyProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Deserialize)]
struct ConstituencyGeographyArgs {
    constituency_name: String,
}

#[async_trait::async_trait]
impl Tool for ConstituencyGeographyTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "find_constituency_geography".to_string(),
            description: "Geographic data and electoral boundaries for a parliamentary constituency".to_string(),
            input_schema: json_schema_object(
                json!({
                    "constituency_name": json_schema_string("Name of the parliamentary constituency")
                }),
                vec!["constituency_name"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: ConstituencyGeographyArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for find_constituency_geography")?;
        let name = &args.constituency_name;

        let (data, boundaries) = tokio::join!(
            self.provider.geographic_data(name, DataDetail::Detailed),
            self.provider.boundaries(name, BoundaryType::Electoral),
        );
        let combined = data.and_then(|data| {
            boundaries.map(|boundaries| {
                json!({
                    "constituency": name,
                    "geographic_data": data,
                    "boundary_data": boundaries,
                })
            })
        });
        envelope(
            combined,
            format!("Geographic information retrieved for constituency: {}", name),
        )
    }
}
