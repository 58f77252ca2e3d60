pub mod geography;
pub mod intelligence;
pub mod parliament;
mod registry;

pub use geography::{GeographyProvider, StaticGeography};
pub use intelligence::{AnalyzeQueryIntentTool, IntelligentSearchTool, ToolRecommendationsTool};
pub use parliament::ParliamentTool;
pub use registry::{
    json_schema_boolean, json_schema_integer, json_schema_object, json_schema_string, Tool,
    ToolRegistry,
};
