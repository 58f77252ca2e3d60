// Core intelligence pipeline for routing Parliament queries to API tools

pub mod analyzer;
pub mod audit;
pub mod cache;
pub mod config;
pub mod entities;
pub mod error;
pub mod evaluation;
pub mod evaluator;
pub mod executor;
pub mod llm;
pub mod optimizer;
pub mod pipeline;
pub mod recommender;
pub mod registry;
pub mod types;

pub use error::{PipelineError, PipelineResult};
pub use executor::ToolExecutor;
pub use pipeline::IntelligencePipeline;
pub use types::*;
