//! # Parliament SDK
//!
//! Async client for the public UK Parliament APIs (Members, Written
//! Questions and Hansard), and the `ToolExecutor` the intelligence pipeline
//! uses to run its downstream tools.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parliament_sdk::{ParliamentClient, ParliamentResult};
//! use parliament_sdk::api::ConstituencySearchArgs;
//!
//! #[tokio::main]
//! async fn main() -> ParliamentResult<()> {
//!     let client = ParliamentClient::new()?;
//!
//!     let args = ConstituencySearchArgs {
//!         search_text: Some("Birmingham".to_string()),
//!         ..Default::default()
//!     };
//!     let found = client.constituencies().search(&args).await?;
//!     println!("{}", found["totalResults"]);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## As a pipeline executor
//!
//! ```rust,no_run
//! use parliament_core::IntelligencePipeline;
//! use parliament_sdk::ParliamentClient;
//! use std::sync::Arc;
//!
//! # fn example() -> parliament_sdk::ParliamentResult<()> {
//! let pipeline = IntelligencePipeline::builder()
//!     .executor(Arc::new(ParliamentClient::new()?))
//!     .build();
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod transport;

pub use client::{ParliamentClient, ParliamentClientBuilder};
pub use config::{ClientConfig, RetryConfig};
pub use error::{ParliamentError, ParliamentResult};
