// Standalone MCP server binary

use anyhow::{Context, Result};
use parliament_core::ToolExecutor;
use parliament_mcp::tools::{geography, intelligence, parliament, StaticGeography, ToolRegistry};
use parliament_mcp::{McpConfig, McpServer};
use parliament_sdk::ParliamentClient;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parliament=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();

    tracing::info!("Parliament MCP Server starting...");

    let config_path = std::env::var("PARLIAMENT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("parliament.toml"));
    let config = McpConfig::load(&config_path)?;

    let client: Arc<dyn ToolExecutor> = Arc::new(
        ParliamentClient::from_config(config.apis.clone())
            .context("Failed to create Parliament API client")?,
    );
    let pipeline = Arc::new(config.pipeline.build(Some(client.clone()))?);

    let mut registry = ToolRegistry::new();
    parliament::register_all(&mut registry, client);
    intelligence::register_all(&mut registry, pipeline);
    geography::register_all(&mut registry, Arc::new(StaticGeography::new()));

    tracing::info!("Registered {} tools", registry.len());

    let server = McpServer::new(registry);
    server.start().await?;

    Ok(())
}
