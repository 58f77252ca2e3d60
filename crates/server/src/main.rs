use anyhow::Result;
use clap::{Parser, Subcommand};
use parliament_core::evaluation::EvaluationSuite;
use parliament_core::IntelligencePipeline;
use std::path::PathBuf;
use std::sync::Arc;

mod api;
mod config;

use config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "parliament")]
#[command(about = "Intelligent tool selection for UK Parliament data", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "PARLIAMENT_CONFIG", default_value = "parliament.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides [server].port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides [server].host)
        #[arg(long)]
        host: Option<String>,
    },

    /// Score the rule-based pipeline against the labelled query set
    Evaluate {
        /// Directory for the JSON results and markdown report
        #[arg(short, long, default_value = "evaluation_results")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parliament=info,tower_http=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Serve { port, host } => {
            let mut config = ServerConfig::load(&args.config)?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }

            let addr = config.addr();
            tracing::info!("Starting API server on {}", addr);
            api::serve(&addr, config).await?;
        }
        Command::Evaluate { output_dir } => {
            let suite = EvaluationSuite::new(Arc::new(IntelligencePipeline::rule_based()));
            let report = suite.run().await;
            let summary = &report.summary;

            println!("Queries evaluated:        {}", summary.total_queries);
            println!("Intent accuracy:          {:.1}%", summary.intent_accuracy_percent);
            println!("Entity accuracy:          {:.1}%", summary.entity_accuracy_percent);
            println!("Tool selection accuracy:  {:.1}%", summary.tool_accuracy_percent);
            println!("Quality improvement:      {:.1}%", summary.quality_improvement_percent);

            let (json_path, md_path) = report.write_to(&output_dir).await?;
            println!("Results: {}", json_path.display());
            println!("Report:  {}", md_path.display());
        }
    }

    Ok(())
}
