//! Finsight CLI - AI-assisted financial transaction analyzer
//!
//! Usage:
//!   finsight analyze FILE        Categorize and print insights
//!   finsight categorize FILE     Print labeled transactions
//!   finsight serve --port 8000   Start the REST API server

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Analyze {
            file,
            no_llm,
            suggestions,
        } => commands::cmd_analyze(&file, no_llm, suggestions).await,
        Commands::Categorize { file, no_llm } => commands::cmd_categorize(&file, no_llm).await,
        Commands::Serve {
            host,
            port,
            origins,
        } => commands::cmd_serve(&host, port, origins).await,
    }
}
