//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "finsight",
    about = "AI-assisted financial transaction analyzer",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Categorize a transaction file and print insights as JSON
    Analyze {
        /// Path to a CSV or JSON transaction export
        file: PathBuf,

        /// Skip the AI backend; use keyword classification only
        #[arg(long)]
        no_llm: bool,

        /// Also generate improvement suggestions
        #[arg(long)]
        suggestions: bool,
    },

    /// Categorize a transaction file and print the labeled transactions
    Categorize {
        /// Path to a CSV or JSON transaction export
        file: PathBuf,

        /// Skip the AI backend; use keyword classification only
        #[arg(long)]
        no_llm: bool,
    },

    /// Start the REST API server
    Serve {
        /// Interface to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,

        /// Allowed CORS origin (repeatable); none means permissive
        #[arg(long = "origin")]
        origins: Vec<String>,
    },
}
