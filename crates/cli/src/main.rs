//! Utility Scaler CLI
//!
//! A command-line tool for checking daemon health, inspecting recent
//! scaling decisions, and rendering catalog definitions.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{catalog, decisions, status};

/// Utility Scaler CLI
#[derive(Parser)]
#[command(name = "usc")]
#[command(author, version, about = "CLI for the Utility Scaler", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via USC_API_URL env var)
    #[arg(long, env = "USC_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show daemon health and readiness
    Status,

    /// Show the latest decision per service
    Decisions {
        /// Filter by service name
        #[arg(long, short)]
        service: Option<String>,
    },

    /// Render a catalog definition file
    Catalog {
        /// Path to catalog.json
        #[arg(long, short, default_value = "/etc/utility-scaler/catalog.json")]
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize client
    let client = client::ApiClient::new(&cli.api_url)?;

    // Execute command
    match cli.command {
        Commands::Status => {
            status::show_status(&client, cli.format).await?;
        }
        Commands::Decisions { service } => {
            decisions::show_decisions(&client, service, cli.format).await?;
        }
        Commands::Catalog { file } => {
            catalog::show_catalog(&file, cli.format)?;
        }
    }

    Ok(())
}
