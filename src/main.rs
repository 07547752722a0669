//! Command line entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use grocery_catalog::application::{CatalogRun, RunMode};
use grocery_catalog::infrastructure::config::ConfigManager;
use grocery_catalog::infrastructure::logging::{init_logging_with_config, log_system_info};

#[derive(Debug, Parser)]
#[command(
    name = "grocery-catalog",
    version,
    about = "Collect a grocery retailer's full product catalog and rank it by discount"
)]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the HTML report and JSON dumps
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search API over the configured price bands (default)
    Bands,
    /// Discover categories, then sweep every category listing
    Categories,
    /// Sweep a single listing page
    Listing {
        #[arg(long, value_name = "URL")]
        url: String,

        /// Label attached to every collected product
        #[arg(long)]
        label: Option<String>,
    },
    /// Write the default configuration as JSON and exit
    InitConfig {
        #[arg(value_name = "FILE", default_value = "grocery-catalog.json")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mode = match cli.command {
        Some(Command::InitConfig { path }) => {
            return ConfigManager::write_default(&path).await;
        }
        None | Some(Command::Bands) => RunMode::Bands,
        Some(Command::Categories) => RunMode::Categories,
        Some(Command::Listing { url, label }) => RunMode::Listing { url, label },
    };

    let manager = ConfigManager::new(cli.config);
    let mut config = manager.load().context("Failed to load configuration")?;
    if let Some(dir) = cli.output_dir {
        config.output.directory = dir;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging_with_config(&config.logging)?;
    log_system_info();
    if let Some(path) = manager.config_path() {
        tracing::info!("Configuration file: {:?}", path);
    }

    let summary = CatalogRun::new(config)?.execute(&mode).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to serialize run summary")?
    );
    Ok(())
}
