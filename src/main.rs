//! Technical analysis CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use insight_config::{load_config_or_default, AppConfig};
use insight_monitor::{setup_logging, LogOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // validate-config reports its own load errors
    let config = match cli.command {
        Commands::ValidateConfig => AppConfig::default(),
        _ => load_config_or_default(Some(&cli.config))
            .with_context(|| format!("Failed to load {}", cli.config.display()))?,
    };

    let options = LogOptions {
        level: cli
            .log_level
            .map(|l| l.as_str().to_string())
            .unwrap_or_else(|| config.logging.level.clone()),
        json: cli.json_logs || config.logging.is_json(),
        directory: config.logging.file.as_ref().map(Into::into),
    };
    let _guard = setup_logging(&options).context("Failed to initialise logging")?;

    match cli.command {
        Commands::Analyze(args) => cli::commands::analyze::run(args, &config).await,
        Commands::Indicators => cli::commands::indicators::run().await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
