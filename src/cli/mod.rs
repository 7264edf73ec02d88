//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use insight_core::types::Timeframe;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "insight")]
#[command(author, version, about = "Technical analysis and horizon recommendations")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (overrides the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a symbol and print the report
    Analyze(AnalyzeArgs),
    /// List the classified indicators
    Indicators,
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Symbol to analyze
    pub symbol: String,

    /// Timeframe (1d, 1w, 1M)
    #[arg(short, long, default_value = "1d")]
    pub timeframe: Timeframe,

    /// Data file (CSV) instead of the quote API
    #[arg(long, conflicts_with = "synthetic")]
    pub data: Option<PathBuf>,

    /// Use a synthetic random-walk series
    #[arg(long)]
    pub synthetic: bool,

    /// Number of bars to load (defaults to data.output_size)
    #[arg(short, long)]
    pub bars: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Save the JSON report to a file
    #[arg(long)]
    pub save: Option<PathBuf>,
}
