//! Logging setup.

use std::path::PathBuf;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Subscriber options.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// JSON lines instead of pretty output
    pub json: bool,
    /// Directory for daily-rolling log files
    pub directory: Option<PathBuf>,
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the program.
pub fn setup_logging(options: &LogOptions) -> Result<Option<WorkerGuard>, TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.level));

    let console = if options.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().pretty().boxed()
    };

    let (file, guard) = match &options.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "insight.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;

    if let Some(dir) = &options.directory {
        info!(directory = %dir.display(), "File logging enabled");
    }
    Ok(guard)
}
