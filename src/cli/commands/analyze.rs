//! Analyze command implementation.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use insight_config::AppConfig;
use insight_core::traits::SeriesRequest;
use insight_data::{
    CsvDataSource, LoadOutcome, Priority, QuoteApiSource, RequestQueue, SeriesLoader,
    SyntheticSource,
};
use insight_signals::TechnicalAnalyzer;
use tracing::{info, warn};

use crate::cli::{AnalyzeArgs, OutputFormat};

pub async fn run(args: AnalyzeArgs, config: &AppConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let output_size = args.bars.unwrap_or(config.data.output_size);
    if output_size == 0 {
        bail!("--bars must be positive");
    }
    let request = SeriesRequest::new(args.symbol.to_uppercase(), args.timeframe, output_size);
    info!(symbol = %request.symbol, timeframe = %request.timeframe, bars = output_size, "Starting analysis");

    let fallback = SyntheticSource::new(config.data.synthetic.to_synthetic());
    let mut queue: Option<Arc<RequestQueue>> = None;

    let loader = if args.synthetic {
        SeriesLoader::synthetic_only(fallback)
    } else if let Some(path) = &args.data {
        let source = CsvDataSource::new(path)
            .with_context(|| format!("Data file '{}' does not exist", path.display()))?;
        SeriesLoader::new(Arc::new(source), fallback)
    } else {
        match config.data.quote_api() {
            Ok(api) => {
                let shared = Arc::new(RequestQueue::new(config.data.rate_limit.to_rate_limit()));
                let source = QuoteApiSource::new(api, Arc::clone(&shared))?
                    .with_priority(Priority::High);
                queue = Some(shared);
                SeriesLoader::new(Arc::new(source), fallback)
            }
            Err(e) => {
                warn!(error = %e, "Quote API unavailable, using synthetic series");
                SeriesLoader::synthetic_only(fallback)
            }
        }
    };

    let outcome = loader.load(&request).await;
    if let Some(queue) = &queue {
        queue.shutdown();
    }
    let series = match outcome.context("Failed to load bars")? {
        LoadOutcome::Loaded(series) => series,
        LoadOutcome::Superseded { symbol, .. } => bail!("Load of {} was superseded", symbol),
    };

    let analyzer = TechnicalAnalyzer::new(config.analysis.to_settings())?;
    let report = analyzer.analyze(&series)?;

    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.render_text()),
    }

    if let Some(save_path) = &args.save {
        let json = report.to_json()?;
        std::fs::write(save_path, json)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!("Report saved to {:?}", save_path);
    }

    Ok(())
}
