//! Series loading with cache, stale-response guard and synthetic fallback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use insight_core::error::DataError;
use insight_core::traits::{BarSource, SeriesRequest};
use insight_core::types::{BarSeries, SeriesSource};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::DataCache;
use crate::synthetic::SyntheticSource;

/// Result of a load.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The series for the most recent request
    Loaded(BarSeries),
    /// A newer request started before this one resolved; the response was discarded
    Superseded { symbol: String, generation: u64 },
}

impl LoadOutcome {
    pub fn into_series(self) -> Option<BarSeries> {
        match self {
            LoadOutcome::Loaded(series) => Some(series),
            LoadOutcome::Superseded { .. } => None,
        }
    }
}

/// Loads bar series for one session.
///
/// Every call to [`load`](SeriesLoader::load) takes a new generation number;
/// only the response belonging to the latest generation is delivered, and
/// a superseded load reports [`LoadOutcome::Superseded`] even when it failed.
/// Connection, API and empty-response failures of the primary source fall
/// back to a synthetic series marked [`SeriesSource::Synthetic`]. Synthetic
/// series are never cached.
pub struct SeriesLoader {
    primary: Option<Arc<dyn BarSource>>,
    fallback: SyntheticSource,
    cache: Mutex<DataCache>,
    generation: AtomicU64,
}

impl SeriesLoader {
    pub fn new(primary: Arc<dyn BarSource>, fallback: SyntheticSource) -> Self {
        Self {
            primary: Some(primary),
            fallback,
            cache: Mutex::new(DataCache::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Loader that only produces synthetic series.
    pub fn synthetic_only(fallback: SyntheticSource) -> Self {
        Self {
            primary: None,
            fallback,
            cache: Mutex::new(DataCache::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Load a series, superseding every load still in flight.
    pub async fn load(&self, request: &SeriesRequest) -> Result<LoadOutcome, DataError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(hit) = self.cache.lock().await.get(request) {
            debug!(key = %request.cache_key(), "Cache hit");
            let bars = hit.last_n(request.output_size).to_vec();
            let series = BarSeries::new(hit.symbol.clone(), hit.timeframe, bars).with_source(hit.source);
            return Ok(LoadOutcome::Loaded(series));
        }

        let fetched = match &self.primary {
            Some(primary) => match primary.fetch_bars(request).await {
                Ok(bars) => Ok(BarSeries::new(
                    request.symbol.to_uppercase(),
                    request.timeframe,
                    bars,
                )),
                Err(e) if falls_back(&e) => {
                    warn!(
                        symbol = %request.symbol,
                        source = primary.name(),
                        error = %e,
                        "Primary source failed, using synthetic series"
                    );
                    self.synthetic(request).await
                }
                Err(e) => Err(e),
            },
            None => self.synthetic(request).await,
        };

        // A newer load owns the result, whether this one succeeded or failed
        let latest = self.current_generation();
        if latest != generation {
            warn!(
                symbol = %request.symbol,
                generation,
                latest,
                failed = fetched.is_err(),
                "Discarding stale response"
            );
            return Ok(LoadOutcome::Superseded {
                symbol: request.symbol.clone(),
                generation,
            });
        }

        let series = fetched?;
        if series.source == SeriesSource::Live {
            self.cache.lock().await.put(request, series.clone());
        }
        info!(
            symbol = %series.symbol,
            timeframe = %series.timeframe,
            bars = series.len(),
            source = ?series.source,
            "Series loaded"
        );
        Ok(LoadOutcome::Loaded(series))
    }

    /// Drop every cached series.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear_all();
    }

    async fn synthetic(&self, request: &SeriesRequest) -> Result<BarSeries, DataError> {
        let bars = self.fallback.fetch_bars(request).await?;
        Ok(BarSeries::new(request.symbol.to_uppercase(), request.timeframe, bars)
            .with_source(SeriesSource::Synthetic))
    }
}

fn falls_back(err: &DataError) -> bool {
    matches!(
        err,
        DataError::ConnectionError(_) | DataError::ApiError(_) | DataError::NoDataAvailable
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use insight_core::types::{Bar, Timeframe};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Scripted source: fails or sleeps depending on the symbol.
    struct ScriptedSource {
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BarSource for ScriptedSource {
        async fn fetch_bars(&self, request: &SeriesRequest) -> Result<Vec<Bar>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match request.symbol.as_str() {
                "DOWN" => return Err(DataError::ConnectionError("refused".into())),
                "NOPE" => return Err(DataError::SymbolNotFound("NOPE".into())),
                "SLOW" => tokio::time::sleep(Duration::from_millis(100)).await,
                "SLOWFAIL" => {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    return Err(DataError::SymbolNotFound("SLOWFAIL".into()));
                }
                _ => {}
            }
            Ok((0..request.output_size)
                .map(|i| Bar::new(i as i64 * 86_400_000, 10.0, 11.0, 9.0, 10.5, 100.0))
                .collect())
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn loader(source: Arc<ScriptedSource>) -> SeriesLoader {
        SeriesLoader::new(source, SyntheticSource::default())
    }

    #[tokio::test]
    async fn test_live_series_cached() {
        let source = ScriptedSource::new();
        let loader = loader(Arc::clone(&source));
        let request = SeriesRequest::new("ACME", Timeframe::Daily, 30);

        let first = loader.load(&request).await.unwrap().into_series().unwrap();
        let second = loader.load(&request).await.unwrap().into_series().unwrap();

        assert_eq!(first.len(), 30);
        assert_eq!(second.len(), 30);
        assert_eq!(second.source, SeriesSource::Live);
        assert_eq!(source.calls(), 1);

        loader.clear_cache().await;
        loader.load(&request).await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_connection_failure_falls_back_to_synthetic() {
        let source = ScriptedSource::new();
        let loader = loader(Arc::clone(&source));
        let request = SeriesRequest::new("DOWN", Timeframe::Daily, 120);

        let series = loader.load(&request).await.unwrap().into_series().unwrap();
        assert!(series.is_synthetic());
        assert_eq!(series.len(), 120);
        assert!(series.validate().is_ok());

        loader.load(&request).await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_an_error() {
        let loader = loader(ScriptedSource::new());
        let request = SeriesRequest::new("NOPE", Timeframe::Daily, 10);
        assert!(matches!(
            loader.load(&request).await,
            Err(DataError::SymbolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let loader = Arc::new(loader(ScriptedSource::new()));

        let slow = {
            let loader = Arc::clone(&loader);
            tokio::spawn(async move {
                loader
                    .load(&SeriesRequest::new("SLOW", Timeframe::Daily, 10))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let fast = loader
            .load(&SeriesRequest::new("FAST", Timeframe::Daily, 10))
            .await
            .unwrap();
        assert!(matches!(fast, LoadOutcome::Loaded(ref s) if s.symbol == "FAST"));

        let stale = slow.await.unwrap().unwrap();
        assert!(matches!(stale, LoadOutcome::Superseded { ref symbol, generation: 1 } if symbol == "SLOW"));
        assert_eq!(loader.current_generation(), 2);
    }

    #[tokio::test]
    async fn test_stale_failure_is_discarded() {
        let loader = Arc::new(loader(ScriptedSource::new()));

        let failing = {
            let loader = Arc::clone(&loader);
            tokio::spawn(async move {
                loader
                    .load(&SeriesRequest::new("SLOWFAIL", Timeframe::Daily, 10))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let newest = loader
            .load(&SeriesRequest::new("NEW", Timeframe::Daily, 10))
            .await
            .unwrap();
        assert!(matches!(newest, LoadOutcome::Loaded(ref s) if s.symbol == "NEW"));

        let stale = failing.await.unwrap();
        assert!(matches!(
            stale,
            Ok(LoadOutcome::Superseded { ref symbol, generation: 1 }) if symbol == "SLOWFAIL"
        ));
    }

    #[tokio::test]
    async fn test_synthetic_only_loader() {
        let loader = SeriesLoader::synthetic_only(SyntheticSource::default());
        let request = SeriesRequest::new("DEMO", Timeframe::Weekly, 60);
        let series = loader.load(&request).await.unwrap().into_series().unwrap();
        assert!(series.is_synthetic());
        assert_eq!(series.timeframe, Timeframe::Weekly);
    }
}
