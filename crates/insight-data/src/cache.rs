//! Session cache of loaded series.

use std::collections::HashMap;

use insight_core::traits::SeriesRequest;
use insight_core::types::BarSeries;

/// In-memory cache keyed by symbol and timeframe.
///
/// Owned by the loader for the lifetime of a session; dropping the loader
/// drops the cache.
#[derive(Debug, Default)]
pub struct DataCache {
    cache: HashMap<String, BarSeries>,
}

impl DataCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached series holding at least the requested number of bars.
    pub fn get(&self, request: &SeriesRequest) -> Option<&BarSeries> {
        self.cache
            .get(&request.cache_key())
            .filter(|series| series.len() >= request.output_size)
    }

    /// Store a series, replacing any previous entry for the same key.
    pub fn put(&mut self, request: &SeriesRequest, series: BarSeries) {
        self.cache.insert(request.cache_key(), series);
    }

    /// Clear every timeframe cached for a symbol.
    pub fn clear(&mut self, symbol: &str) {
        let prefix = format!("{}_", symbol.to_uppercase());
        self.cache.retain(|k, _| !k.starts_with(&prefix));
    }

    /// Clear all cached data.
    pub fn clear_all(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::types::{Bar, Timeframe};

    fn series(symbol: &str, timeframe: Timeframe, n: usize) -> BarSeries {
        let bars = (0..n)
            .map(|i| Bar::new(i as i64 * 1_000, 10.0, 11.0, 9.0, 10.5, 100.0))
            .collect();
        BarSeries::new(symbol, timeframe, bars)
    }

    #[test]
    fn test_get_requires_enough_bars() {
        let mut cache = DataCache::new();
        let request = SeriesRequest::new("ACME", Timeframe::Daily, 50);
        cache.put(&request, series("ACME", Timeframe::Daily, 60));

        assert!(cache.get(&request).is_some());
        let larger = SeriesRequest::new("acme", Timeframe::Daily, 100);
        assert!(cache.get(&larger).is_none());
    }

    #[test]
    fn test_clear_symbol_keeps_others() {
        let mut cache = DataCache::new();
        cache.put(
            &SeriesRequest::new("AB", Timeframe::Daily, 1),
            series("AB", Timeframe::Daily, 1),
        );
        cache.put(
            &SeriesRequest::new("AB", Timeframe::Weekly, 1),
            series("AB", Timeframe::Weekly, 1),
        );
        cache.put(
            &SeriesRequest::new("ABC", Timeframe::Daily, 1),
            series("ABC", Timeframe::Daily, 1),
        );

        cache.clear("ab");
        assert_eq!(cache.len(), 1);

        cache.clear_all();
        assert!(cache.is_empty());
    }
}
