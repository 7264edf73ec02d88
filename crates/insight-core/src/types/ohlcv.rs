//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Timeframe;
use crate::error::DataError;

/// Compact OHLCV bar.
/// Uses f64 throughout for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume (whole shares)
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Calculate the typical price (HLC average).
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Calculate the bar's range (high - low).
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Calculate the bar's body size (absolute difference between open and close).
    #[inline]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Midpoint of the real body.
    #[inline]
    pub fn body_midpoint(&self) -> f64 {
        (self.open + self.close) / 2.0
    }

    /// Distance from the top of the body to the high.
    #[inline]
    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// Distance from the bottom of the body to the low.
    #[inline]
    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// Check if the bar is bullish (close > open).
    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Check if the bar is bearish (close < open).
    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Calculate the true range (used for ATR, ADX and Keltner).
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }

    /// Whether the bar satisfies the OHLC invariants.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check the OHLC invariants.
    pub fn validate(&self) -> Result<(), DataError> {
        let invalid = |reason: &str| DataError::InvalidBar {
            timestamp: self.timestamp,
            reason: reason.to_string(),
        };

        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return Err(invalid("non-finite price"));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(invalid("negative volume"));
        }
        if self.high < self.low {
            return Err(invalid("high below low"));
        }
        if self.high < self.open.max(self.close) {
            return Err(invalid("high below body"));
        }
        if self.low > self.open.min(self.close) {
            return Err(invalid("low above body"));
        }
        Ok(())
    }
}

impl Default for Bar {
    fn default() -> Self {
        Self {
            timestamp: 0,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            volume: 0.0,
        }
    }
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    /// Fetched from a quote API or file
    #[default]
    Live,
    /// Generated random walk standing in for unavailable data
    Synthetic,
}

/// Ordered bar history for one symbol and period.
///
/// The series is immutable once built; a symbol or period change replaces
/// it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarSeries {
    /// Symbol identifier
    pub symbol: String,
    /// Timeframe of the bars
    pub timeframe: Timeframe,
    /// Origin of the bars
    pub source: SeriesSource,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Create a series, sorting bars ascending and dropping duplicate timestamps.
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Self {
            symbol: symbol.into(),
            timeframe,
            source: SeriesSource::Live,
            bars,
        }
    }

    /// Mark the origin of the series.
    pub fn with_source(mut self, source: SeriesSource) -> Self {
        self.source = source;
        self
    }

    /// Whether the bars are a generated stand-in.
    pub fn is_synthetic(&self) -> bool {
        self.source == SeriesSource::Synthetic
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get all bars as a slice.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Get the last N bars.
    pub fn last_n(&self, n: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// Get the first bar.
    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    /// Get the last bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Validate every bar against the OHLC invariants.
    pub fn validate(&self) -> Result<(), DataError> {
        self.bars.iter().try_for_each(Bar::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_calculations() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1000000.0);

        assert!((bar.typical_price() - 103.333333).abs() < 0.001);
        assert!((bar.range() - 15.0).abs() < 0.001);
        assert!((bar.body() - 5.0).abs() < 0.001);
        assert!((bar.upper_shadow() - 5.0).abs() < 0.001);
        assert!((bar.lower_shadow() - 5.0).abs() < 0.001);
        assert!(bar.is_bullish());
        assert!(!bar.is_bearish());
    }

    #[test]
    fn test_bar_true_range() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1000000.0);

        // Without previous close
        assert!((bar.true_range(None) - 15.0).abs() < 0.001);

        // With previous close that creates gap
        assert!((bar.true_range(Some(90.0)) - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_bar_validation() {
        assert!(Bar::new(1, 100.0, 110.0, 95.0, 105.0, 10.0).validate().is_ok());
        assert!(Bar::new(1, 100.0, 104.0, 95.0, 105.0, 10.0).validate().is_err());
        assert!(Bar::new(1, 100.0, 110.0, 101.0, 105.0, 10.0).validate().is_err());
        assert!(Bar::new(1, 100.0, 110.0, 95.0, 105.0, -1.0).validate().is_err());
        assert!(Bar::new(1, f64::NAN, 110.0, 95.0, 105.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_series_sorted_and_deduplicated() {
        let series = BarSeries::new(
            "AAPL",
            Timeframe::Daily,
            vec![
                Bar::new(3, 102.5, 103.0, 101.0, 102.5, 1000.0),
                Bar::new(1, 100.0, 101.0, 99.0, 100.5, 1000.0),
                Bar::new(2, 100.5, 102.0, 100.0, 101.5, 2000.0),
                Bar::new(2, 100.5, 102.0, 100.0, 101.5, 2000.0),
            ],
        );

        assert_eq!(series.len(), 3);
        assert_eq!(series.first().unwrap().timestamp, 1);
        assert_eq!(series.last().unwrap().timestamp, 3);
        assert_eq!(series.closes(), vec![100.5, 101.5, 102.5]);
        assert_eq!(series.last_n(2).len(), 2);
        assert!(!series.is_synthetic());
    }

    #[test]
    fn test_series_source_marker() {
        let series = BarSeries::new("DEMO", Timeframe::Daily, vec![])
            .with_source(SeriesSource::Synthetic);
        assert!(series.is_synthetic());
        assert!(series.is_empty());
    }
}
