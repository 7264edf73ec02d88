//! Price/RSI divergence detection.

use insight_core::traits::Indicator;
use insight_core::types::{Bar, Direction};
use insight_indicators::Rsi;
use serde::{Deserialize, Serialize};

/// A price extreme that RSI failed to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    /// Bullish for a lower price low with a higher RSI low
    pub direction: Direction,
    pub timestamp: i64,
    pub price: f64,
    pub rsi: f64,
}

impl Divergence {
    pub fn is_bullish(&self) -> bool {
        self.direction == Direction::Bullish
    }
}

/// Compares the two halves of a trailing window of closes and RSI.
///
/// The first half sets the reference price and RSI extremes. The second
/// half is scanned oldest first and the first bar that breaks a price
/// extreme without a matching RSI extreme is reported.
#[derive(Debug, Clone)]
pub struct DivergenceDetector {
    lookback: usize,
    rsi: Rsi,
}

impl Default for DivergenceDetector {
    fn default() -> Self {
        Self::new(20)
    }
}

impl DivergenceDetector {
    /// Shortest window with two halves of two points each.
    pub const MIN_LOOKBACK: usize = 4;

    /// Create a detector over `lookback` RSI(14) points.
    ///
    /// Panics when `lookback` is below [`Self::MIN_LOOKBACK`].
    pub fn new(lookback: usize) -> Self {
        assert!(
            lookback >= Self::MIN_LOOKBACK,
            "Lookback must cover at least four bars"
        );
        Self {
            lookback,
            rsi: Rsi::default(),
        }
    }

    /// Bars needed before a divergence can be evaluated.
    pub fn required_bars(&self) -> usize {
        self.rsi.period() + self.lookback - 1
    }

    /// Detect a divergence in the most recent window.
    pub fn detect(&self, bars: &[Bar]) -> Option<Divergence> {
        let rsi = self.rsi.calculate(bars);
        if rsi.len() < self.lookback {
            return None;
        }

        let window: Vec<(i64, f64, f64)> = rsi.points()[rsi.len() - self.lookback..]
            .iter()
            .map(|point| {
                let close = bars
                    .binary_search_by_key(&point.timestamp, |b| b.timestamp)
                    .map(|i| bars[i].close)
                    .unwrap_or(f64::NAN);
                (point.timestamp, close, point.value)
            })
            .collect();

        let (reference, scan) = window.split_at(self.lookback / 2);

        let price_high = reference.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        let price_low = reference.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let rsi_high = reference.iter().map(|p| p.2).fold(f64::NEG_INFINITY, f64::max);
        let rsi_low = reference.iter().map(|p| p.2).fold(f64::INFINITY, f64::min);

        scan.iter().find_map(|&(timestamp, price, rsi)| {
            let direction = if price > price_high && rsi < rsi_high {
                Direction::Bearish
            } else if price < price_low && rsi > rsi_low {
                Direction::Bullish
            } else {
                return None;
            };
            Some(Divergence {
                direction,
                timestamp,
                price,
                rsi,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Slow rise, sharp fall, bounce, then a marginally lower low.
    fn bullish_closes() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 0.5).collect();
        closes.extend((1..=10).map(|i| 110.0 - 3.0 * i as f64));
        closes.extend((1..=5).map(|i| 80.0 + 2.0 * i as f64));
        closes.extend((1..=5).map(|i| 90.0 - 2.1 * i as f64));
        closes
    }

    fn to_bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * 86_400_000, c, c + 1.0, c - 1.0, c, 1_000.0))
            .collect()
    }

    #[test]
    fn test_bullish_divergence() {
        let bars = to_bars(&bullish_closes());
        let divergence = DivergenceDetector::default().detect(&bars).unwrap();

        assert!(divergence.is_bullish());
        assert_eq!(divergence.timestamp, bars[39].timestamp);
        assert!((divergence.price - 79.5).abs() < 1e-9);
    }

    #[test]
    fn test_bearish_divergence_mirror() {
        let closes: Vec<f64> = bullish_closes().iter().map(|c| 200.0 - c).collect();
        let divergence = DivergenceDetector::default().detect(&to_bars(&closes)).unwrap();

        assert_eq!(divergence.direction, Direction::Bearish);
    }

    #[test]
    fn test_steady_trend_has_no_divergence() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        assert!(DivergenceDetector::default().detect(&to_bars(&closes)).is_none());
    }

    #[test]
    fn test_short_series() {
        let detector = DivergenceDetector::default();
        assert_eq!(detector.required_bars(), 34);
        let closes: Vec<f64> = (0..33).map(|i| 100.0 - i as f64).collect();
        assert!(detector.detect(&to_bars(&closes)).is_none());
    }
}
