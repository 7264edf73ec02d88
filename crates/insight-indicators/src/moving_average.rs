//! Moving average indicators and the smoothing helpers shared by the rest
//! of the library.

use insight_core::traits::Indicator;
use insight_core::types::{Bar, IndicatorSeries};
use serde::{Deserialize, Serialize};

/// Stamp `values` onto the bars starting at `first_index`.
pub(crate) fn stamp<T>(
    bars: &[Bar],
    first_index: usize,
    values: impl IntoIterator<Item = T>,
) -> IndicatorSeries<T> {
    if first_index >= bars.len() {
        return IndicatorSeries::new();
    }
    bars[first_index..]
        .iter()
        .zip(values)
        .map(|(bar, value)| (bar.timestamp, value))
        .collect()
}

/// Closing prices of a bar slice.
pub(crate) fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Trailing arithmetic mean; first value covers `data[..period]`.
pub fn sma_values(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    let period_f64 = period as f64;

    let mut sum: f64 = data[..period].iter().sum();
    result.push(sum / period_f64);

    for i in period..data.len() {
        sum = sum - data[i - period] + data[i];
        result.push(sum / period_f64);
    }

    result
}

/// Exponential moving average seeded with the SMA of the first `period` values.
pub fn ema_values(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len() - period + 1);

    let mut ema: f64 = data[..period].iter().sum::<f64>() / period as f64;
    result.push(ema);

    for &value in &data[period..] {
        ema = (value - ema) * multiplier + ema;
        result.push(ema);
    }

    result
}

/// Wilder's smoothing: `avg = (prev_avg * (period - 1) + value) / period`,
/// seeded with the plain mean of the first `period` values.
pub fn wilder_values(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let period_f64 = period as f64;
    let mut result = Vec::with_capacity(data.len() - period + 1);

    let mut avg: f64 = data[..period].iter().sum::<f64>() / period_f64;
    result.push(avg);

    for &value in &data[period..] {
        avg = (avg * (period_f64 - 1.0) + value) / period_f64;
        result.push(avg);
    }

    result
}

/// Simple Moving Average (SMA) of closes.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        stamp(bars, self.period - 1, sma_values(&closes(bars), self.period))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA) of closes.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        stamp(bars, self.period - 1, ema_values(&closes(bars), self.period))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

/// Weighted Moving Average (WMA).
///
/// Gives linearly decreasing weights to older prices.
#[derive(Debug, Clone)]
pub struct Wma {
    period: usize,
    weights_sum: f64,
}

impl Wma {
    /// Create a new WMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        // Sum of weights: 1 + 2 + ... + n = n(n+1)/2
        let weights_sum = (period * (period + 1)) as f64 / 2.0;
        Self {
            period,
            weights_sum,
        }
    }
}

impl Indicator for Wma {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        if bars.len() < self.period {
            return IndicatorSeries::new();
        }

        let values = bars.windows(self.period).map(|window| {
            let weighted_sum: f64 = window
                .iter()
                .enumerate()
                .map(|(i, bar)| bar.close * (i + 1) as f64)
                .sum();
            weighted_sum / self.weights_sum
        });

        stamp(bars, self.period - 1, values)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "WMA"
    }
}

/// The moving averages charted together on the price pane.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovingAverageBundle {
    pub sma20: IndicatorSeries<f64>,
    pub sma50: IndicatorSeries<f64>,
    pub sma200: IndicatorSeries<f64>,
    pub ema12: IndicatorSeries<f64>,
    pub ema26: IndicatorSeries<f64>,
    pub wma20: IndicatorSeries<f64>,
}

impl MovingAverageBundle {
    /// Compute every member of the bundle.
    pub fn calculate(bars: &[Bar]) -> Self {
        Self {
            sma20: Sma::new(20).calculate(bars),
            sma50: Sma::new(50).calculate(bars),
            sma200: Sma::new(200).calculate(bars),
            ema12: Ema::new(12).calculate(bars),
            ema26: Ema::new(26).calculate(bars),
            wma20: Wma::new(20).calculate(bars),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_bars::from_closes;

    #[test]
    fn test_sma() {
        let bars = from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = Sma::new(3).calculate(&bars);

        assert_eq!(result.len(), 3);
        assert!((result.points()[0].value - 2.0).abs() < 1e-10); // (1+2+3)/3
        assert!((result.points()[1].value - 3.0).abs() < 1e-10); // (2+3+4)/3
        assert!((result.points()[2].value - 4.0).abs() < 1e-10); // (3+4+5)/3
        // Stamped with the last bar of each window
        assert_eq!(result.points()[0].timestamp, bars[2].timestamp);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let bars = from_closes(&[1.0, 2.0, 3.0]);
        assert!(Sma::new(5).calculate(&bars).is_empty());
    }

    #[test]
    fn test_ema() {
        let bars = from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = Ema::new(3).calculate(&bars);

        assert_eq!(result.len(), 3);
        assert!((result.points()[0].value - 2.0).abs() < 1e-10); // Initial SMA
        // mult = 2/(3+1) = 0.5; (4 - 2) * 0.5 + 2 = 3
        assert!((result.points()[1].value - 3.0).abs() < 1e-10);
        assert!((result.points()[2].value - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_wma() {
        let bars = from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = Wma::new(3).calculate(&bars);

        assert_eq!(result.len(), 3);
        // (1*1 + 2*2 + 3*3) / 6 = 14/6
        assert!((result.points()[0].value - 14.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_wilder_values() {
        let result = wilder_values(&[2.0, 4.0, 6.0, 8.0], 3);
        assert_eq!(result.len(), 2);
        assert!((result[0] - 4.0).abs() < 1e-10);
        // (4 * 2 + 8) / 3
        assert!((result[1] - 16.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_bundle_lengths() {
        let closes: Vec<f64> = (0..210).map(|i| 100.0 + i as f64).collect();
        let bundle = MovingAverageBundle::calculate(&from_closes(&closes));

        assert_eq!(bundle.sma20.len(), 191);
        assert_eq!(bundle.sma50.len(), 161);
        assert_eq!(bundle.sma200.len(), 11);
        assert_eq!(bundle.ema26.len(), 185);
    }
}
