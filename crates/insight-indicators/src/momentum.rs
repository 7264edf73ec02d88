//! Momentum oscillators.

use insight_core::traits::Indicator;
use insight_core::types::{Bar, IndicatorSeries};
use serde::{Deserialize, Serialize};

use crate::moving_average::{closes, ema_values, sma_values, stamp, wilder_values};

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// RSI over a plain value series; first value belongs to `data[period]`.
    pub fn values(data: &[f64], period: usize) -> Vec<f64> {
        if data.len() <= period {
            return vec![];
        }

        let mut gains = Vec::with_capacity(data.len() - 1);
        let mut losses = Vec::with_capacity(data.len() - 1);

        for i in 1..data.len() {
            let change = data[i] - data[i - 1];
            if change > 0.0 {
                gains.push(change);
                losses.push(0.0);
            } else {
                gains.push(0.0);
                losses.push(-change);
            }
        }

        let avg_gains = wilder_values(&gains, period);
        let avg_losses = wilder_values(&losses, period);

        avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|(&gain, &loss)| {
                if loss == 0.0 {
                    100.0
                } else {
                    100.0 - (100.0 / (1.0 + gain / loss))
                }
            })
            .collect()
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        stamp(bars, self.period, Self::values(&closes(bars), self.period))
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 bars for period changes
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<MacdOutput> {
        if bars.len() < self.period() {
            return IndicatorSeries::new();
        }

        let data = closes(bars);
        let fast_ema = ema_values(&data, self.fast_period);
        let slow_ema = ema_values(&data, self.slow_period);

        // Both EMAs end on the last bar; drop the fast EMA's extra head so the
        // pairs share timestamps.
        let offset = self.slow_period - self.fast_period;
        let macd_line: Vec<f64> = fast_ema[offset..]
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = ema_values(&macd_line, self.signal_period);

        let values = macd_line[self.signal_period - 1..]
            .iter()
            .zip(signal_line.iter())
            .map(|(&macd, &signal)| MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            });

        stamp(bars, self.period() - 1, values)
    }

    fn period(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// Stochastic oscillator output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticOutput {
    /// %K (fast stochastic)
    pub k: f64,
    /// %D (SMA of %K)
    pub d: f64,
}

/// Stochastic oscillator.
///
/// Compares closing price to the high/low range over a period.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Stochastic {
    /// Create a new stochastic oscillator with default parameters (14, 3).
    pub fn new() -> Self {
        Self::with_periods(14, 3)
    }

    /// Create with custom periods.
    pub fn with_periods(k_period: usize, d_period: usize) -> Self {
        assert!(k_period > 0 && d_period > 0);
        Self { k_period, d_period }
    }
}

impl Default for Stochastic {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Stochastic {
    type Output = StochasticOutput;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<StochasticOutput> {
        if bars.len() < self.period() {
            return IndicatorSeries::new();
        }

        let k_values: Vec<f64> = bars
            .windows(self.k_period)
            .map(|window| {
                let (highest, lowest) = high_low(window);
                let range = highest - lowest;
                if range == 0.0 {
                    50.0 // Undefined, use midpoint
                } else {
                    ((window[window.len() - 1].close - lowest) / range) * 100.0
                }
            })
            .collect();

        let d_values = sma_values(&k_values, self.d_period);
        let values = k_values[self.d_period - 1..]
            .iter()
            .zip(d_values)
            .map(|(&k, d)| StochasticOutput { k, d });

        stamp(bars, self.period() - 1, values)
    }

    fn period(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    fn name(&self) -> &str {
        "Stochastic"
    }
}

/// Highest high and lowest low of a window.
pub(crate) fn high_low(window: &[Bar]) -> (f64, f64) {
    window.iter().fold(
        (f64::NEG_INFINITY, f64::INFINITY),
        |(high, low), bar| (high.max(bar.high), low.min(bar.low)),
    )
}

/// Williams %R, the stochastic %K mirrored onto [-100, 0].
#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
}

impl WilliamsR {
    /// Create a new Williams %R (commonly 14).
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for WilliamsR {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for WilliamsR {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        if bars.len() < self.period {
            return IndicatorSeries::new();
        }

        let values = bars.windows(self.period).map(|window| {
            let (highest, lowest) = high_low(window);
            let range = highest - lowest;
            if range == 0.0 {
                -50.0
            } else {
                (highest - window[window.len() - 1].close) / range * -100.0
            }
        });

        stamp(bars, self.period - 1, values)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Williams %R"
    }
}

/// Commodity Channel Index (CCI).
#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
}

impl Cci {
    /// Lambert's constant scaling 70-80% of values into ±100.
    pub const SCALE: f64 = 0.015;

    /// Create a new CCI (commonly 20).
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for Cci {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Indicator for Cci {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        if bars.len() < self.period {
            return IndicatorSeries::new();
        }

        let period_f64 = self.period as f64;
        let typical: Vec<f64> = bars.iter().map(Bar::typical_price).collect();

        let values = typical.windows(self.period).map(|window| {
            let mean = window.iter().sum::<f64>() / period_f64;
            let mean_deviation = window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period_f64;
            if mean_deviation == 0.0 {
                0.0
            } else {
                (window[window.len() - 1] - mean) / (Self::SCALE * mean_deviation)
            }
        });

        stamp(bars, self.period - 1, values)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "CCI"
    }
}

/// Rate of Change (ROC) in percent.
#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
}

impl Roc {
    /// Create a new ROC (commonly 12).
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for Roc {
    fn default() -> Self {
        Self::new(12)
    }
}

impl Indicator for Roc {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        if bars.len() <= self.period {
            return IndicatorSeries::new();
        }

        let values = (self.period..bars.len()).map(|i| {
            let base = bars[i - self.period].close;
            if base == 0.0 {
                0.0
            } else {
                (bars[i].close - base) / base * 100.0
            }
        });

        stamp(bars, self.period, values)
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "ROC"
    }
}

/// Ultimate Oscillator blending three buying-pressure windows.
#[derive(Debug, Clone)]
pub struct UltimateOscillator {
    short: usize,
    medium: usize,
    long: usize,
}

impl UltimateOscillator {
    /// Create with the classic (7, 14, 28) windows.
    pub fn new() -> Self {
        Self::with_periods(7, 14, 28)
    }

    /// Create with custom windows.
    pub fn with_periods(short: usize, medium: usize, long: usize) -> Self {
        assert!(short > 0 && short < medium && medium < long);
        Self {
            short,
            medium,
            long,
        }
    }
}

impl Default for UltimateOscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for UltimateOscillator {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        if bars.len() < self.period() {
            return IndicatorSeries::new();
        }

        // Index j holds the values for bar j + 1
        let mut pressure = Vec::with_capacity(bars.len() - 1);
        let mut true_range = Vec::with_capacity(bars.len() - 1);
        for pair in bars.windows(2) {
            let prev_close = pair[0].close;
            let bar = &pair[1];
            let floor = bar.low.min(prev_close);
            pressure.push(bar.close - floor);
            true_range.push(bar.high.max(prev_close) - floor);
        }

        let average = |end: usize, window: usize| {
            let start = end + 1 - window;
            let tr: f64 = true_range[start..=end].iter().sum();
            if tr == 0.0 {
                0.0
            } else {
                pressure[start..=end].iter().sum::<f64>() / tr
            }
        };

        let values = (self.long - 1..pressure.len()).map(|end| {
            let short = average(end, self.short);
            let medium = average(end, self.medium);
            let long = average(end, self.long);
            100.0 * (4.0 * short + 2.0 * medium + long) / 7.0
        });

        stamp(bars, self.long, values)
    }

    fn period(&self) -> usize {
        self.long + 1
    }

    fn name(&self) -> &str {
        "Ultimate Oscillator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_bars::{bar, from_closes};

    #[test]
    fn test_rsi_bounds() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();
        let result = Rsi::default().calculate(&from_closes(&closes));

        assert_eq!(result.len(), 60 - 14);
        for value in result.values() {
            assert!((0.0..=100.0).contains(value));
        }
    }

    #[test]
    fn test_rsi_all_gains() {
        let bars = from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let result = Rsi::new(5).calculate(&bars);

        assert_eq!(result.len(), 2);
        assert!((result.points()[0].value - 100.0).abs() < 1e-10);
        assert_eq!(result.points()[0].timestamp, bars[5].timestamp);
    }

    #[test]
    fn test_rsi_all_losses() {
        let bars = from_closes(&[7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        let result = Rsi::new(5).calculate(&bars);

        assert!(!result.is_empty());
        assert!(result.points()[0].value.abs() < 1e-10);
    }

    #[test]
    fn test_rsi_flat_series_hits_sentinel() {
        // No losses at all: the avgLoss = 0 branch yields exactly 100
        let bars = from_closes(&[50.0; 30]);
        let result = Rsi::default().calculate(&bars);

        assert_eq!(result.len(), 16);
        for value in result.values() {
            assert_eq!(*value, 100.0);
        }
    }

    #[test]
    fn test_rsi_short_input_is_empty() {
        let bars = from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let rsi = Rsi::default();
        assert!(rsi.calculate(&bars).is_empty());
        assert!(rsi.validate_data(&bars).is_err());
    }

    #[test]
    fn test_macd_alignment() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let bars = from_closes(&closes);
        let result = Macd::new().calculate(&bars);

        assert_eq!(result.len(), 50 - 33);
        assert_eq!(result.points()[0].timestamp, bars[33].timestamp);
        // In an uptrend, MACD should be positive
        assert!(result.last_value().unwrap().macd > 0.0);
    }

    #[test]
    fn test_macd_histogram_non_negative_in_uptrend() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + i as f64 * 0.75).collect();
        let result = Macd::new().calculate(&from_closes(&closes));

        for output in result.values() {
            assert!(output.histogram >= -1e-9);
            assert!((output.histogram - (output.macd - output.signal)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_macd_insufficient() {
        let closes: Vec<f64> = (0..33).map(|i| 100.0 + i as f64).collect();
        assert!(Macd::new().calculate(&from_closes(&closes)).is_empty());
    }

    #[test]
    fn test_stochastic_bounds() {
        let bars: Vec<Bar> = (0..30)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.7).sin() * 4.0;
                bar(i, c, c + 2.0, c - 2.0, c, 1000.0)
            })
            .collect();

        let result = Stochastic::new().calculate(&bars);
        assert_eq!(result.len(), 30 - 15);

        for output in result.values() {
            assert!(output.k >= 0.0 && output.k <= 100.0);
            assert!(output.d >= 0.0 && output.d <= 100.0);
        }
    }

    #[test]
    fn test_stochastic_at_high() {
        let bars: Vec<Bar> = (0..8)
            .map(|i| {
                let high = 10.0 + i as f64;
                bar(i, high - 1.0, high, high - 5.0, high, 1000.0)
            })
            .collect();

        let result = Stochastic::with_periods(5, 3).calculate(&bars);
        assert!(!result.is_empty());
        assert!((result.last_value().unwrap().k - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_williams_r_bounds() {
        let bars: Vec<Bar> = (0..40)
            .map(|i| {
                let c = 50.0 + (i as f64 * 0.3).cos() * 6.0;
                bar(i, c, c + 1.5, c - 1.5, c, 500.0)
            })
            .collect();

        let result = WilliamsR::default().calculate(&bars);
        assert_eq!(result.len(), 40 - 13);
        for value in result.values() {
            assert!((-100.0..=0.0).contains(value));
        }
    }

    #[test]
    fn test_williams_r_flat_range() {
        let bars: Vec<Bar> = (0..14).map(|i| bar(i, 10.0, 10.0, 10.0, 10.0, 1.0)).collect();
        let result = WilliamsR::default().calculate(&bars);
        assert_eq!(result.last_value(), Some(&-50.0));
    }

    #[test]
    fn test_cci_flat_is_zero() {
        let bars = from_closes(&[20.0; 25]);
        let result = Cci::default().calculate(&bars);
        assert_eq!(result.len(), 6);
        assert!(result.values().all(|v| *v == 0.0));
    }

    #[test]
    fn test_roc() {
        let closes: Vec<f64> = (0..13).map(|i| 100.0 + i as f64 * 10.0).collect();
        let result = Roc::default().calculate(&from_closes(&closes));

        assert_eq!(result.len(), 1);
        // (220 - 100) / 100 * 100
        assert!((result.last_value().unwrap() - 120.0).abs() < 1e-10);
    }

    #[test]
    fn test_ultimate_oscillator() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let result = UltimateOscillator::new().calculate(&from_closes(&closes));

        assert_eq!(result.len(), 40 - 28);
        for value in result.values() {
            assert!((0.0..=100.0).contains(value));
        }
    }
}
