//! Volatility indicators.

use insight_core::traits::Indicator;
use insight_core::types::{Bar, IndicatorSeries};
use serde::{Deserialize, Serialize};

use crate::momentum::high_low;
use crate::moving_average::{closes, ema_values, stamp, wilder_values};
use crate::simd;

/// Standard Deviation (population) of closes.
#[derive(Debug, Clone)]
pub struct StdDev {
    period: usize,
}

impl StdDev {
    /// Create a new standard deviation indicator.
    pub fn new(period: usize) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        Self { period }
    }
}

impl Indicator for StdDev {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        if bars.len() < self.period {
            return IndicatorSeries::new();
        }

        let data = closes(bars);
        stamp(bars, self.period - 1, data.windows(self.period).map(simd::std_dev))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "StdDev"
    }
}

/// Average True Range (ATR).
///
/// Measures market volatility by decomposing the entire range
/// of an asset price for that period.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator.
    ///
    /// Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Wilder-smoothed true range; the first value belongs to `bars[period]`.
    pub fn values(bars: &[Bar], period: usize) -> Vec<f64> {
        if bars.len() <= period {
            return vec![];
        }

        let tr: Vec<f64> = bars
            .windows(2)
            .map(|pair| pair[1].true_range(Some(pair[0].close)))
            .collect();

        wilder_values(&tr, period)
    }
}

impl Default for Atr {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Atr {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        stamp(bars, self.period, Self::values(bars, self.period))
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "ATR"
    }
}

/// Band output shared by Bollinger Bands and Keltner Channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    /// Upper band
    pub upper: f64,
    /// Middle band (SMA)
    pub middle: f64,
    /// Lower band
    pub lower: f64,
    /// Bandwidth ((upper - lower) / middle)
    pub bandwidth: f64,
    /// %B ((price - lower) / (upper - lower))
    pub percent_b: f64,
}

impl BollingerOutput {
    fn from_bands(middle: f64, half_width: f64, price: f64) -> Self {
        let upper = middle + half_width;
        let lower = middle - half_width;

        let bandwidth = if middle != 0.0 {
            (upper - lower) / middle
        } else {
            0.0
        };

        let percent_b = if upper != lower {
            (price - lower) / (upper - lower)
        } else {
            0.5
        };

        Self {
            upper,
            middle,
            lower,
            bandwidth,
            percent_b,
        }
    }

    /// Check if price is above upper band.
    pub fn is_overbought(&self, price: f64) -> bool {
        price > self.upper
    }

    /// Check if price is below lower band.
    pub fn is_oversold(&self, price: f64) -> bool {
        price < self.lower
    }
}

/// Bollinger Bands.
///
/// Consists of a middle band (SMA) with upper and lower bands
/// at a specified number of standard deviations.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    /// Create new Bollinger Bands with default parameters (20, 2.0).
    pub fn new() -> Self {
        Self::with_params(20, 2.0)
    }

    /// Create Bollinger Bands with custom parameters.
    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        assert!(
            std_dev_multiplier > 0.0,
            "Std dev multiplier must be positive"
        );
        Self {
            period,
            std_dev_multiplier,
        }
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerOutput;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<BollingerOutput> {
        if bars.len() < self.period {
            return IndicatorSeries::new();
        }

        let data = closes(bars);
        let period_f64 = self.period as f64;

        let values = data.windows(self.period).map(|window| {
            let mean = simd::sum(window) / period_f64;
            let std_dev = (simd::sum_squared_deviation(window, mean) / period_f64).sqrt();
            BollingerOutput::from_bands(
                mean,
                self.std_dev_multiplier * std_dev,
                window[window.len() - 1],
            )
        });

        stamp(bars, self.period - 1, values)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}

/// Keltner Channels.
///
/// Similar to Bollinger Bands but uses ATR instead of standard deviation.
#[derive(Debug, Clone)]
pub struct KeltnerChannels {
    ema_period: usize,
    atr_period: usize,
    atr_multiplier: f64,
}

impl KeltnerChannels {
    /// Create new Keltner Channels with default parameters (20, 10, 2.0).
    pub fn new() -> Self {
        Self::with_params(20, 10, 2.0)
    }

    /// Create Keltner Channels with custom parameters.
    pub fn with_params(ema_period: usize, atr_period: usize, atr_multiplier: f64) -> Self {
        assert!(ema_period > 0 && atr_period > 0);
        assert!(atr_multiplier > 0.0);
        Self {
            ema_period,
            atr_period,
            atr_multiplier,
        }
    }

    fn first_index(&self) -> usize {
        (self.ema_period - 1).max(self.atr_period)
    }
}

impl Default for KeltnerChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for KeltnerChannels {
    type Output = BollingerOutput;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<BollingerOutput> {
        let first = self.first_index();
        if bars.len() <= first {
            return IndicatorSeries::new();
        }

        let ema = ema_values(&closes(bars), self.ema_period);
        let atr = Atr::values(bars, self.atr_period);

        // Align both inputs on bar index
        let values = (first..bars.len()).map(|i| {
            let middle = ema[i + 1 - self.ema_period];
            let range = atr[i - self.atr_period];
            BollingerOutput::from_bands(middle, self.atr_multiplier * range, bars[i].close)
        });

        stamp(bars, first, values)
    }

    fn period(&self) -> usize {
        self.first_index() + 1
    }

    fn name(&self) -> &str {
        "Keltner Channels"
    }
}

/// Upper, middle and lower line of a price channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelOutput {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Donchian Channels: highest high and lowest low over the window.
#[derive(Debug, Clone)]
pub struct DonchianChannels {
    period: usize,
}

impl DonchianChannels {
    /// Create Donchian Channels (commonly 20).
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for DonchianChannels {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Indicator for DonchianChannels {
    type Output = ChannelOutput;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<ChannelOutput> {
        if bars.len() < self.period {
            return IndicatorSeries::new();
        }

        let values = bars.windows(self.period).map(|window| {
            let (upper, lower) = high_low(window);
            ChannelOutput {
                upper,
                middle: (upper + lower) / 2.0,
                lower,
            }
        });

        stamp(bars, self.period - 1, values)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Donchian Channels"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_bars::{bar, from_closes};

    #[test]
    fn test_std_dev() {
        let bars = from_closes(&[2.0, 4.0, 6.0, 8.0, 10.0]);
        let result = StdDev::new(3).calculate(&bars);

        assert_eq!(result.len(), 3);
        // First window: [2, 4, 6], mean = 4, variance = (4+0+4)/3 = 8/3
        // std_dev = sqrt(8/3) ≈ 1.633
        assert!((result.points()[0].value - 1.633).abs() < 0.01);
    }

    #[test]
    fn test_atr() {
        let bars = vec![
            bar(0, 9.0, 10.0, 8.0, 9.0, 100.0),
            bar(1, 9.0, 11.0, 9.0, 10.0, 100.0),
            bar(2, 10.0, 12.0, 10.0, 11.0, 100.0),
            bar(3, 11.0, 11.0, 9.0, 10.0, 100.0),
            bar(4, 10.0, 13.0, 11.0, 12.0, 100.0),
            bar(5, 12.0, 14.0, 12.0, 13.0, 100.0),
        ];

        let result = Atr::new(3).calculate(&bars);
        assert_eq!(result.len(), 3);
        assert_eq!(result.points()[0].timestamp, bars[3].timestamp);

        // TRs: 2, 2, 2 -> first ATR 2
        assert!((result.points()[0].value - 2.0).abs() < 1e-10);
        for value in result.values() {
            assert!(*value > 0.0);
        }
    }

    #[test]
    fn test_atr_insufficient() {
        let bars = from_closes(&[1.0; 14]);
        assert!(Atr::default().calculate(&bars).is_empty());
    }

    #[test]
    fn test_bollinger_bands() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 5) as f64).collect();
        let result = BollingerBands::new().calculate(&from_closes(&closes));

        assert_eq!(result.len(), 11);
        for output in result.values() {
            assert!(output.upper > output.middle);
            assert!(output.middle > output.lower);
            assert!(output.bandwidth > 0.0);
        }
    }

    #[test]
    fn test_bollinger_flat_series() {
        let result = BollingerBands::new().calculate(&from_closes(&[50.0; 20]));
        let output = result.last_value().unwrap();

        assert_eq!(output.upper, output.lower);
        assert_eq!(output.percent_b, 0.5);
    }

    #[test]
    fn test_keltner_alignment() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let bars = from_closes(&closes);
        let result = KeltnerChannels::new().calculate(&bars);

        assert_eq!(result.len(), 40 - 19);
        assert_eq!(result.points()[0].timestamp, bars[19].timestamp);
        for output in result.values() {
            assert!(output.upper > output.lower);
        }
    }

    #[test]
    fn test_donchian() {
        let closes: Vec<f64> = (0..25).map(|i| i as f64).collect();
        let result = DonchianChannels::default().calculate(&from_closes(&closes));

        assert_eq!(result.len(), 6);
        let last = result.last_value().unwrap();
        // Window covers closes 5..=24 with ±1 wicks
        assert!((last.upper - 25.0).abs() < 1e-10);
        assert!((last.lower - 4.0).abs() < 1e-10);
        assert!((last.middle - 14.5).abs() < 1e-10);
    }
}
