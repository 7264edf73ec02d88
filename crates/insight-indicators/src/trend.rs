//! Trend-following indicators.

use insight_core::traits::Indicator;
use insight_core::types::{Bar, IndicatorSeries};
use serde::{Deserialize, Serialize};

use crate::moving_average::{closes, ema_values, stamp, wilder_values};
use crate::simd;

/// ADX output with its directional indicators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxOutput {
    /// Average Directional Index
    pub adx: f64,
    /// Positive directional indicator (+DI)
    pub plus_di: f64,
    /// Negative directional indicator (-DI)
    pub minus_di: f64,
}

/// Average Directional Index (ADX).
///
/// Measures trend strength regardless of direction; +DI and -DI give the
/// direction.
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
}

impl Adx {
    /// Create a new ADX (commonly 14).
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for Adx {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Adx {
    type Output = AdxOutput;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<AdxOutput> {
        if bars.len() < self.period() {
            return IndicatorSeries::new();
        }

        let moves = bars.len() - 1;
        let mut tr = Vec::with_capacity(moves);
        let mut plus_dm = Vec::with_capacity(moves);
        let mut minus_dm = Vec::with_capacity(moves);

        for pair in bars.windows(2) {
            let (prev, bar) = (&pair[0], &pair[1]);
            let up = bar.high - prev.high;
            let down = prev.low - bar.low;

            tr.push(bar.true_range(Some(prev.close)));
            plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
            minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
        }

        let smoothed_tr = wilder_values(&tr, self.period);
        let smoothed_plus = wilder_values(&plus_dm, self.period);
        let smoothed_minus = wilder_values(&minus_dm, self.period);

        // One (+DI, -DI, DX) triple per bar from bars[period] on
        let mut directional = Vec::with_capacity(smoothed_tr.len());
        let mut dx = Vec::with_capacity(smoothed_tr.len());
        for ((&range, &plus), &minus) in smoothed_tr
            .iter()
            .zip(smoothed_plus.iter())
            .zip(smoothed_minus.iter())
        {
            let (plus_di, minus_di) = if range == 0.0 {
                (0.0, 0.0)
            } else {
                (100.0 * plus / range, 100.0 * minus / range)
            };
            let di_sum = plus_di + minus_di;
            dx.push(if di_sum == 0.0 {
                0.0
            } else {
                100.0 * (plus_di - minus_di).abs() / di_sum
            });
            directional.push((plus_di, minus_di));
        }

        let adx = wilder_values(&dx, self.period);
        let values = adx
            .iter()
            .zip(directional[self.period - 1..].iter())
            .map(|(&adx, &(plus_di, minus_di))| AdxOutput {
                adx,
                plus_di,
                minus_di,
            });

        stamp(bars, self.period() - 1, values)
    }

    fn period(&self) -> usize {
        2 * self.period
    }

    fn name(&self) -> &str {
        "ADX"
    }
}

/// Parabolic SAR output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SarOutput {
    /// Stop-and-reverse level
    pub sar: f64,
    /// Trend direction after this bar
    pub uptrend: bool,
    /// True if the trend flipped on this bar
    pub reversed: bool,
}

/// Parabolic SAR (stop and reverse).
#[derive(Debug, Clone)]
pub struct ParabolicSar {
    step: f64,
    max_step: f64,
}

impl ParabolicSar {
    /// Create with the classic acceleration (0.02, capped at 0.2).
    pub fn new() -> Self {
        Self::with_params(0.02, 0.2)
    }

    /// Create with a custom acceleration step and cap.
    pub fn with_params(step: f64, max_step: f64) -> Self {
        assert!(step > 0.0 && max_step >= step);
        Self { step, max_step }
    }
}

impl Default for ParabolicSar {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for ParabolicSar {
    type Output = SarOutput;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<SarOutput> {
        if bars.len() < 2 {
            return IndicatorSeries::new();
        }

        let mut uptrend = bars[1].close >= bars[0].close;
        let (mut sar, mut extreme) = if uptrend {
            (bars[0].low.min(bars[1].low), bars[0].high.max(bars[1].high))
        } else {
            (bars[0].high.max(bars[1].high), bars[0].low.min(bars[1].low))
        };
        let mut acceleration = self.step;

        let mut result = IndicatorSeries::with_capacity(bars.len() - 1);
        result.push(
            bars[1].timestamp,
            SarOutput {
                sar,
                uptrend,
                reversed: false,
            },
        );

        for i in 2..bars.len() {
            let bar = &bars[i];
            let mut next = sar + acceleration * (extreme - sar);
            let mut reversed = false;

            if uptrend {
                // SAR may not move into the prior two bars' range
                next = next.min(bars[i - 1].low).min(bars[i - 2].low);
                if bar.low < next {
                    uptrend = false;
                    reversed = true;
                    next = extreme;
                    extreme = bar.low;
                    acceleration = self.step;
                } else if bar.high > extreme {
                    extreme = bar.high;
                    acceleration = (acceleration + self.step).min(self.max_step);
                }
            } else {
                next = next.max(bars[i - 1].high).max(bars[i - 2].high);
                if bar.high > next {
                    uptrend = true;
                    reversed = true;
                    next = extreme;
                    extreme = bar.high;
                    acceleration = self.step;
                } else if bar.low < extreme {
                    extreme = bar.low;
                    acceleration = (acceleration + self.step).min(self.max_step);
                }
            }

            sar = next;
            result.push(
                bar.timestamp,
                SarOutput {
                    sar,
                    uptrend,
                    reversed,
                },
            );
        }

        result
    }

    fn period(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        "Parabolic SAR"
    }
}

/// Aroon output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AroonOutput {
    pub up: f64,
    pub down: f64,
    /// up - down
    pub oscillator: f64,
}

/// Aroon: how recently the window's high and low were set.
#[derive(Debug, Clone)]
pub struct Aroon {
    period: usize,
}

impl Aroon {
    /// Create a new Aroon (commonly 25).
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for Aroon {
    fn default() -> Self {
        Self::new(25)
    }
}

impl Indicator for Aroon {
    type Output = AroonOutput;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<AroonOutput> {
        if bars.len() <= self.period {
            return IndicatorSeries::new();
        }

        let period_f64 = self.period as f64;
        let values = bars.windows(self.period + 1).map(|window| {
            // Ties resolve to the most recent bar
            let mut high_idx = 0;
            let mut low_idx = 0;
            for (i, bar) in window.iter().enumerate() {
                if bar.high >= window[high_idx].high {
                    high_idx = i;
                }
                if bar.low <= window[low_idx].low {
                    low_idx = i;
                }
            }

            let up = 100.0 * high_idx as f64 / period_f64;
            let down = 100.0 * low_idx as f64 / period_f64;
            AroonOutput {
                up,
                down,
                oscillator: up - down,
            }
        });

        stamp(bars, self.period, values)
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "Aroon"
    }
}

/// Elder Ray output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElderRayOutput {
    /// EMA of closes the powers are measured against
    pub ema: f64,
    /// high - EMA
    pub bull_power: f64,
    /// low - EMA
    pub bear_power: f64,
}

/// Elder Ray bull/bear power.
#[derive(Debug, Clone)]
pub struct ElderRay {
    period: usize,
}

impl ElderRay {
    /// Create a new Elder Ray (commonly 13).
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for ElderRay {
    fn default() -> Self {
        Self::new(13)
    }
}

impl Indicator for ElderRay {
    type Output = ElderRayOutput;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<ElderRayOutput> {
        let ema = ema_values(&closes(bars), self.period);
        let values = bars[bars.len().min(self.period - 1)..]
            .iter()
            .zip(ema)
            .map(|(bar, ema)| ElderRayOutput {
                ema,
                bull_power: bar.high - ema,
                bear_power: bar.low - ema,
            });

        stamp(bars, self.period - 1, values)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Elder Ray"
    }
}

/// Least-squares line through a run of values at x = 0..n-1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Population standard deviation of the residuals
    pub std_error: f64,
}

impl LineFit {
    /// Fit a line; `None` for fewer than two values.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < 2 {
            return None;
        }

        let n_f64 = n as f64;
        let xs: Vec<f64> = (0..n).map(|x| x as f64).collect();
        let sum_x = n_f64 * (n_f64 - 1.0) / 2.0;
        let sum_xx = (n_f64 - 1.0) * n_f64 * (2.0 * n_f64 - 1.0) / 6.0;
        let sum_y = simd::sum(values);
        let sum_xy = simd::dot(&xs, values);

        let denominator = n_f64 * sum_xx - sum_x * sum_x;
        let slope = (n_f64 * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n_f64;

        let residuals: Vec<f64> = values
            .iter()
            .zip(&xs)
            .map(|(y, x)| y - (intercept + slope * x))
            .collect();
        let std_error = (simd::sum_squared_deviation(&residuals, 0.0) / n_f64).sqrt();

        Some(Self {
            slope,
            intercept,
            std_error,
        })
    }

    /// Fitted value at `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Linear regression channel output for the last bar of a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionOutput {
    /// Fitted value at the last bar
    pub value: f64,
    pub upper: f64,
    pub lower: f64,
    pub slope: f64,
    pub intercept: f64,
    pub std_error: f64,
}

/// Rolling linear regression channel over closes.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    period: usize,
    deviations: f64,
}

impl LinearRegression {
    /// Create with the default window (50, ±2σ).
    pub fn new() -> Self {
        Self::with_params(50, 2.0)
    }

    /// Create with a custom window and channel width.
    pub fn with_params(period: usize, deviations: f64) -> Self {
        assert!(period > 1, "Period must be greater than 1");
        assert!(deviations > 0.0);
        Self { period, deviations }
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for LinearRegression {
    type Output = RegressionOutput;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<RegressionOutput> {
        if bars.len() < self.period {
            return IndicatorSeries::new();
        }

        let data = closes(bars);
        let last_x = (self.period - 1) as f64;
        let values = data.windows(self.period).filter_map(LineFit::fit).map(|fit| {
            let value = fit.value_at(last_x);
            let width = self.deviations * fit.std_error;
            RegressionOutput {
                value,
                upper: value + width,
                lower: value - width,
                slope: fit.slope,
                intercept: fit.intercept,
                std_error: fit.std_error,
            }
        });

        stamp(bars, self.period - 1, values)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Linear Regression"
    }
}
