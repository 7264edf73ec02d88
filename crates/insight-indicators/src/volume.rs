//! Volume-based indicators.

use insight_core::traits::Indicator;
use insight_core::types::{Bar, IndicatorSeries};
use serde::{Deserialize, Serialize};

use crate::moving_average::stamp;

/// On-Balance Volume, accumulated from zero at the first bar.
#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Obv {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Obv {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        let mut result = IndicatorSeries::with_capacity(bars.len());
        let Some(first) = bars.first() else {
            return result;
        };

        let mut obv = 0.0;
        result.push(first.timestamp, obv);

        for pair in bars.windows(2) {
            let (prev, bar) = (&pair[0], &pair[1]);
            if bar.close > prev.close {
                obv += bar.volume;
            } else if bar.close < prev.close {
                obv -= bar.volume;
            }
            result.push(bar.timestamp, obv);
        }

        result
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "OBV"
    }
}

/// Money Flow Index, a volume-weighted RSI over typical prices.
#[derive(Debug, Clone)]
pub struct Mfi {
    period: usize,
}

impl Mfi {
    /// Create a new MFI (commonly 14).
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for Mfi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Mfi {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        if bars.len() <= self.period {
            return IndicatorSeries::new();
        }

        // Signed raw money flow for bars[1..]
        let flows: Vec<(f64, f64)> = bars
            .windows(2)
            .map(|pair| {
                let prev_tp = pair[0].typical_price();
                let tp = pair[1].typical_price();
                let raw = tp * pair[1].volume;
                if tp > prev_tp {
                    (raw, 0.0)
                } else if tp < prev_tp {
                    (0.0, raw)
                } else {
                    (0.0, 0.0)
                }
            })
            .collect();

        let values = flows.windows(self.period).map(|window| {
            let (positive, negative) = window
                .iter()
                .fold((0.0, 0.0), |(p, n), (fp, fn_)| (p + fp, n + fn_));
            if negative == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + positive / negative)
            }
        });

        stamp(bars, self.period, values)
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "MFI"
    }
}

/// Chaikin Money Flow.
#[derive(Debug, Clone)]
pub struct Cmf {
    period: usize,
}

impl Cmf {
    /// Create a new CMF (commonly 20).
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }
}

impl Default for Cmf {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Indicator for Cmf {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<f64> {
        if bars.len() < self.period {
            return IndicatorSeries::new();
        }

        let values = bars.windows(self.period).map(|window| {
            let mut flow = 0.0;
            let mut volume = 0.0;
            for bar in window {
                let range = bar.range();
                let multiplier = if range == 0.0 {
                    0.0
                } else {
                    ((bar.close - bar.low) - (bar.high - bar.close)) / range
                };
                flow += multiplier * bar.volume;
                volume += bar.volume;
            }
            if volume == 0.0 {
                0.0
            } else {
                flow / volume
            }
        });

        stamp(bars, self.period - 1, values)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "CMF"
    }
}

/// One price bucket of a volume profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileBin {
    pub low: f64,
    pub high: f64,
    pub volume: f64,
}

/// Volume-at-price histogram with its point of control and value area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfileOutput {
    pub bins: Vec<ProfileBin>,
    /// Midpoint of the heaviest bin
    pub point_of_control: f64,
    pub value_area_high: f64,
    pub value_area_low: f64,
}

/// Volume profile over the whole series.
///
/// Each bar's volume is assigned to the bin holding its typical price. The
/// value area grows from the point of control towards the heavier
/// neighbouring bin until it holds the requested share of total volume.
#[derive(Debug, Clone)]
pub struct VolumeProfile {
    bins: usize,
    value_area: f64,
}

impl VolumeProfile {
    /// Create with 24 bins and a 70% value area.
    pub fn new() -> Self {
        Self::with_params(24, 0.70)
    }

    /// Create with a custom bin count and value-area share.
    pub fn with_params(bins: usize, value_area: f64) -> Self {
        assert!(bins > 0, "Bin count must be greater than 0");
        assert!(value_area > 0.0 && value_area <= 1.0);
        Self { bins, value_area }
    }

    /// Build the profile; `None` for an empty or volumeless series.
    pub fn calculate(&self, bars: &[Bar]) -> Option<VolumeProfileOutput> {
        let (low, high) = bars.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(low, high), bar| (low.min(bar.low), high.max(bar.high)),
        );
        let total: f64 = bars.iter().map(|b| b.volume).sum();
        if bars.is_empty() || total <= 0.0 {
            return None;
        }

        let span = high - low;
        if span <= 0.0 {
            return Some(VolumeProfileOutput {
                bins: vec![ProfileBin {
                    low,
                    high,
                    volume: total,
                }],
                point_of_control: low,
                value_area_high: high,
                value_area_low: low,
            });
        }

        let width = span / self.bins as f64;
        let mut bins: Vec<ProfileBin> = (0..self.bins)
            .map(|i| ProfileBin {
                low: low + width * i as f64,
                high: low + width * (i + 1) as f64,
                volume: 0.0,
            })
            .collect();

        for bar in bars {
            let idx = (((bar.typical_price() - low) / width) as usize).min(self.bins - 1);
            bins[idx].volume += bar.volume;
        }

        // First heaviest bin wins ties
        let mut poc = 0;
        for (i, bin) in bins.iter().enumerate() {
            if bin.volume > bins[poc].volume {
                poc = i;
            }
        }

        let target = total * self.value_area;
        let (mut lo, mut hi) = (poc, poc);
        let mut covered = bins[poc].volume;

        while covered < target && (lo > 0 || hi + 1 < self.bins) {
            let below = if lo > 0 { Some(bins[lo - 1].volume) } else { None };
            let above = if hi + 1 < self.bins {
                Some(bins[hi + 1].volume)
            } else {
                None
            };

            match (below, above) {
                (Some(b), Some(a)) if b > a => {
                    lo -= 1;
                    covered += b;
                }
                (_, Some(a)) => {
                    hi += 1;
                    covered += a;
                }
                (Some(b), None) => {
                    lo -= 1;
                    covered += b;
                }
                (None, None) => break,
            }
        }

        let point_of_control = (bins[poc].low + bins[poc].high) / 2.0;
        let value_area_high = bins[hi].high;
        let value_area_low = bins[lo].low;

        Some(VolumeProfileOutput {
            bins,
            point_of_control,
            value_area_high,
            value_area_low,
        })
    }
}

impl Default for VolumeProfile {
    fn default() -> Self {
        Self::new()
    }
}
