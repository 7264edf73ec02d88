//! Maps the latest indicator values to integer signals.
//!
//! Each indicator has a fixed category, weight and horizon tag. A reading
//! with too little history carries the "Not enough data" text and no
//! [`SignalRecord`].

use insight_core::types::{
    Bar, Direction, Horizon, IndicatorCategory, SignalMetadata, SignalRecord, SignalStrength,
    NOT_ENOUGH_DATA,
};
use insight_indicators::LineFit;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicator_set::{Detections, IndicatorSet};

/// Indicators known to the classifier, in [`CATALOGUE`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    MovingAverages,
    Macd,
    Adx,
    ParabolicSar,
    Aroon,
    LinearRegression,
    ElderRay,
    Rsi,
    Stochastic,
    WilliamsR,
    Cci,
    Roc,
    UltimateOscillator,
    RsiDivergence,
    BollingerBands,
    KeltnerChannels,
    DonchianChannels,
    Atr,
    Obv,
    Mfi,
    Cmf,
    VolumeProfile,
    SupportResistance,
    CandlestickPatterns,
}

/// Fixed classification parameters of one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorInfo {
    pub kind: IndicatorKind,
    pub name: &'static str,
    pub category: IndicatorCategory,
    pub weight: f64,
    pub timeframe: Horizon,
}

const fn info(
    kind: IndicatorKind,
    name: &'static str,
    category: IndicatorCategory,
    weight: f64,
    timeframe: Horizon,
) -> IndicatorInfo {
    IndicatorInfo {
        kind,
        name,
        category,
        weight,
        timeframe,
    }
}

use Horizon::{Long, Medium, Short, Strategic};
use IndicatorCategory::{Levels, Momentum, Pattern, Trend, Volatility, Volume};

/// Every classified indicator in report order.
pub const CATALOGUE: [IndicatorInfo; 24] = [
    info(IndicatorKind::MovingAverages, "Moving Averages", Trend, 1.5, Long),
    info(IndicatorKind::Macd, "MACD", Trend, 1.2, Medium),
    info(IndicatorKind::Adx, "ADX", Trend, 1.0, Medium),
    info(IndicatorKind::ParabolicSar, "Parabolic SAR", Trend, 0.9, Short),
    info(IndicatorKind::Aroon, "Aroon", Trend, 0.9, Medium),
    info(IndicatorKind::LinearRegression, "Linear Regression", Trend, 1.1, Long),
    info(IndicatorKind::ElderRay, "Elder Ray", Trend, 0.8, Short),
    info(IndicatorKind::Rsi, "RSI", Momentum, 1.3, Short),
    info(IndicatorKind::Stochastic, "Stochastic", Momentum, 1.0, Short),
    info(IndicatorKind::WilliamsR, "Williams %R", Momentum, 0.9, Short),
    info(IndicatorKind::Cci, "CCI", Momentum, 1.0, Short),
    info(IndicatorKind::Roc, "ROC", Momentum, 0.9, Medium),
    info(IndicatorKind::UltimateOscillator, "Ultimate Oscillator", Momentum, 1.0, Medium),
    info(IndicatorKind::RsiDivergence, "RSI Divergence", Momentum, 1.2, Medium),
    info(IndicatorKind::BollingerBands, "Bollinger Bands", Volatility, 1.0, Short),
    info(IndicatorKind::KeltnerChannels, "Keltner Channels", Volatility, 0.8, Short),
    info(IndicatorKind::DonchianChannels, "Donchian Channels", Volatility, 0.8, Medium),
    info(IndicatorKind::Atr, "ATR", Volatility, 0.8, Medium),
    info(IndicatorKind::Obv, "OBV", Volume, 1.0, Medium),
    info(IndicatorKind::Mfi, "MFI", Volume, 1.1, Short),
    info(IndicatorKind::Cmf, "CMF", Volume, 1.0, Medium),
    info(IndicatorKind::VolumeProfile, "Volume Profile", Volume, 0.9, Strategic),
    info(IndicatorKind::SupportResistance, "Support/Resistance", Levels, 1.2, Strategic),
    info(IndicatorKind::CandlestickPatterns, "Candlestick Patterns", Pattern, 0.8, Short),
];

/// Look up an indicator's catalogue entry.
pub fn catalogue_entry(kind: IndicatorKind) -> &'static IndicatorInfo {
    &CATALOGUE[kind as usize]
}

/// Classified state of one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub kind: IndicatorKind,
    pub name: String,
    pub category: IndicatorCategory,
    pub timeframe: Horizon,
    /// Signal text shown next to the indicator
    pub signal_text: String,
    /// Absent when the indicator had too little history
    pub record: Option<SignalRecord>,
}

impl Reading {
    pub fn has_data(&self) -> bool {
        self.record.is_some()
    }

    pub fn signal(&self) -> Option<i8> {
        self.record.as_ref().map(|r| r.signal)
    }
}

/// Outcome of a single classification rule.
struct Verdict {
    raw_value: f64,
    signal: i8,
    description: String,
    metadata: Option<SignalMetadata>,
}

impl Verdict {
    fn new(raw_value: f64, signal: i8, description: impl Into<String>) -> Self {
        Self {
            raw_value,
            signal,
            description: description.into(),
            metadata: None,
        }
    }

    fn with_metadata(mut self, metadata: SignalMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Band a value against symmetric oversold/overbought thresholds.
///
/// `strong_low < weak_low` and `weak_high < strong_high`; low values are
/// bullish.
fn band(value: f64, strong_low: f64, weak_low: f64, weak_high: f64, strong_high: f64) -> i8 {
    if value < strong_low {
        2
    } else if value < weak_low {
        1
    } else if value > strong_high {
        -2
    } else if value > weak_high {
        -1
    } else {
        0
    }
}

fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

fn tone(signal: i8) -> &'static str {
    match signal {
        3.. => "Strong Buy",
        2 => "Buy",
        1 => "Weak Buy",
        0 => "Neutral",
        -1 => "Weak Sell",
        -2 => "Sell",
        _ => "Strong Sell",
    }
}

/// Stateless indicator classifier.
#[derive(Debug, Clone)]
pub struct SignalClassifier {
    tolerance_pct: f64,
}

impl Default for SignalClassifier {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl SignalClassifier {
    /// Aligned moving-average points searched for a fresh cross.
    pub const CROSS_LOOKBACK: usize = 10;
    /// Bars in the OBV/price slope comparison.
    pub const OBV_SLOPE_BARS: usize = 10;
    /// ATR as a percentage of price above which volatility is penalised.
    pub const HIGH_VOLATILITY_PCT: f64 = 5.0;
    /// Bars scanned for a recent candlestick pattern.
    pub const PATTERN_RECENCY: usize = 3;

    /// Create a classifier using `tolerance_pct` for level proximity.
    pub fn new(tolerance_pct: f64) -> Self {
        Self { tolerance_pct }
    }

    /// Classify every catalogue indicator.
    pub fn classify(
        &self,
        bars: &[Bar],
        indicators: &IndicatorSet,
        detections: &Detections,
    ) -> Vec<Reading> {
        CATALOGUE
            .iter()
            .map(|entry| {
                let verdict = self.verdict(entry.kind, bars, indicators, detections);
                let reading = match verdict {
                    Some(verdict) => {
                        let mut record = SignalRecord::new(
                            entry.name,
                            entry.category,
                            verdict.raw_value,
                            verdict.signal,
                            entry.weight,
                            entry.timeframe,
                            verdict.description.clone(),
                        );
                        record.metadata = verdict.metadata;
                        Reading {
                            kind: entry.kind,
                            name: entry.name.to_string(),
                            category: entry.category,
                            timeframe: entry.timeframe,
                            signal_text: format!("{}: {}", tone(record.signal), verdict.description),
                            record: Some(record),
                        }
                    }
                    None => Reading {
                        kind: entry.kind,
                        name: entry.name.to_string(),
                        category: entry.category,
                        timeframe: entry.timeframe,
                        signal_text: NOT_ENOUGH_DATA.to_string(),
                        record: None,
                    },
                };

                debug!(indicator = entry.name, signal = ?reading.signal(), "Classified");
                reading
            })
            .collect()
    }

    fn verdict(
        &self,
        kind: IndicatorKind,
        bars: &[Bar],
        set: &IndicatorSet,
        detections: &Detections,
    ) -> Option<Verdict> {
        let close = bars.last()?.close;

        match kind {
            IndicatorKind::MovingAverages => self.moving_averages(bars, set),
            IndicatorKind::Macd => {
                let current = set.macd.last_value()?;
                let previous = set.macd.previous().map(|p| p.value);
                let hist = current.histogram;
                let (signal, text) = match previous {
                    Some(prev) if prev.histogram <= 0.0 && hist > 0.0 => (2, "Fresh bullish crossover"),
                    Some(prev) if prev.histogram >= 0.0 && hist < 0.0 => (-2, "Fresh bearish crossover"),
                    _ if hist > 0.0 => (1, "MACD above signal line"),
                    _ if hist < 0.0 => (-1, "MACD below signal line"),
                    _ => (0, "MACD on signal line"),
                };
                Some(Verdict::new(hist, signal, text))
            }
            IndicatorKind::Adx => {
                let adx = set.adx.last_value()?;
                let direction = sign(adx.plus_di - adx.minus_di);
                let (signal, text) = if adx.adx > 25.0 {
                    (2 * direction, "Strong trend")
                } else if adx.adx > 20.0 {
                    (direction, "Developing trend")
                } else {
                    (0, "No clear trend")
                };
                Some(Verdict::new(
                    adx.adx,
                    signal,
                    format!("{} (ADX {:.1}, +DI {:.1}, -DI {:.1})", text, adx.adx, adx.plus_di, adx.minus_di),
                ))
            }
            IndicatorKind::ParabolicSar => {
                let sar = set.parabolic_sar.last_value()?;
                let direction = if sar.uptrend { 1 } else { -1 };
                let (signal, text) = match (sar.reversed, sar.uptrend) {
                    (true, true) => (2, "Flipped to uptrend"),
                    (true, false) => (-2, "Flipped to downtrend"),
                    (false, true) => (direction, "SAR below price"),
                    (false, false) => (direction, "SAR above price"),
                };
                Some(Verdict::new(sar.sar, signal, text))
            }
            IndicatorKind::Aroon => {
                let aroon = set.aroon.last_value()?;
                let (signal, text) = if aroon.up > 70.0 && aroon.down < 30.0 {
                    (2, "Strong uptrend")
                } else if aroon.down > 70.0 && aroon.up < 30.0 {
                    (-2, "Strong downtrend")
                } else {
                    let s = sign(aroon.oscillator);
                    let text = match s {
                        1 => "Upward bias",
                        -1 => "Downward bias",
                        _ => "No bias",
                    };
                    (s, text)
                };
                Some(Verdict::new(aroon.oscillator, signal, text))
            }
            IndicatorKind::LinearRegression => {
                let regression = set.regression.last_value()?;
                let slope_pct = if close != 0.0 {
                    regression.slope / close * 100.0
                } else {
                    0.0
                };
                let signal = if slope_pct > 0.1 {
                    2
                } else if slope_pct > 0.0 {
                    1
                } else if slope_pct < -0.1 {
                    -2
                } else if slope_pct < 0.0 {
                    -1
                } else {
                    0
                };
                Some(
                    Verdict::new(slope_pct, signal, format!("Slope {:+.3}% per bar", slope_pct))
                        .with_metadata(SignalMetadata::Regression {
                            slope: regression.slope,
                            intercept: regression.intercept,
                            std_error: regression.std_error,
                        }),
                )
            }
            IndicatorKind::ElderRay => {
                let current = set.elder_ray.last_value()?;
                let previous = set.elder_ray.previous().map(|p| p.value.ema);
                let (signal, text) = if current.bull_power > 0.0 && current.bear_power > 0.0 {
                    (2, "Bulls in control")
                } else if current.bull_power < 0.0 && current.bear_power < 0.0 {
                    (-2, "Bears in control")
                } else {
                    match previous {
                        Some(prev) if current.ema > prev => (1, "EMA rising"),
                        Some(prev) if current.ema < prev => (-1, "EMA falling"),
                        _ => (0, "Balanced"),
                    }
                };
                Some(Verdict::new(current.bull_power + current.bear_power, signal, text))
            }
            IndicatorKind::Rsi => {
                let rsi = *set.rsi.last_value()?;
                let signal = band(rsi, 30.0, 40.0, 60.0, 70.0);
                let text = match signal {
                    2 => "Oversold",
                    1 => "Approaching oversold",
                    -2 => "Overbought",
                    -1 => "Approaching overbought",
                    _ => "Neutral zone",
                };
                Some(Verdict::new(rsi, signal, format!("{} ({:.1})", text, rsi)))
            }
            IndicatorKind::Stochastic => {
                let stoch = set.stochastic.last_value()?;
                let (signal, text) = if stoch.k < 20.0 && stoch.k > stoch.d {
                    (2, "Oversold with %K crossing up")
                } else if stoch.k < 20.0 {
                    (1, "Oversold")
                } else if stoch.k > 80.0 && stoch.k < stoch.d {
                    (-2, "Overbought with %K crossing down")
                } else if stoch.k > 80.0 {
                    (-1, "Overbought")
                } else {
                    (0, "Neutral zone")
                };
                Some(Verdict::new(stoch.k, signal, format!("{} (%K {:.1})", text, stoch.k)))
            }
            IndicatorKind::WilliamsR => {
                let value = *set.williams_r.last_value()?;
                let signal = band(value, -80.0, -70.0, -30.0, -20.0);
                Some(Verdict::new(value, signal, format!("%R {:.1}", value)))
            }
            IndicatorKind::Cci => {
                let value = *set.cci.last_value()?;
                let signal = band(value, -200.0, -100.0, 100.0, 200.0);
                Some(Verdict::new(value, signal, format!("CCI {:.1}", value)))
            }
            IndicatorKind::Roc => {
                let value = *set.roc.last_value()?;
                let signal = if value > 5.0 {
                    2
                } else if value > 0.0 {
                    1
                } else if value < -5.0 {
                    -2
                } else if value < 0.0 {
                    -1
                } else {
                    0
                };
                Some(Verdict::new(value, signal, format!("{:+.2}% change", value)))
            }
            IndicatorKind::UltimateOscillator => {
                let value = *set.ultimate_oscillator.last_value()?;
                let signal = band(value, 30.0, 40.0, 60.0, 70.0);
                Some(Verdict::new(value, signal, format!("UO {:.1}", value)))
            }
            IndicatorKind::RsiDivergence => {
                if !detections.divergence_evaluated {
                    return None;
                }
                Some(match &detections.divergence {
                    Some(divergence) => {
                        let (signal, text) = match divergence.direction {
                            Direction::Bullish => (2, "Bullish divergence"),
                            Direction::Bearish => (-2, "Bearish divergence"),
                            Direction::Neutral => (0, "No divergence"),
                        };
                        Verdict::new(divergence.rsi, signal, text).with_metadata(
                            SignalMetadata::Divergence {
                                bullish: divergence.is_bullish(),
                                timestamp: divergence.timestamp,
                            },
                        )
                    }
                    None => Verdict::new(0.0, 0, "No divergence"),
                })
            }
            IndicatorKind::BollingerBands => {
                let bands = set.bollinger.last_value()?;
                let (signal, text) = if bands.is_oversold(close) {
                    (2, "Below lower band")
                } else if bands.percent_b < 0.2 {
                    (1, "Near lower band")
                } else if bands.is_overbought(close) {
                    (-2, "Above upper band")
                } else if bands.percent_b > 0.8 {
                    (-1, "Near upper band")
                } else {
                    (0, "Inside bands")
                };
                Some(Verdict::new(bands.percent_b, signal, format!("{} (%B {:.2})", text, bands.percent_b)))
            }
            IndicatorKind::KeltnerChannels => {
                let channel = set.keltner.last_value()?;
                let (signal, text) = if channel.is_oversold(close) {
                    (1, "Below lower channel")
                } else if channel.is_overbought(close) {
                    (-1, "Above upper channel")
                } else {
                    (0, "Inside channel")
                };
                Some(Verdict::new(channel.percent_b, signal, text))
            }
            IndicatorKind::DonchianChannels => {
                let channel = set.donchian.last_value()?;
                let (signal, text) = if close >= channel.upper {
                    (2, "Breaking out to new highs")
                } else if close <= channel.lower {
                    (-2, "Breaking down to new lows")
                } else if close > channel.middle {
                    (1, "Upper half of channel")
                } else if close < channel.middle {
                    (-1, "Lower half of channel")
                } else {
                    (0, "Mid-channel")
                };
                Some(Verdict::new(channel.middle, signal, text))
            }
            IndicatorKind::Atr => {
                let atr = *set.atr.last_value()?;
                let atr_pct = if close != 0.0 { atr / close * 100.0 } else { 0.0 };
                let (signal, text) = if atr_pct > Self::HIGH_VOLATILITY_PCT {
                    (-1, "High volatility")
                } else {
                    (0, "Normal volatility")
                };
                Some(Verdict::new(atr_pct, signal, format!("{} ({:.2}% of price)", text, atr_pct)))
            }
            IndicatorKind::Obv => self.obv(bars, set),
            IndicatorKind::Mfi => {
                let mfi = *set.mfi.last_value()?;
                let signal = band(mfi, 20.0, 30.0, 70.0, 80.0);
                Some(Verdict::new(mfi, signal, format!("MFI {:.1}", mfi)))
            }
            IndicatorKind::Cmf => {
                let cmf = *set.cmf.last_value()?;
                let signal: i8 = if cmf > 0.2 {
                    2
                } else if cmf > 0.05 {
                    1
                } else if cmf < -0.2 {
                    -2
                } else if cmf < -0.05 {
                    -1
                } else {
                    0
                };
                let text = match signal.signum() {
                    1 => "Accumulation",
                    -1 => "Distribution",
                    _ => "Balanced flow",
                };
                Some(Verdict::new(cmf, signal, format!("{} ({:+.3})", text, cmf)))
            }
            IndicatorKind::VolumeProfile => {
                let profile = set.volume_profile.as_ref()?;
                let (signal, text) = if close > profile.value_area_high {
                    (2, "Above value area")
                } else if close < profile.value_area_low {
                    (-2, "Below value area")
                } else if close > profile.point_of_control {
                    (1, "Above point of control")
                } else if close < profile.point_of_control {
                    (-1, "Below point of control")
                } else {
                    (0, "At point of control")
                };
                Some(
                    Verdict::new(profile.point_of_control, signal, text).with_metadata(
                        SignalMetadata::ValueArea {
                            point_of_control: profile.point_of_control,
                            value_area_high: profile.value_area_high,
                            value_area_low: profile.value_area_low,
                        },
                    ),
                )
            }
            IndicatorKind::SupportResistance => self.levels(close, detections),
            IndicatorKind::CandlestickPatterns => {
                if bars.len() < Self::PATTERN_RECENCY {
                    return None;
                }
                let recent_from = bars.len() - Self::PATTERN_RECENCY;
                let newest = detections
                    .patterns
                    .iter()
                    .rev()
                    .find(|m| m.index >= recent_from);

                Some(match newest {
                    Some(found) => {
                        let magnitude: i8 = if found.strength == SignalStrength::Strong { 2 } else { 1 };
                        let signal = match found.direction {
                            Direction::Bullish => magnitude,
                            Direction::Bearish => -magnitude,
                            Direction::Neutral => 0,
                        };
                        Verdict::new(signal as f64, signal, found.pattern.to_string()).with_metadata(
                            SignalMetadata::Pattern {
                                name: found.pattern.to_string(),
                                strength: found.strength,
                            },
                        )
                    }
                    None => Verdict::new(0.0, 0, "No recent pattern"),
                })
            }
        }
    }

    fn moving_averages(&self, bars: &[Bar], set: &IndicatorSet) -> Option<Verdict> {
        let close = bars.last()?.close;
        let ma = &set.moving_averages;
        let sma50 = *ma.sma50.last_value()?;

        if ma.sma200.is_empty() {
            let signal = sign(close - sma50);
            let text = match signal {
                1 => "Price above SMA50",
                -1 => "Price below SMA50",
                _ => "Price at SMA50",
            };
            return Some(Verdict::new(sma50, signal, text).with_metadata(
                SignalMetadata::MovingAverages {
                    sma50,
                    sma200: None,
                    golden_cross: false,
                    death_cross: false,
                },
            ));
        }

        // SMA50 minus SMA200 on the bars where both exist
        let spreads: Vec<f64> = ma
            .sma200
            .points()
            .iter()
            .filter_map(|p| ma.sma50.value_at(p.timestamp).map(|fast| fast - p.value))
            .collect();
        let sma200 = *ma.sma200.last_value()?;
        let spread = sma50 - sma200;

        let golden_cross = confirmed_cross(&spreads, 1.0) && close > sma50;
        let death_cross = confirmed_cross(&spreads, -1.0) && close < sma50;

        let (signal, text) = if golden_cross {
            (3, "Golden cross")
        } else if death_cross {
            (-3, "Death cross")
        } else if spread > 0.0 && close > sma50 {
            (2, "SMA50 above SMA200, price above SMA50")
        } else if spread > 0.0 {
            (1, "SMA50 above SMA200")
        } else if spread < 0.0 && close < sma50 {
            (-2, "SMA50 below SMA200, price below SMA50")
        } else if spread < 0.0 {
            (-1, "SMA50 below SMA200")
        } else {
            (0, "Averages converged")
        };

        Some(
            Verdict::new(spread, signal, text).with_metadata(SignalMetadata::MovingAverages {
                sma50,
                sma200: Some(sma200),
                golden_cross,
                death_cross,
            }),
        )
    }

    fn obv(&self, bars: &[Bar], set: &IndicatorSet) -> Option<Verdict> {
        let n = Self::OBV_SLOPE_BARS;
        if set.obv.len() < n || bars.len() < n {
            return None;
        }

        let obv = set.obv.to_vec();
        let closes: Vec<f64> = bars[bars.len() - n..].iter().map(|b| b.close).collect();
        let obv_slope = LineFit::fit(&obv[obv.len() - n..])?.slope;
        let price_slope = LineFit::fit(&closes)?.slope;

        let (signal, text) = if obv_slope > 0.0 && price_slope > 0.0 {
            (2, "Volume confirms rising price")
        } else if obv_slope > 0.0 {
            (1, "Accumulation while price lags")
        } else if obv_slope < 0.0 && price_slope < 0.0 {
            (-2, "Volume confirms falling price")
        } else if obv_slope < 0.0 {
            (-1, "Distribution while price holds")
        } else {
            (0, "Flat volume trend")
        };

        Some(Verdict::new(*set.obv.last_value()?, signal, text))
    }

    fn levels(&self, close: f64, detections: &Detections) -> Option<Verdict> {
        let levels = &detections.levels;
        if levels.is_empty() {
            return None;
        }

        let tolerance = self.tolerance_pct / 100.0;
        let nearest = |side: &[f64]| {
            side.iter()
                .copied()
                .min_by(|a, b| (a - close).abs().total_cmp(&(b - close).abs()))
        };
        let support = nearest(&levels.support);
        let resistance = nearest(&levels.resistance);
        let near = |level: f64| level != 0.0 && ((close - level) / level).abs() <= tolerance;

        let (signal, text) = match (support, resistance) {
            (Some(s), _) if near(s) => (2, format!("Testing support at {:.2}", s)),
            (_, Some(r)) if near(r) => (-2, format!("Testing resistance at {:.2}", r)),
            (Some(s), Some(r)) if (close - s).abs() <= (r - close).abs() => {
                (1, format!("Closer to support at {:.2}", s))
            }
            (Some(_), Some(r)) => (-1, format!("Closer to resistance at {:.2}", r)),
            (Some(s), None) => (1, format!("Closer to support at {:.2}", s)),
            (None, Some(r)) => (-1, format!("Closer to resistance at {:.2}", r)),
            (None, None) => return None,
        };

        Some(
            Verdict::new(close, signal, text).with_metadata(SignalMetadata::Levels {
                support: levels.support.clone(),
                resistance: levels.resistance.clone(),
            }),
        )
    }
}

/// Whether the spread crossed zero in direction `direction` within the
/// lookback, held that side afterwards and did not cross on the newest point.
fn confirmed_cross(spreads: &[f64], direction: f64) -> bool {
    if spreads.len() < 3 {
        return false;
    }

    let start = spreads.len().saturating_sub(SignalClassifier::CROSS_LOOKBACK + 1);
    let window = &spreads[start..];
    let last = window.len() - 1;

    (1..last).rev().any(|i| {
        window[i - 1] * direction <= 0.0
            && window[i] * direction > 0.0
            && window[i..].iter().all(|s| s * direction > 0.0)
    })
}
