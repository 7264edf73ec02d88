//! Per-indicator signal records.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Horizon;

/// Signal text reported when an indicator's warm-up is not satisfied.
pub const NOT_ENOUGH_DATA: &str = "Not enough data";

/// Indicator family, used to pick driver sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorCategory {
    Trend,
    Momentum,
    Volatility,
    Volume,
    Levels,
    Pattern,
}

impl fmt::Display for IndicatorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IndicatorCategory::Trend => "Trend",
            IndicatorCategory::Momentum => "Momentum",
            IndicatorCategory::Volatility => "Volatility",
            IndicatorCategory::Volume => "Volume",
            IndicatorCategory::Levels => "Levels",
            IndicatorCategory::Pattern => "Pattern",
        };
        write!(f, "{}", s)
    }
}

/// Sign of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

impl Direction {
    /// Direction of an integer signal.
    pub fn from_signal(signal: i8) -> Self {
        match signal.signum() {
            1 => Direction::Bullish,
            -1 => Direction::Bearish,
            _ => Direction::Neutral,
        }
    }
}

/// Discrete strength label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Weak,
    Moderate,
    Strong,
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalStrength::Weak => "Weak",
            SignalStrength::Moderate => "Moderate",
            SignalStrength::Strong => "Strong",
        };
        write!(f, "{}", s)
    }
}

/// Auxiliary data some classifiers attach to their record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalMetadata {
    MovingAverages {
        sma50: f64,
        sma200: Option<f64>,
        golden_cross: bool,
        death_cross: bool,
    },
    Levels {
        support: Vec<f64>,
        resistance: Vec<f64>,
    },
    ValueArea {
        point_of_control: f64,
        value_area_high: f64,
        value_area_low: f64,
    },
    Regression {
        slope: f64,
        intercept: f64,
        std_error: f64,
    },
    Pattern {
        name: String,
        strength: SignalStrength,
    },
    Divergence {
        bullish: bool,
        timestamp: i64,
    },
}

/// Classified reading of one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// Indicator name
    pub name: String,
    /// Indicator family
    pub category: IndicatorCategory,
    /// Headline value the signal was derived from
    pub raw_value: f64,
    /// Conviction in -3..=3, sign gives direction
    pub signal: i8,
    /// Relative trust of the indicator
    pub weight: f64,
    /// Horizon the indicator informs
    pub timeframe: Horizon,
    /// Human-readable signal text
    pub description: String,
    /// Optional auxiliary data
    pub metadata: Option<SignalMetadata>,
}

impl SignalRecord {
    /// Maximum signal magnitude.
    pub const MAX_SIGNAL: i8 = 3;

    /// Create a record; the signal is clamped to -3..=3.
    pub fn new(
        name: impl Into<String>,
        category: IndicatorCategory,
        raw_value: f64,
        signal: i8,
        weight: f64,
        timeframe: Horizon,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            raw_value,
            signal: signal.clamp(-Self::MAX_SIGNAL, Self::MAX_SIGNAL),
            weight,
            timeframe,
            description: description.into(),
            metadata: None,
        }
    }

    /// Attach auxiliary data.
    pub fn with_metadata(mut self, metadata: SignalMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Direction of the signal.
    pub fn direction(&self) -> Direction {
        Direction::from_signal(self.signal)
    }

    /// Weighted contribution to the aggregate score.
    pub fn contribution(&self) -> f64 {
        self.signal as f64 * self.weight
    }
}
