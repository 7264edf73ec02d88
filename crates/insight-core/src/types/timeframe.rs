//! Bar period definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Period of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    /// Daily bars
    #[serde(rename = "1d")]
    #[default]
    Daily,
    /// Weekly bars
    #[serde(rename = "1w")]
    Weekly,
    /// Monthly bars
    #[serde(rename = "1M")]
    Monthly,
}

impl Timeframe {
    /// Get the duration of the timeframe in seconds.
    pub fn as_secs(&self) -> u64 {
        match self {
            Timeframe::Daily => 86400,
            Timeframe::Weekly => 604800,
            Timeframe::Monthly => 2592000, // Approximate (30 days)
        }
    }

    /// Get the duration of the timeframe in milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.as_secs() * 1000
    }

    /// Number of trading periods in a year.
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Timeframe::Daily => 252.0,
            Timeframe::Weekly => 52.0,
            Timeframe::Monthly => 12.0,
        }
    }

    /// Interval name used by time-series quote APIs.
    pub fn api_interval(&self) -> &'static str {
        match self {
            Timeframe::Daily => "1day",
            Timeframe::Weekly => "1week",
            Timeframe::Monthly => "1month",
        }
    }

    /// Get all available timeframes.
    pub fn all() -> &'static [Timeframe] {
        &[Timeframe::Daily, Timeframe::Weekly, Timeframe::Monthly]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Daily => "1d",
            Timeframe::Weekly => "1w",
            Timeframe::Monthly => "1M",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "1M" {
            return Ok(Timeframe::Monthly);
        }
        match s.to_lowercase().as_str() {
            "1d" | "1day" | "day" | "daily" => Ok(Timeframe::Daily),
            "1w" | "1week" | "week" | "weekly" => Ok(Timeframe::Weekly),
            "1mo" | "1month" | "month" | "monthly" => Ok(Timeframe::Monthly),
            _ => Err(format!("Invalid timeframe: {}", s)),
        }
    }
}
