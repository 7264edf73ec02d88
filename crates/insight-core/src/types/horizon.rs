//! Investment horizons and signal timeframe tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recommendation horizon, also used to tag which horizon a signal informs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    /// One year
    Short,
    /// Two years
    Medium,
    /// Five years
    Long,
    /// Ten years
    Strategic,
}

impl Horizon {
    /// All horizons, shortest first.
    pub const ALL: [Horizon; 4] = [
        Horizon::Short,
        Horizon::Medium,
        Horizon::Long,
        Horizon::Strategic,
    ];

    /// Horizon length in years.
    pub fn years(&self) -> f64 {
        match self {
            Horizon::Short => 1.0,
            Horizon::Medium => 2.0,
            Horizon::Long => 5.0,
            Horizon::Strategic => 10.0,
        }
    }

    /// Signal tags that inform a recommendation over this horizon.
    pub fn relevant_tags(&self) -> &'static [Horizon] {
        match self {
            Horizon::Short => &[Horizon::Short],
            Horizon::Medium => &[Horizon::Short, Horizon::Medium],
            Horizon::Long => &[Horizon::Short, Horizon::Medium, Horizon::Long],
            Horizon::Strategic => &[Horizon::Medium, Horizon::Long, Horizon::Strategic],
        }
    }

    /// Whether a signal tagged `tag` is used for this horizon.
    pub fn includes(&self, tag: Horizon) -> bool {
        self.relevant_tags().contains(&tag)
    }

    /// Number of key drivers reported for this horizon.
    pub fn driver_count(&self) -> usize {
        match self {
            Horizon::Short => 3,
            _ => 5,
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Horizon::Short => "1 Year",
            Horizon::Medium => "2 Years",
            Horizon::Long => "5 Years",
            Horizon::Strategic => "10 Years",
        };
        write!(f, "{}", s)
    }
}
