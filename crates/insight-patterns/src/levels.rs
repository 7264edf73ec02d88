//! Support and resistance levels from clustered swing points.

use insight_core::types::Bar;
use serde::{Deserialize, Serialize};

/// Clustered price levels, each side sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
}

impl SupportResistance {
    /// Highest support strictly below `price`.
    pub fn nearest_support_below(&self, price: f64) -> Option<f64> {
        self.support
            .iter()
            .copied()
            .filter(|level| *level < price)
            .fold(None, |best, level| Some(best.map_or(level, |b: f64| b.max(level))))
    }

    /// Lowest resistance strictly above `price`.
    pub fn nearest_resistance_above(&self, price: f64) -> Option<f64> {
        self.resistance
            .iter()
            .copied()
            .filter(|level| *level > price)
            .fold(None, |best, level| Some(best.map_or(level, |b: f64| b.min(level))))
    }

    pub fn is_empty(&self) -> bool {
        self.support.is_empty() && self.resistance.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Cluster {
    sum: f64,
    count: usize,
    last_index: usize,
}

impl Cluster {
    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Finds swing highs and lows and collapses nearby ones into levels.
#[derive(Debug, Clone)]
pub struct LevelDetector {
    tolerance_pct: f64,
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl LevelDetector {
    /// Bars compared on each side of a candidate swing point.
    pub const NEIGHBORS: usize = 2;
    /// Clusters kept per side.
    pub const MAX_LEVELS: usize = 5;

    /// Create a detector clustering within `tolerance_pct` percent.
    pub fn new(tolerance_pct: f64) -> Self {
        Self { tolerance_pct }
    }

    /// Detect the most recent support and resistance clusters.
    pub fn detect(&self, bars: &[Bar]) -> SupportResistance {
        let n = Self::NEIGHBORS;
        if bars.len() < 2 * n + 1 {
            return SupportResistance::default();
        }

        let mut highs = Vec::new();
        let mut lows = Vec::new();

        for i in n..bars.len() - n {
            let neighbors = bars[i - n..i].iter().chain(&bars[i + 1..=i + n]);
            let (mut is_high, mut is_low) = (true, true);
            for other in neighbors {
                is_high &= bars[i].high > other.high;
                is_low &= bars[i].low < other.low;
            }
            if is_high {
                highs.push((i, bars[i].high));
            }
            if is_low {
                lows.push((i, bars[i].low));
            }
        }

        SupportResistance {
            support: self.collapse(&lows),
            resistance: self.collapse(&highs),
        }
    }

    fn collapse(&self, extrema: &[(usize, f64)]) -> Vec<f64> {
        let tolerance = self.tolerance_pct / 100.0;
        let mut clusters: Vec<Cluster> = Vec::new();

        for &(index, price) in extrema {
            let existing = clusters.iter_mut().find(|cluster| {
                let mean = cluster.mean();
                mean != 0.0 && ((price - mean) / mean).abs() <= tolerance
            });

            match existing {
                Some(cluster) => {
                    cluster.sum += price;
                    cluster.count += 1;
                    cluster.last_index = index;
                }
                None => clusters.push(Cluster {
                    sum: price,
                    count: 1,
                    last_index: index,
                }),
            }
        }

        clusters.sort_by(|a, b| b.last_index.cmp(&a.last_index));
        clusters.truncate(Self::MAX_LEVELS);

        let mut levels: Vec<f64> = clusters.iter().map(Cluster::mean).collect();
        levels.sort_by(|a, b| a.total_cmp(b));
        levels
    }
}
