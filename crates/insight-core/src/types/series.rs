//! Indicator output series.

use serde::{Deserialize, Serialize};

/// One indicator value stamped with the last bar of its window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point<T> {
    /// Timestamp of the last bar in the window (Unix ms)
    pub timestamp: i64,
    /// Indicator value
    pub value: T,
}

/// Ordered indicator output, never longer than the input bars.
///
/// An empty series means the input was too short for the indicator's
/// warm-up and must be read as "not enough data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSeries<T> {
    points: Vec<Point<T>>,
}

impl<T> IndicatorSeries<T> {
    /// Create an empty series.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create an empty series with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Append a point.
    pub fn push(&mut self, timestamp: i64, value: T) {
        self.points.push(Point { timestamp, value });
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the indicator had insufficient data.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points.
    pub fn points(&self) -> &[Point<T>] {
        &self.points
    }

    /// Most recent point.
    pub fn last(&self) -> Option<&Point<T>> {
        self.points.last()
    }

    /// Point before the most recent one.
    pub fn previous(&self) -> Option<&Point<T>> {
        self.points.len().checked_sub(2).map(|i| &self.points[i])
    }

    /// Most recent value.
    pub fn last_value(&self) -> Option<&T> {
        self.points.last().map(|p| &p.value)
    }

    /// Iterate over the values.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.points.iter().map(|p| &p.value)
    }

    /// Find the value stamped with `timestamp`.
    pub fn value_at(&self, timestamp: i64) -> Option<&T> {
        self.points
            .binary_search_by_key(&timestamp, |p| p.timestamp)
            .ok()
            .map(|i| &self.points[i].value)
    }
}

impl IndicatorSeries<f64> {
    /// Copy the values out as a plain vector.
    pub fn to_vec(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

impl<T> Default for IndicatorSeries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(i64, T)> for IndicatorSeries<T> {
    fn from_iter<I: IntoIterator<Item = (i64, T)>>(iter: I) -> Self {
        Self {
            points: iter
                .into_iter()
                .map(|(timestamp, value)| Point { timestamp, value })
                .collect(),
        }
    }
}
