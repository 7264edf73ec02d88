//! Aggregate score over all signal records.

use insight_core::types::{Direction, SignalRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score reported when no records are available.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Weighted average of signals mapped onto 0..=100.
///
/// `50 + 50 * Σ(signal * weight) / Σ|weight|`, clamped. An empty set scores
/// 50.
pub fn weighted_score<'a>(records: impl IntoIterator<Item = &'a SignalRecord>) -> f64 {
    let (weighted, total_weight) = records
        .into_iter()
        .fold((0.0, 0.0), |(sum, weights), record| {
            (sum + record.contribution(), weights + record.weight.abs())
        });

    if total_weight == 0.0 {
        return NEUTRAL_SCORE;
    }

    (NEUTRAL_SCORE + 50.0 * weighted / total_weight).clamp(0.0, 100.0)
}

/// Nine-band rating of an aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rating {
    ExtremelyBearish,
    VeryBearish,
    Bearish,
    SlightlyBearish,
    Neutral,
    SlightlyBullish,
    Bullish,
    VeryBullish,
    ExtremelyBullish,
}

impl Rating {
    /// Band a score; each lower bound is inclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Rating::ExtremelyBullish
        } else if score >= 70.0 {
            Rating::VeryBullish
        } else if score >= 60.0 {
            Rating::Bullish
        } else if score >= 55.0 {
            Rating::SlightlyBullish
        } else if score >= 45.0 {
            Rating::Neutral
        } else if score >= 40.0 {
            Rating::SlightlyBearish
        } else if score >= 30.0 {
            Rating::Bearish
        } else if score >= 15.0 {
            Rating::VeryBearish
        } else {
            Rating::ExtremelyBearish
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::ExtremelyBearish => "EXTREMELY BEARISH",
            Rating::VeryBearish => "VERY BEARISH",
            Rating::Bearish => "BEARISH",
            Rating::SlightlyBearish => "SLIGHTLY BEARISH",
            Rating::Neutral => "NEUTRAL",
            Rating::SlightlyBullish => "SLIGHTLY BULLISH",
            Rating::Bullish => "BULLISH",
            Rating::VeryBullish => "VERY BULLISH",
            Rating::ExtremelyBullish => "EXTREMELY BULLISH",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Overall technical score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiScore {
    pub score: f64,
    pub rating: Rating,
    pub bullish: usize,
    pub neutral: usize,
    pub bearish: usize,
}

impl AiScore {
    /// Score a set of records.
    pub fn from_records(records: &[SignalRecord]) -> Self {
        let score = weighted_score(records);
        let (mut bullish, mut neutral, mut bearish) = (0, 0, 0);
        for record in records {
            match record.direction() {
                Direction::Bullish => bullish += 1,
                Direction::Neutral => neutral += 1,
                Direction::Bearish => bearish += 1,
            }
        }

        Self {
            score,
            rating: Rating::from_score(score),
            bullish,
            neutral,
            bearish,
        }
    }

    /// Number of records scored.
    pub fn total(&self) -> usize {
        self.bullish + self.neutral + self.bearish
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::types::{Horizon, IndicatorCategory};

    fn record(signal: i8, weight: f64) -> SignalRecord {
        SignalRecord::new(
            "test",
            IndicatorCategory::Momentum,
            0.0,
            signal,
            weight,
            Horizon::Short,
            "",
        )
    }

    #[test]
    fn test_empty_is_neutral() {
        let score = AiScore::from_records(&[]);
        assert_eq!(score.score, 50.0);
        assert_eq!(score.rating, Rating::Neutral);
        assert_eq!(score.total(), 0);
    }

    #[test]
    fn test_weighted_score() {
        // (2 * 1.0 + -1 * 1.0) / 2.0 = 0.5 -> 50 + 25
        let records = vec![record(2, 1.0), record(-1, 1.0)];
        assert!((weighted_score(&records) - 75.0).abs() < 1e-10);
    }

    #[test]
    fn test_score_is_clamped() {
        let records = vec![record(3, 1.5), record(3, 0.8)];
        let score = AiScore::from_records(&records);
        assert!(score.score <= 100.0 && score.score >= 0.0);
        assert_eq!(score.score, 100.0);
        assert_eq!(score.rating, Rating::ExtremelyBullish);
    }

    #[test]
    fn test_counts_sum_to_records() {
        let records = vec![record(2, 1.0), record(0, 1.2), record(-3, 0.9), record(1, 1.1)];
        let score = AiScore::from_records(&records);

        assert_eq!(score.bullish, 2);
        assert_eq!(score.neutral, 1);
        assert_eq!(score.bearish, 1);
        assert_eq!(score.total(), records.len());
    }

    #[test]
    fn test_rating_bands_inclusive() {
        assert_eq!(Rating::from_score(14.9), Rating::ExtremelyBearish);
        assert_eq!(Rating::from_score(15.0), Rating::VeryBearish);
        assert_eq!(Rating::from_score(30.0), Rating::Bearish);
        assert_eq!(Rating::from_score(40.0), Rating::SlightlyBearish);
        assert_eq!(Rating::from_score(45.0), Rating::Neutral);
        assert_eq!(Rating::from_score(55.0), Rating::SlightlyBullish);
        assert_eq!(Rating::from_score(60.0), Rating::Bullish);
        assert_eq!(Rating::from_score(70.0), Rating::VeryBullish);
        assert_eq!(Rating::from_score(85.0), Rating::ExtremelyBullish);
        assert_eq!(Rating::VeryBearish.to_string(), "VERY BEARISH");
    }
}
