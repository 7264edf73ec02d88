//! Candlestick pattern recognition.

use insight_core::types::{Bar, Direction, SignalStrength};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognised candlestick formations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandlestickPattern {
    Doji,
    Hammer,
    HangingMan,
    BullishEngulfing,
    BearishEngulfing,
    MorningStar,
    EveningStar,
    PiercingLine,
    DarkCloudCover,
}

impl CandlestickPattern {
    /// Market direction the pattern points to.
    pub fn direction(&self) -> Direction {
        match self {
            CandlestickPattern::Doji => Direction::Neutral,
            CandlestickPattern::Hammer
            | CandlestickPattern::BullishEngulfing
            | CandlestickPattern::MorningStar
            | CandlestickPattern::PiercingLine => Direction::Bullish,
            CandlestickPattern::HangingMan
            | CandlestickPattern::BearishEngulfing
            | CandlestickPattern::EveningStar
            | CandlestickPattern::DarkCloudCover => Direction::Bearish,
        }
    }

    /// Reliability of the formation.
    pub fn strength(&self) -> SignalStrength {
        match self {
            CandlestickPattern::Doji => SignalStrength::Weak,
            CandlestickPattern::Hammer
            | CandlestickPattern::HangingMan
            | CandlestickPattern::PiercingLine
            | CandlestickPattern::DarkCloudCover => SignalStrength::Moderate,
            CandlestickPattern::BullishEngulfing
            | CandlestickPattern::BearishEngulfing
            | CandlestickPattern::MorningStar
            | CandlestickPattern::EveningStar => SignalStrength::Strong,
        }
    }
}

impl fmt::Display for CandlestickPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CandlestickPattern::Doji => "Doji",
            CandlestickPattern::Hammer => "Hammer",
            CandlestickPattern::HangingMan => "Hanging Man",
            CandlestickPattern::BullishEngulfing => "Bullish Engulfing",
            CandlestickPattern::BearishEngulfing => "Bearish Engulfing",
            CandlestickPattern::MorningStar => "Morning Star",
            CandlestickPattern::EveningStar => "Evening Star",
            CandlestickPattern::PiercingLine => "Piercing Line",
            CandlestickPattern::DarkCloudCover => "Dark Cloud Cover",
        };
        write!(f, "{}", s)
    }
}

/// A pattern found at a bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern: CandlestickPattern,
    /// Index of the completing bar
    pub index: usize,
    /// Timestamp of the completing bar
    pub timestamp: i64,
    pub direction: Direction,
    pub strength: SignalStrength,
}

/// Scans bars for candlestick formations.
#[derive(Debug, Clone)]
pub struct CandlestickScanner {
    limit: usize,
    trend_lookback: usize,
}

impl Default for CandlestickScanner {
    fn default() -> Self {
        Self::new(10)
    }
}

impl CandlestickScanner {
    /// Body/range ratio under which a bar is a doji.
    pub const DOJI_BODY_RATIO: f64 = 0.1;

    /// Create a scanner keeping the `limit` most recent matches.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            trend_lookback: 5,
        }
    }

    /// Most recent matches, oldest first. At most one pattern per bar;
    /// three-bar formations take precedence over two-bar and single-bar ones.
    pub fn scan(&self, bars: &[Bar]) -> Vec<PatternMatch> {
        let mut matches: Vec<PatternMatch> = (0..bars.len())
            .filter_map(|i| {
                self.detect_at(bars, i).map(|pattern| PatternMatch {
                    pattern,
                    index: i,
                    timestamp: bars[i].timestamp,
                    direction: pattern.direction(),
                    strength: pattern.strength(),
                })
            })
            .collect();

        if matches.len() > self.limit {
            matches.drain(..matches.len() - self.limit);
        }
        matches
    }

    fn detect_at(&self, bars: &[Bar], i: usize) -> Option<CandlestickPattern> {
        let bar = &bars[i];

        if i >= 2 {
            if let Some(pattern) = star(&bars[i - 2], &bars[i - 1], bar) {
                return Some(pattern);
            }
        }

        if i >= 1 {
            let prev = &bars[i - 1];
            if let Some(pattern) = engulfing(prev, bar).or_else(|| piercing(prev, bar)) {
                return Some(pattern);
            }
        }

        if is_hammer_shape(bar) && i >= self.trend_lookback {
            let start = bars[i - self.trend_lookback].close;
            let end = bars[i - 1].close;
            if end < start {
                return Some(CandlestickPattern::Hammer);
            }
            if end > start {
                return Some(CandlestickPattern::HangingMan);
            }
        }

        let range = bar.range();
        if range > 0.0 && bar.body() / range < Self::DOJI_BODY_RATIO {
            return Some(CandlestickPattern::Doji);
        }

        None
    }
}

fn is_hammer_shape(bar: &Bar) -> bool {
    let body = bar.body();
    body > 0.0 && bar.lower_shadow() > 2.0 * body && bar.upper_shadow() < 0.5 * body
}

fn engulfing(prev: &Bar, bar: &Bar) -> Option<CandlestickPattern> {
    if prev.is_bearish() && bar.is_bullish() && bar.open <= prev.close && bar.close >= prev.open {
        return Some(CandlestickPattern::BullishEngulfing);
    }
    if prev.is_bullish() && bar.is_bearish() && bar.open >= prev.close && bar.close <= prev.open {
        return Some(CandlestickPattern::BearishEngulfing);
    }
    None
}

fn piercing(prev: &Bar, bar: &Bar) -> Option<CandlestickPattern> {
    let midpoint = prev.body_midpoint();
    if prev.is_bearish()
        && bar.is_bullish()
        && bar.open < prev.close
        && bar.close > midpoint
        && bar.close < prev.open
    {
        return Some(CandlestickPattern::PiercingLine);
    }
    if prev.is_bullish()
        && bar.is_bearish()
        && bar.open > prev.close
        && bar.close < midpoint
        && bar.close > prev.open
    {
        return Some(CandlestickPattern::DarkCloudCover);
    }
    None
}

fn star(first: &Bar, middle: &Bar, last: &Bar) -> Option<CandlestickPattern> {
    let first_body = first.body();
    // First candle must have a real body and the middle one must be small
    if first_body == 0.0 || first_body < 0.5 * first.range() || middle.body() > 0.3 * first_body {
        return None;
    }

    let midpoint = first.body_midpoint();
    if first.is_bearish() && last.is_bullish() && last.close > midpoint {
        return Some(CandlestickPattern::MorningStar);
    }
    if first.is_bullish() && last.is_bearish() && last.close < midpoint {
        return Some(CandlestickPattern::EveningStar);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar::new(day * 86_400_000, open, high, low, close, 1_000.0)
    }

    fn falling(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let close = 100.0 - i as f64 * 2.0;
                bar(i as i64, close + 1.5, close + 2.0, close - 0.5, close)
            })
            .collect()
    }

    #[test]
    fn test_doji() {
        let bars = vec![bar(0, 10.0, 11.0, 9.0, 10.05)];
        let found = CandlestickScanner::default().scan(&bars);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pattern, CandlestickPattern::Doji);
        assert_eq!(found[0].strength, SignalStrength::Weak);
    }

    #[test]
    fn test_hammer_after_downtrend() {
        let mut bars = falling(6);
        // Long lower shadow, tiny upper shadow
        bars.push(bar(6, 88.0, 89.1, 84.0, 89.0));
        let found = CandlestickScanner::default().scan(&bars);

        let last = found.last().unwrap();
        assert_eq!(last.pattern, CandlestickPattern::Hammer);
        assert_eq!(last.direction, Direction::Bullish);
        assert_eq!(last.index, 6);
    }

    #[test]
    fn test_hanging_man_after_uptrend() {
        let mut bars: Vec<Bar> = (0..6)
            .map(|i| {
                let close = 50.0 + i as f64 * 2.0;
                bar(i, close - 1.5, close + 0.5, close - 2.0, close)
            })
            .collect();
        bars.push(bar(6, 61.0, 62.1, 57.0, 62.0));
        let found = CandlestickScanner::default().scan(&bars);

        assert_eq!(found.last().unwrap().pattern, CandlestickPattern::HangingMan);
    }

    #[test]
    fn test_bullish_engulfing() {
        let bars = vec![bar(0, 10.0, 10.2, 8.8, 9.0), bar(1, 8.9, 10.6, 8.8, 10.5)];
        let found = CandlestickScanner::default().scan(&bars);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pattern, CandlestickPattern::BullishEngulfing);
        assert_eq!(found[0].strength, SignalStrength::Strong);
    }

    #[test]
    fn test_dark_cloud_cover() {
        let bars = vec![bar(0, 10.0, 12.1, 9.9, 12.0), bar(1, 12.5, 12.6, 10.4, 10.5)];
        let found = CandlestickScanner::default().scan(&bars);

        assert_eq!(found.last().unwrap().pattern, CandlestickPattern::DarkCloudCover);
    }

    #[test]
    fn test_morning_star() {
        let bars = vec![
            bar(0, 20.0, 20.2, 15.8, 16.0),
            bar(1, 15.5, 15.8, 15.0, 15.4),
            bar(2, 15.6, 19.2, 15.5, 19.0),
        ];
        let found = CandlestickScanner::default().scan(&bars);

        let last = found.last().unwrap();
        assert_eq!(last.pattern, CandlestickPattern::MorningStar);
        assert_eq!(last.index, 2);
    }

    #[test]
    fn test_limit_keeps_most_recent() {
        let bars: Vec<Bar> = (0..30).map(|i| bar(i, 10.0, 11.0, 9.0, 10.0)).collect();
        let found = CandlestickScanner::default().scan(&bars);

        assert_eq!(found.len(), 10);
        assert_eq!(found[0].index, 20);
        assert_eq!(found[9].index, 29);
    }
}
