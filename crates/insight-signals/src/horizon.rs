//! Per-horizon recommendations, confidence and target prices.

use insight_core::error::AnalysisError;
use insight_core::types::{Bar, Horizon, IndicatorCategory, SignalRecord, Timeframe};
use insight_indicators::{LineFit, VolumeProfileOutput};
use insight_patterns::SupportResistance;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::score::{weighted_score, NEUTRAL_SCORE};

/// Seven-level recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongSell,
    Sell,
    Reduce,
    Hold,
    Accumulate,
    Buy,
    StrongBuy,
}

impl Recommendation {
    /// Band a sub-score; each lower bound is inclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            Recommendation::StrongBuy
        } else if score >= 60.0 {
            Recommendation::Buy
        } else if score >= 55.0 {
            Recommendation::Accumulate
        } else if score >= 45.0 {
            Recommendation::Hold
        } else if score >= 40.0 {
            Recommendation::Reduce
        } else if score >= 30.0 {
            Recommendation::Sell
        } else {
            Recommendation::StrongSell
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongSell => "STRONG SELL",
            Recommendation::Sell => "SELL",
            Recommendation::Reduce => "REDUCE",
            Recommendation::Hold => "HOLD",
            Recommendation::Accumulate => "ACCUMULATE",
            Recommendation::Buy => "BUY",
            Recommendation::StrongBuy => "STRONG BUY",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Confidence in percent, interpolated inside the score's band.
pub fn confidence(score: f64) -> f64 {
    let value = if score >= 70.0 {
        (70.0 + 0.8 * (score - 70.0)).min(95.0)
    } else if score >= 60.0 {
        60.0 + (score - 60.0)
    } else if score >= 55.0 {
        55.0 + (score - 55.0)
    } else if score >= 45.0 {
        40.0 + 2.0 * (5.0 - (score - 50.0).abs())
    } else if score >= 40.0 {
        55.0 + (45.0 - score)
    } else if score >= 30.0 {
        60.0 + (40.0 - score)
    } else {
        (70.0 + 0.8 * (30.0 - score)).min(95.0)
    };
    value.clamp(0.0, 100.0)
}

/// Weights of the five target-price projections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub cagr: f64,
    pub atr: f64,
    pub regression: f64,
    pub level: f64,
    pub value_area: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            cagr: 0.25,
            atr: 0.20,
            regression: 0.25,
            level: 0.15,
            value_area: 0.15,
        }
    }
}

impl BlendWeights {
    /// Weights must be non-negative and sum to one.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let weights = [self.cagr, self.atr, self.regression, self.level, self.value_area];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AnalysisError::InvalidWeights(
                "blend weights must be non-negative".into(),
            ));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(AnalysisError::InvalidWeights(format!(
                "blend weights sum to {:.4}, expected 1",
                sum
            )));
        }
        Ok(())
    }
}

/// Market context shared by every horizon's projections.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext<'a> {
    pub bars: &'a [Bar],
    pub timeframe: Timeframe,
    pub atr: Option<f64>,
    pub levels: &'a SupportResistance,
    pub volume_profile: Option<&'a VolumeProfileOutput>,
}

impl ProjectionContext<'_> {
    fn price(&self) -> f64 {
        self.bars.last().map_or(0.0, |b| b.close)
    }
}

/// The five projections before blending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetComponents {
    pub cagr: f64,
    pub atr: f64,
    pub regression: f64,
    pub level: f64,
    pub value_area: f64,
}

const MS_PER_YEAR: f64 = 365.25 * 86_400_000.0;
/// Annual growth bound for the CAGR projection.
const MAX_CAGR: f64 = 0.5;
/// Per-year adjustment applied to level and value-area targets.
const LEVEL_DRIFT_PER_YEAR: f64 = 0.03;
/// No projection may fall below this share of the current price.
const MIN_PRICE_FRACTION: f64 = 0.1;
/// Haircut applied to the blended target in the direction of the score.
const HAIRCUT: f64 = 0.05;

/// Historical growth rate compounded over the horizon.
pub fn cagr_projection(bars: &[Bar], years: f64) -> f64 {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return 0.0;
    };
    let price = last.close;
    let elapsed = (last.timestamp - first.timestamp) as f64 / MS_PER_YEAR;
    if elapsed <= 0.0 || first.close <= 0.0 || price <= 0.0 {
        return price;
    }

    let cagr = ((price / first.close).powf(1.0 / elapsed) - 1.0).clamp(-MAX_CAGR, MAX_CAGR);
    price * (1.0 + cagr).powf(years)
}

/// Price moved by ATR for every period of the horizon, scaled by how far
/// the score sits from neutral. Callers floor the result.
pub fn atr_projection(price: f64, atr: Option<f64>, periods: f64, score: f64) -> f64 {
    match atr {
        Some(atr) => price + atr * periods * (score - NEUTRAL_SCORE) / NEUTRAL_SCORE,
        None => price,
    }
}

/// Regression line over the last year of closes extended over the horizon.
pub fn regression_projection(bars: &[Bar], periods_per_year: f64, periods: f64) -> f64 {
    let price = bars.last().map_or(0.0, |b| b.close);
    let window = bars.len().min(periods_per_year.round() as usize);
    let closes: Vec<f64> = bars[bars.len() - window..].iter().map(|b| b.close).collect();

    match LineFit::fit(&closes) {
        Some(fit) => fit.value_at((window - 1) as f64) + fit.slope * periods,
        None => price,
    }
}

/// Nearest level in the score's direction, pushed out with the horizon.
pub fn level_projection(price: f64, levels: &SupportResistance, score: f64, years: f64) -> f64 {
    let drift = LEVEL_DRIFT_PER_YEAR * years;
    if score > NEUTRAL_SCORE {
        levels
            .nearest_resistance_above(price)
            .map_or(price, |level| level * (1.0 + drift))
    } else if score < NEUTRAL_SCORE {
        levels
            .nearest_support_below(price)
            .map_or(price, |level| level * (1.0 - drift))
    } else {
        price
    }
}

/// Value-area edge in the score's direction, pushed out with the horizon.
pub fn value_area_projection(
    price: f64,
    profile: Option<&VolumeProfileOutput>,
    score: f64,
    years: f64,
) -> f64 {
    let drift = LEVEL_DRIFT_PER_YEAR * years;
    match profile {
        Some(profile) if score > NEUTRAL_SCORE => profile.value_area_high * (1.0 + drift),
        Some(profile) if score < NEUTRAL_SCORE => profile.value_area_low * (1.0 - drift),
        _ => price,
    }
}

/// Recommendation for one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonRecommendation {
    pub horizon: Horizon,
    pub score: f64,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub target_price: f64,
    pub upside_pct: f64,
    pub components: TargetComponents,
    pub drivers: Vec<String>,
}

/// Builds the four horizon recommendations.
#[derive(Debug, Clone, Default)]
pub struct HorizonRecommender {
    weights: BlendWeights,
}

impl HorizonRecommender {
    pub fn new(weights: BlendWeights) -> Self {
        Self { weights }
    }

    /// Recommendations for every horizon, shortest first.
    pub fn recommend_all(
        &self,
        records: &[SignalRecord],
        context: &ProjectionContext<'_>,
    ) -> Vec<HorizonRecommendation> {
        Horizon::ALL
            .iter()
            .map(|horizon| self.recommend(*horizon, records, context))
            .collect()
    }

    /// Recommendation for one horizon.
    pub fn recommend(
        &self,
        horizon: Horizon,
        records: &[SignalRecord],
        context: &ProjectionContext<'_>,
    ) -> HorizonRecommendation {
        let relevant = relevant_records(horizon, records);
        let score = weighted_score(relevant.iter().copied());
        let recommendation = Recommendation::from_score(score);

        let price = context.price();
        let components = self.components(horizon, score, context);
        let target_price = self.blend(&components, score);
        let upside_pct = if price != 0.0 {
            (target_price - price) / price * 100.0
        } else {
            0.0
        };

        HorizonRecommendation {
            horizon,
            score,
            recommendation,
            confidence: confidence(score),
            target_price,
            upside_pct,
            components,
            drivers: key_drivers(&relevant, horizon.driver_count()),
        }
    }

    /// Each projection floored at a tenth of the current price.
    pub fn components(
        &self,
        horizon: Horizon,
        score: f64,
        context: &ProjectionContext<'_>,
    ) -> TargetComponents {
        let price = context.price();
        let years = horizon.years();
        let periods_per_year = context.timeframe.periods_per_year();
        let periods = years * periods_per_year;
        let floor = price * MIN_PRICE_FRACTION;

        TargetComponents {
            cagr: cagr_projection(context.bars, years).max(floor),
            atr: atr_projection(price, context.atr, periods, score).max(floor),
            regression: regression_projection(context.bars, periods_per_year, periods).max(floor),
            level: level_projection(price, context.levels, score, years).max(floor),
            value_area: value_area_projection(price, context.volume_profile, score, years)
                .max(floor),
        }
    }

    /// Weighted blend with the directional haircut.
    pub fn blend(&self, components: &TargetComponents, score: f64) -> f64 {
        let w = &self.weights;
        let blended = w.cagr * components.cagr
            + w.atr * components.atr
            + w.regression * components.regression
            + w.level * components.level
            + w.value_area * components.value_area;

        if score > NEUTRAL_SCORE {
            blended * (1.0 - HAIRCUT)
        } else if score < NEUTRAL_SCORE {
            blended * (1.0 + HAIRCUT)
        } else {
            blended
        }
    }
}

/// Records whose tag informs `horizon`, or all records if none does.
pub fn relevant_records(horizon: Horizon, records: &[SignalRecord]) -> Vec<&SignalRecord> {
    let subset: Vec<&SignalRecord> = records
        .iter()
        .filter(|r| horizon.includes(r.timeframe))
        .collect();
    if subset.is_empty() {
        records.iter().collect()
    } else {
        subset
    }
}

/// The strongest non-zero signals rendered as sentences.
pub fn key_drivers(records: &[&SignalRecord], count: usize) -> Vec<String> {
    let mut drivers: Vec<&SignalRecord> = records
        .iter()
        .copied()
        .filter(|r| r.signal != 0)
        .collect();
    drivers.sort_by(|a, b| b.contribution().abs().total_cmp(&a.contribution().abs()));
    drivers.into_iter().take(count).map(driver_sentence).collect()
}

/// Template sentence keyed by category and direction.
pub fn driver_sentence(record: &SignalRecord) -> String {
    let bullish = record.signal > 0;
    let template = match (record.category, bullish) {
        (IndicatorCategory::Trend, true) => "trend indicators point higher",
        (IndicatorCategory::Trend, false) => "trend indicators point lower",
        (IndicatorCategory::Momentum, true) => "momentum favours buyers",
        (IndicatorCategory::Momentum, false) => "momentum favours sellers",
        (IndicatorCategory::Volatility, true) => "price sits low within its volatility range",
        (IndicatorCategory::Volatility, false) => "volatility conditions argue for caution",
        (IndicatorCategory::Volume, true) => "volume flow shows accumulation",
        (IndicatorCategory::Volume, false) => "volume flow shows distribution",
        (IndicatorCategory::Levels, true) => "price is holding near support",
        (IndicatorCategory::Levels, false) => "price is pressing against resistance",
        (IndicatorCategory::Pattern, true) => "a bullish candlestick pattern formed",
        (IndicatorCategory::Pattern, false) => "a bearish candlestick pattern formed",
    };
    format!("{}: {} ({})", record.name, template, record.description)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, category: IndicatorCategory, signal: i8, weight: f64, tag: Horizon) -> SignalRecord {
        SignalRecord::new(name, category, 0.0, signal, weight, tag, "test")
    }

    fn rising_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64 * 0.2;
                Bar::new(i as i64 * 86_400_000, c, c + 1.0, c - 1.0, c, 1_000.0)
            })
            .collect()
    }

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(Recommendation::from_score(29.9), Recommendation::StrongSell);
        assert_eq!(Recommendation::from_score(30.0), Recommendation::Sell);
        assert_eq!(Recommendation::from_score(40.0), Recommendation::Reduce);
        assert_eq!(Recommendation::from_score(50.0), Recommendation::Hold);
        assert_eq!(Recommendation::from_score(55.0), Recommendation::Accumulate);
        assert_eq!(Recommendation::from_score(60.0), Recommendation::Buy);
        assert_eq!(Recommendation::from_score(70.0), Recommendation::StrongBuy);
        assert_eq!(Recommendation::StrongBuy.to_string(), "STRONG BUY");
    }

    #[test]
    fn test_confidence_interpolation() {
        assert!((confidence(80.0) - 78.0).abs() < 1e-10);
        assert_eq!(confidence(100.0), 94.0);
        assert_eq!(confidence(0.0), 94.0);
        assert!((confidence(50.0) - 50.0).abs() < 1e-10);
        assert!((confidence(62.0) - 62.0).abs() < 1e-10);
        assert!((confidence(42.0) - 58.0).abs() < 1e-10);
    }

    #[test]
    fn test_blend_weights_validation() {
        assert!(BlendWeights::default().validate().is_ok());
        let skewed = BlendWeights {
            cagr: 0.5,
            ..BlendWeights::default()
        };
        assert!(skewed.validate().is_err());
    }

    #[test]
    fn test_relevant_records_fallback() {
        let records = vec![record("VP", IndicatorCategory::Volume, 1, 0.9, Horizon::Strategic)];
        // Short horizon only reads short-tagged records; falls back to all
        assert_eq!(relevant_records(Horizon::Short, &records).len(), 1);

        let records = vec![
            record("RSI", IndicatorCategory::Momentum, 2, 1.3, Horizon::Short),
            record("VP", IndicatorCategory::Volume, -2, 0.9, Horizon::Strategic),
        ];
        let short = relevant_records(Horizon::Short, &records);
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].name, "RSI");
        assert_eq!(relevant_records(Horizon::Strategic, &records).len(), 1);
    }

    #[test]
    fn test_key_drivers_order_and_count() {
        let records = vec![
            record("A", IndicatorCategory::Trend, 1, 1.0, Horizon::Short),
            record("B", IndicatorCategory::Momentum, -2, 1.3, Horizon::Short),
            record("C", IndicatorCategory::Volume, 0, 1.5, Horizon::Short),
            record("D", IndicatorCategory::Levels, 2, 1.2, Horizon::Short),
            record("E", IndicatorCategory::Pattern, 1, 0.8, Horizon::Short),
        ];
        let refs: Vec<&SignalRecord> = records.iter().collect();
        let drivers = key_drivers(&refs, 3);

        assert_eq!(drivers.len(), 3);
        assert!(drivers[0].starts_with("B:"));
        assert!(drivers[0].contains("sellers"));
        assert!(drivers[1].starts_with("D:"));
        assert!(drivers[2].starts_with("A:"));
    }

    #[test]
    fn test_cagr_projection_clamped() {
        // Doubling in ~0.27 years is clamped to 50% a year
        let bars = vec![
            Bar::new(0, 10.0, 10.0, 10.0, 10.0, 1.0),
            Bar::new(100 * 86_400_000, 20.0, 20.0, 20.0, 20.0, 1.0),
        ];
        assert!((cagr_projection(&bars, 1.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_atr_projection_direction() {
        assert!(atr_projection(100.0, Some(2.0), 252.0, 75.0) > 100.0);
        assert!(atr_projection(100.0, Some(2.0), 252.0, 25.0) < 100.0);
        assert_eq!(atr_projection(100.0, None, 252.0, 75.0), 100.0);
    }

    #[test]
    fn test_atr_projection_linear_in_periods() {
        // 2.0 ATR x 252 periods x (75 - 50) / 50
        assert!((atr_projection(100.0, Some(2.0), 252.0, 75.0) - 352.0).abs() < 1e-9);
        assert!((atr_projection(100.0, Some(2.0), 126.0, 75.0) - 226.0).abs() < 1e-9);
        assert!((atr_projection(100.0, Some(2.0), 10.0, 25.0) - 90.0).abs() < 1e-9);
        assert_eq!(atr_projection(100.0, Some(2.0), 252.0, 50.0), 100.0);
    }

    #[test]
    fn test_level_projection() {
        let levels = SupportResistance {
            support: vec![90.0],
            resistance: vec![110.0],
        };
        assert!((level_projection(100.0, &levels, 70.0, 1.0) - 113.3).abs() < 1e-9);
        assert!((level_projection(100.0, &levels, 30.0, 1.0) - 87.3).abs() < 1e-9);
        assert_eq!(level_projection(100.0, &levels, 50.0, 1.0), 100.0);
    }

    #[test]
    fn test_components_floored_and_haircut() {
        let bars = rising_bars(300);
        let levels = SupportResistance::default();
        let context = ProjectionContext {
            bars: &bars,
            timeframe: Timeframe::Daily,
            atr: Some(500.0),
            levels: &levels,
            volume_profile: None,
        };
        let recommender = HorizonRecommender::default();
        let price = bars.last().unwrap().close;

        let bearish = recommender.components(Horizon::Strategic, 0.0, &context);
        assert!((bearish.atr - price * 0.1).abs() < 1e-9);

        let components = TargetComponents {
            cagr: 100.0,
            atr: 100.0,
            regression: 100.0,
            level: 100.0,
            value_area: 100.0,
        };
        assert!((recommender.blend(&components, 80.0) - 95.0).abs() < 1e-9);
        assert!((recommender.blend(&components, 20.0) - 105.0).abs() < 1e-9);
        assert!((recommender.blend(&components, 50.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_recommend_all_horizons() {
        let bars = rising_bars(300);
        let levels = SupportResistance::default();
        let context = ProjectionContext {
            bars: &bars,
            timeframe: Timeframe::Daily,
            atr: Some(1.5),
            levels: &levels,
            volume_profile: None,
        };
        let records = vec![
            record("RSI", IndicatorCategory::Momentum, 2, 1.3, Horizon::Short),
            record("MACD", IndicatorCategory::Trend, 1, 1.2, Horizon::Medium),
            record("MA", IndicatorCategory::Trend, 3, 1.5, Horizon::Long),
        ];

        let all = HorizonRecommender::default().recommend_all(&records, &context);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].horizon, Horizon::Short);
        // Short horizon only sees RSI: 50 + 50 * 2/1 clamped
        assert_eq!(all[0].score, 100.0);
        assert_eq!(all[0].recommendation, Recommendation::StrongBuy);
        assert!(all[0].drivers.len() <= 3);
        for rec in &all {
            assert!(rec.target_price > 0.0);
            assert!((0.0..=100.0).contains(&rec.confidence));
        }
    }
}
