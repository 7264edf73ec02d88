//! End-to-end analysis of one bar series.

use chrono::{DateTime, Utc};
use insight_core::error::AnalysisError;
use insight_core::types::{BarSeries, SeriesSource, SignalRecord, Timeframe};
use insight_patterns::{Divergence, PatternMatch, SupportResistance};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::{Reading, SignalClassifier};
use crate::horizon::{BlendWeights, HorizonRecommendation, HorizonRecommender, ProjectionContext};
use crate::indicator_set::{Detections, DetectorSettings, IndicatorSet};
use crate::score::AiScore;
use crate::summary::{render_summary, SummaryContext};

/// Tunable analysis parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub detectors: DetectorSettings,
    pub blend: BlendWeights,
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.detectors.validate()?;
        self.blend.validate()
    }
}

/// Everything the presentation layer needs for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub source: SeriesSource,
    pub bar_count: usize,
    pub last_close: f64,
    pub last_timestamp: i64,
    pub generated_at: DateTime<Utc>,
    pub indicators: IndicatorSet,
    pub readings: Vec<Reading>,
    pub score: AiScore,
    pub horizons: Vec<HorizonRecommendation>,
    pub patterns: Vec<PatternMatch>,
    pub divergence: Option<Divergence>,
    pub levels: SupportResistance,
    pub summary: String,
}

impl AnalysisReport {
    /// Signal records of every indicator that had enough data.
    pub fn records(&self) -> Vec<&SignalRecord> {
        self.readings.iter().filter_map(|r| r.record.as_ref()).collect()
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text report for terminals.
    pub fn render_text(&self) -> String {
        const RULE: &str = "───────────────────────────────────────────────────────────\n";
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str(&format!(
            "  {} ({})  last close {:.2}\n",
            self.symbol, self.timeframe, self.last_close
        ));
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        if self.source == SeriesSource::Synthetic {
            s.push_str("  ! Live data unavailable, showing a synthetic series\n\n");
        }

        s.push_str("AI SCORE\n");
        s.push_str(RULE);
        s.push_str(&format!(
            "  Score:               {:.1} / 100\n",
            self.score.score
        ));
        s.push_str(&format!("  Rating:              {}\n", self.score.rating));
        s.push_str(&format!(
            "  Signals:             {} bullish, {} neutral, {} bearish\n\n",
            self.score.bullish, self.score.neutral, self.score.bearish
        ));

        s.push_str("HORIZONS\n");
        s.push_str(RULE);
        for rec in &self.horizons {
            s.push_str(&format!(
                "  {:<10} {:<12} {:>5.1}  conf {:>4.0}%  target {:>10.2} ({:+.1}%)\n",
                rec.horizon.to_string(),
                rec.recommendation.to_string(),
                rec.score,
                rec.confidence,
                rec.target_price,
                rec.upside_pct
            ));
            for driver in &rec.drivers {
                s.push_str(&format!("      - {}\n", driver));
            }
        }
        s.push('\n');

        s.push_str("INDICATORS\n");
        s.push_str(RULE);
        for reading in &self.readings {
            let signal = reading
                .signal()
                .map(|v| format!("{:+}", v))
                .unwrap_or_else(|| "  ".into());
            s.push_str(&format!(
                "  {:<24} {:>3}  {}\n",
                reading.name, signal, reading.signal_text
            ));
        }
        s.push('\n');

        if !self.levels.is_empty() {
            s.push_str("LEVELS\n");
            s.push_str(RULE);
            let join = |levels: &[f64]| {
                levels
                    .iter()
                    .map(|l| format!("{:.2}", l))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            s.push_str(&format!("  Support:             {}\n", join(&self.levels.support)));
            s.push_str(&format!(
                "  Resistance:          {}\n\n",
                join(&self.levels.resistance)
            ));
        }

        s.push_str("SUMMARY\n");
        s.push_str(RULE);
        s.push_str(&format!("  {}\n", self.summary.replace("**", "")));
        s
    }
}

/// Runs indicators, detectors, classification, scoring and horizon
/// recommendations over a bar series.
#[derive(Debug, Clone)]
pub struct TechnicalAnalyzer {
    settings: AnalysisSettings,
    classifier: SignalClassifier,
    recommender: HorizonRecommender,
}

impl Default for TechnicalAnalyzer {
    fn default() -> Self {
        Self {
            settings: AnalysisSettings::default(),
            classifier: SignalClassifier::default(),
            recommender: HorizonRecommender::default(),
        }
    }
}

impl TechnicalAnalyzer {
    /// Create an analyzer after validating its settings.
    pub fn new(settings: AnalysisSettings) -> Result<Self, AnalysisError> {
        settings.validate()?;
        Ok(Self {
            settings,
            classifier: SignalClassifier::new(settings.detectors.tolerance_pct),
            recommender: HorizonRecommender::new(settings.blend),
        })
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Analyze a series; every value is recomputed from the bars.
    pub fn analyze(&self, series: &BarSeries) -> Result<AnalysisReport, AnalysisError> {
        let bars = series.bars();
        let last = series
            .last()
            .ok_or_else(|| AnalysisError::EmptySeries(series.symbol.clone()))?;

        let indicators = IndicatorSet::compute(bars);
        let detections = Detections::detect(bars, &self.settings.detectors);
        let readings = self.classifier.classify(bars, &indicators, &detections);

        let records: Vec<SignalRecord> = readings.iter().filter_map(|r| r.record.clone()).collect();
        let score = AiScore::from_records(&records);

        let context = ProjectionContext {
            bars,
            timeframe: series.timeframe,
            atr: indicators.atr.last_value().copied(),
            levels: &detections.levels,
            volume_profile: indicators.volume_profile.as_ref(),
        };
        let horizons = self.recommender.recommend_all(&records, &context);

        let summary = render_summary(&SummaryContext {
            symbol: &series.symbol,
            price: last.close,
            source: series.source,
            score: &score,
            horizons: &horizons,
            patterns: &detections.patterns,
            divergence: detections.divergence.as_ref(),
        });

        info!(
            symbol = %series.symbol,
            bars = bars.len(),
            signals = records.len(),
            score = score.score,
            rating = %score.rating,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            symbol: series.symbol.clone(),
            timeframe: series.timeframe,
            source: series.source,
            bar_count: bars.len(),
            last_close: last.close,
            last_timestamp: last.timestamp,
            generated_at: Utc::now(),
            indicators,
            readings,
            score,
            horizons,
            patterns: detections.patterns,
            divergence: detections.divergence,
            levels: detections.levels,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::types::Bar;

    #[test]
    fn test_empty_series_is_an_error() {
        let series = BarSeries::new("EMPTY", Timeframe::Daily, vec![]);
        let result = TechnicalAnalyzer::default().analyze(&series);
        assert!(matches!(result, Err(AnalysisError::EmptySeries(_))));
    }

    #[test]
    fn test_invalid_blend_rejected() {
        let settings = AnalysisSettings {
            blend: BlendWeights {
                cagr: 0.9,
                ..BlendWeights::default()
            },
            ..AnalysisSettings::default()
        };
        assert!(TechnicalAnalyzer::new(settings).is_err());
    }

    #[test]
    fn test_invalid_detector_settings_rejected() {
        let with = |detectors: DetectorSettings| {
            TechnicalAnalyzer::new(AnalysisSettings {
                detectors,
                ..AnalysisSettings::default()
            })
        };

        let short_lookback = with(DetectorSettings {
            divergence_lookback: 2,
            ..DetectorSettings::default()
        });
        assert!(matches!(short_lookback, Err(AnalysisError::InvalidSettings(_))));

        let zero_tolerance = with(DetectorSettings {
            tolerance_pct: 0.0,
            ..DetectorSettings::default()
        });
        assert!(matches!(zero_tolerance, Err(AnalysisError::InvalidSettings(_))));

        let no_patterns = with(DetectorSettings {
            pattern_limit: 0,
            ..DetectorSettings::default()
        });
        assert!(matches!(no_patterns, Err(AnalysisError::InvalidSettings(_))));

        let shortest = with(DetectorSettings {
            divergence_lookback: 4,
            ..DetectorSettings::default()
        })
        .unwrap();
        let bars: Vec<Bar> = (0..60)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.7).sin() * 5.0;
                Bar::new(i * 86_400_000, close, close + 1.0, close - 1.0, close, 1_000.0)
            })
            .collect();
        let series = BarSeries::new("WAVE", Timeframe::Daily, bars);
        assert!(shortest.analyze(&series).is_ok());
    }

    #[test]
    fn test_short_series_still_reports() {
        let bars: Vec<Bar> = (0..5)
            .map(|i| Bar::new(i * 86_400_000, 10.0, 11.0, 9.0, 10.0 + i as f64 * 0.1, 500.0))
            .collect();
        let series = BarSeries::new("TINY", Timeframe::Daily, bars);
        let report = TechnicalAnalyzer::default().analyze(&series).unwrap();

        assert_eq!(report.readings.len(), 24);
        assert!(report.indicators.rsi.is_empty());
        assert_eq!(report.horizons.len(), 4);
        assert_eq!(report.score.total(), report.records().len());

        let text = report.render_text();
        assert!(text.contains("AI SCORE"));
        assert!(text.contains("TINY (1d)"));
        assert!(!text.contains("**"));
    }
}
