//! Full pipeline over generated series.

use insight_core::types::{Bar, BarSeries, SeriesSource, Timeframe, NOT_ENOUGH_DATA};
use insight_signals::{IndicatorKind, TechnicalAnalyzer};

const DAY_MS: i64 = 86_400_000;

fn wave_series(n: usize) -> BarSeries {
    let bars = (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + t * 0.05 + (t * 0.15).sin() * 6.0 + (t * 0.037).cos() * 3.0;
            let open = close - (t * 0.9).sin() * 0.8;
            let high = close.max(open) + 0.6 + (t * 0.3).cos().abs();
            let low = close.min(open) - 0.6 - (t * 0.4).sin().abs();
            let volume = 10_000.0 + (t * 0.2).sin().abs() * 5_000.0;
            Bar::new(i as i64 * DAY_MS, open, high, low, close, volume)
        })
        .collect();
    BarSeries::new("WAVE", Timeframe::Daily, bars)
}

fn rising_series(n: usize) -> BarSeries {
    let bars = (0..n)
        .map(|i| {
            let close = 50.0 + i as f64 * 0.5;
            Bar::new(i as i64 * DAY_MS, close - 0.2, close + 0.5, close - 0.5, close, 20_000.0)
        })
        .collect();
    BarSeries::new("RISE", Timeframe::Daily, bars)
}

#[test]
fn test_full_report_invariants() {
    let series = wave_series(400);
    let report = TechnicalAnalyzer::default().analyze(&series).unwrap();

    assert_eq!(report.bar_count, 400);
    assert_eq!(report.source, SeriesSource::Live);
    assert_eq!(report.readings.len(), 24);
    assert!(report.readings.iter().all(|r| r.signal_text != NOT_ENOUGH_DATA));

    assert!((0.0..=100.0).contains(&report.score.score));
    assert_eq!(report.score.total(), report.records().len());
    for record in report.records() {
        assert!((-3..=3).contains(&record.signal));
        assert!(record.weight > 0.0);
    }

    assert!(report.indicators.rsi.values().all(|v| (0.0..=100.0).contains(v)));
    assert!(report
        .indicators
        .stochastic
        .values()
        .all(|s| (0.0..=100.0).contains(&s.k)));
    assert!(report
        .indicators
        .williams_r
        .values()
        .all(|v| (-100.0..=0.0).contains(v)));

    assert_eq!(report.horizons.len(), 4);
    for horizon in &report.horizons {
        assert!(horizon.target_price > 0.0);
        assert!((0.0..=100.0).contains(&horizon.confidence));
        assert!(horizon.drivers.len() <= horizon.horizon.driver_count());
    }

    assert!(report.patterns.len() <= 10);
    assert!(report.levels.support.len() <= 5);
    assert!(report.levels.resistance.len() <= 5);
    assert!(report.summary.contains("**WAVE**"));
}

#[test]
fn test_rising_series_properties() {
    let series = rising_series(300);
    let report = TechnicalAnalyzer::default().analyze(&series).unwrap();

    assert_eq!(report.indicators.rsi.last_value(), Some(&100.0));
    assert!(report
        .indicators
        .macd
        .values()
        .all(|m| m.histogram >= -1e-9));

    let obv = report.indicators.obv.to_vec();
    assert!(obv.windows(2).all(|w| w[1] > w[0]));

    let ma = report
        .readings
        .iter()
        .find(|r| r.kind == IndicatorKind::MovingAverages)
        .and_then(|r| r.signal())
        .unwrap();
    assert_eq!(ma, 2);
    assert!(report.score.bullish > report.score.bearish);
    assert!(report.horizons[0].upside_pct > 0.0 || report.horizons[0].score <= 50.0);
}

#[test]
fn test_five_bar_series_reports_not_enough_data() {
    let bars: Vec<Bar> = (0..5)
        .map(|i| Bar::new(i * DAY_MS, 10.0, 10.5, 9.5, 10.0 + i as f64 * 0.1, 1_000.0))
        .collect();
    let series = BarSeries::new("TINY", Timeframe::Daily, bars);
    let report = TechnicalAnalyzer::default().analyze(&series).unwrap();

    let rsi = report
        .readings
        .iter()
        .find(|r| r.kind == IndicatorKind::Rsi)
        .unwrap();
    assert_eq!(rsi.signal_text, NOT_ENOUGH_DATA);
    assert!(report.indicators.rsi.is_empty());
    assert!(report.indicators.adx.is_empty());
}

#[test]
fn test_synthetic_source_flagged_in_summary() {
    let series = wave_series(260).with_source(SeriesSource::Synthetic);
    let report = TechnicalAnalyzer::default().analyze(&series).unwrap();

    assert_eq!(report.source, SeriesSource::Synthetic);
    assert!(report.summary.contains("synthetic"));

    let json = report.to_json().unwrap();
    assert!(json.contains("\"source\": \"synthetic\""));
}
