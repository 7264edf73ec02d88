//! Every indicator series and detector output for one bar series.

use insight_core::error::AnalysisError;
use insight_core::traits::Indicator;
use insight_core::types::{Bar, IndicatorSeries};
use insight_indicators::{
    Adx, AdxOutput, Aroon, AroonOutput, Atr, BollingerBands, BollingerOutput, Cci, ChannelOutput,
    Cmf, DonchianChannels, ElderRay, ElderRayOutput, KeltnerChannels, LinearRegression, Macd,
    MacdOutput, Mfi, MovingAverageBundle, Obv, ParabolicSar, RegressionOutput, Roc, Rsi,
    SarOutput, Stochastic, StochasticOutput, UltimateOscillator, VolumeProfile,
    VolumeProfileOutput, WilliamsR,
};
use insight_patterns::{
    CandlestickScanner, Divergence, DivergenceDetector, LevelDetector, PatternMatch,
    SupportResistance,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Indicator series kept for charting and classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub moving_averages: MovingAverageBundle,
    pub rsi: IndicatorSeries<f64>,
    pub macd: IndicatorSeries<MacdOutput>,
    pub bollinger: IndicatorSeries<BollingerOutput>,
    pub stochastic: IndicatorSeries<StochasticOutput>,
    pub williams_r: IndicatorSeries<f64>,
    pub adx: IndicatorSeries<AdxOutput>,
    pub parabolic_sar: IndicatorSeries<SarOutput>,
    pub obv: IndicatorSeries<f64>,
    pub atr: IndicatorSeries<f64>,
    pub mfi: IndicatorSeries<f64>,
    pub cci: IndicatorSeries<f64>,
    pub ultimate_oscillator: IndicatorSeries<f64>,
    pub roc: IndicatorSeries<f64>,
    pub aroon: IndicatorSeries<AroonOutput>,
    pub keltner: IndicatorSeries<BollingerOutput>,
    pub donchian: IndicatorSeries<ChannelOutput>,
    pub cmf: IndicatorSeries<f64>,
    pub elder_ray: IndicatorSeries<ElderRayOutput>,
    pub regression: IndicatorSeries<RegressionOutput>,
    pub volume_profile: Option<VolumeProfileOutput>,
}

impl IndicatorSet {
    /// Compute every indicator with its default parameters.
    pub fn compute(bars: &[Bar]) -> Self {
        let set = Self {
            moving_averages: MovingAverageBundle::calculate(bars),
            rsi: Rsi::default().calculate(bars),
            macd: Macd::default().calculate(bars),
            bollinger: BollingerBands::default().calculate(bars),
            stochastic: Stochastic::default().calculate(bars),
            williams_r: WilliamsR::default().calculate(bars),
            adx: Adx::default().calculate(bars),
            parabolic_sar: ParabolicSar::default().calculate(bars),
            obv: Obv::new().calculate(bars),
            atr: Atr::default().calculate(bars),
            mfi: Mfi::default().calculate(bars),
            cci: Cci::default().calculate(bars),
            ultimate_oscillator: UltimateOscillator::default().calculate(bars),
            roc: Roc::default().calculate(bars),
            aroon: Aroon::default().calculate(bars),
            keltner: KeltnerChannels::default().calculate(bars),
            donchian: DonchianChannels::default().calculate(bars),
            cmf: Cmf::default().calculate(bars),
            elder_ray: ElderRay::default().calculate(bars),
            regression: LinearRegression::default().calculate(bars),
            volume_profile: VolumeProfile::default().calculate(bars),
        };

        debug!(
            bars = bars.len(),
            rsi_points = set.rsi.len(),
            macd_points = set.macd.len(),
            sma200_points = set.moving_averages.sma200.len(),
            "Computed indicator set"
        );

        set
    }
}

/// Pattern and level detector outputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Detections {
    pub levels: SupportResistance,
    pub patterns: Vec<PatternMatch>,
    pub divergence: Option<Divergence>,
    /// Whether the series was long enough to look for a divergence
    pub divergence_evaluated: bool,
}

/// Detector parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorSettings {
    /// Clustering tolerance for support/resistance, in percent
    pub tolerance_pct: f64,
    /// Number of candlestick matches kept
    pub pattern_limit: usize,
    /// RSI points compared for divergence
    pub divergence_lookback: usize,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            tolerance_pct: 2.0,
            pattern_limit: 10,
            divergence_lookback: 20,
        }
    }
}

impl DetectorSettings {
    /// Reject values the detectors cannot work with.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.tolerance_pct.is_finite() && self.tolerance_pct > 0.0) {
            return Err(AnalysisError::InvalidSettings(format!(
                "tolerance_pct must be positive, got {}",
                self.tolerance_pct
            )));
        }
        if self.pattern_limit == 0 {
            return Err(AnalysisError::InvalidSettings(
                "pattern_limit must be positive".into(),
            ));
        }
        if self.divergence_lookback < DivergenceDetector::MIN_LOOKBACK {
            return Err(AnalysisError::InvalidSettings(format!(
                "divergence_lookback must be at least {}, got {}",
                DivergenceDetector::MIN_LOOKBACK,
                self.divergence_lookback
            )));
        }
        Ok(())
    }
}

impl Detections {
    /// Run every detector.
    ///
    /// `settings` must pass [`DetectorSettings::validate`].
    pub fn detect(bars: &[Bar], settings: &DetectorSettings) -> Self {
        let divergence_detector = DivergenceDetector::new(settings.divergence_lookback);

        Self {
            levels: LevelDetector::new(settings.tolerance_pct).detect(bars),
            patterns: CandlestickScanner::new(settings.pattern_limit).scan(bars),
            divergence: divergence_detector.detect(bars),
            divergence_evaluated: bars.len() >= divergence_detector.required_bars(),
        }
    }
}
