//! Configuration structures.

use std::time::Duration;

use insight_core::error::InsightError;
use insight_data::{QuoteApiConfig, RateLimit, SyntheticConfig};
use insight_signals::{AnalysisSettings, BlendWeights, DetectorSettings};
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// Check value ranges the type system cannot express.
    pub fn validate(&self) -> Result<(), InsightError> {
        self.logging.validate()?;
        self.data.validate()?;
        self.analysis.validate()
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "insight".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Directory for daily log files
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    fn validate(&self) -> Result<(), InsightError> {
        match self.format.to_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(InsightError::Config(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                other
            ))),
        }
    }
}

/// Quote API and fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Bars requested per series
    pub output_size: usize,
    pub timeout_secs: u64,
    pub rate_limit: RateLimitConfig,
    pub synthetic: SyntheticSettings,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twelvedata.com".to_string(),
            api_key_env: "QUOTE_API_KEY".to_string(),
            output_size: 500,
            timeout_secs: 15,
            rate_limit: RateLimitConfig::default(),
            synthetic: SyntheticSettings::default(),
        }
    }
}

impl DataConfig {
    /// Quote API configuration; fails when the key variable is unset.
    pub fn quote_api(&self) -> Result<QuoteApiConfig, InsightError> {
        let config = QuoteApiConfig::from_env(&self.base_url, &self.api_key_env)?;
        Ok(config.with_timeout(Duration::from_secs(self.timeout_secs)))
    }

    fn validate(&self) -> Result<(), InsightError> {
        if self.output_size == 0 {
            return Err(InsightError::Config("data.output_size must be positive".into()));
        }
        if self.timeout_secs == 0 {
            return Err(InsightError::Config("data.timeout_secs must be positive".into()));
        }
        self.rate_limit.validate()?;
        self.synthetic.validate()
    }
}

/// Request queue limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
    pub delay_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let limit = RateLimit::default();
        Self {
            max_requests: limit.max_requests,
            window_secs: limit.window.as_secs(),
            delay_ms: limit.delay.as_millis() as u64,
        }
    }
}

impl RateLimitConfig {
    pub fn to_rate_limit(&self) -> RateLimit {
        RateLimit {
            max_requests: self.max_requests,
            window: Duration::from_secs(self.window_secs),
            delay: Duration::from_millis(self.delay_ms),
        }
    }

    fn validate(&self) -> Result<(), InsightError> {
        if self.max_requests == 0 || self.window_secs == 0 {
            return Err(InsightError::Config(
                "data.rate_limit needs max_requests and window_secs above zero".into(),
            ));
        }
        Ok(())
    }
}

/// Random walk used when the quote API is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSettings {
    pub seed: Option<u64>,
    pub drift: f64,
    pub volatility: f64,
}

impl Default for SyntheticSettings {
    fn default() -> Self {
        let config = SyntheticConfig::default();
        Self {
            seed: config.seed,
            drift: config.drift,
            volatility: config.volatility,
        }
    }
}

impl SyntheticSettings {
    pub fn to_synthetic(&self) -> SyntheticConfig {
        SyntheticConfig {
            seed: self.seed,
            drift: self.drift,
            volatility: self.volatility,
        }
    }

    fn validate(&self) -> Result<(), InsightError> {
        if !self.drift.is_finite() || !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(InsightError::Config(
                "data.synthetic needs finite drift and non-negative volatility".into(),
            ));
        }
        Ok(())
    }
}

/// Detector and target-blend parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Support/resistance clustering tolerance in percent
    pub tolerance_pct: f64,
    pub pattern_limit: usize,
    pub divergence_lookback: usize,
    pub blend: BlendWeights,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let detectors = DetectorSettings::default();
        Self {
            tolerance_pct: detectors.tolerance_pct,
            pattern_limit: detectors.pattern_limit,
            divergence_lookback: detectors.divergence_lookback,
            blend: BlendWeights::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn to_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            detectors: DetectorSettings {
                tolerance_pct: self.tolerance_pct,
                pattern_limit: self.pattern_limit,
                divergence_lookback: self.divergence_lookback,
            },
            blend: self.blend,
        }
    }

    fn validate(&self) -> Result<(), InsightError> {
        self.to_settings().validate()?;
        Ok(())
    }
}
