//! Seeded random-walk bars used when live data is unavailable.

use async_trait::async_trait;
use chrono::Utc;
use insight_core::error::DataError;
use insight_core::traits::{BarSource, SeriesRequest};
use insight_core::types::Bar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Random walk parameters, expressed per bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Base seed; `None` draws a fresh seed per request
    pub seed: Option<u64>,
    /// Mean log return per bar
    pub drift: f64,
    /// Standard deviation of the log return per bar
    pub volatility: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: Some(42),
            drift: 0.0003,
            volatility: 0.015,
        }
    }
}

/// Generates geometric random-walk bars that satisfy the OHLC invariants.
///
/// With a fixed seed the same symbol always produces the same walk.
#[derive(Debug, Clone, Default)]
pub struct SyntheticSource {
    config: SyntheticConfig,
    end_timestamp: Option<i64>,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self {
            config,
            end_timestamp: None,
        }
    }

    /// Pin the timestamp of the newest bar instead of using the current time.
    pub fn with_end_timestamp(mut self, timestamp: i64) -> Self {
        self.end_timestamp = Some(timestamp);
        self
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Generate `request.output_size` bars, oldest first.
    pub fn generate(&self, request: &SeriesRequest) -> Vec<Bar> {
        let symbol_hash = fnv1a(&request.symbol.to_uppercase());
        let seed = match self.config.seed {
            Some(seed) => seed ^ symbol_hash,
            None => rand::thread_rng().gen(),
        };
        let mut rng = StdRng::seed_from_u64(seed);

        let step = request.timeframe.as_millis() as i64;
        let end = self.end_timestamp.unwrap_or_else(|| {
            let now = Utc::now().timestamp_millis();
            now - now.rem_euclid(step)
        });
        let n = request.output_size;
        let volatility = self.config.volatility.abs();

        let mut close = 20.0 + (symbol_hash % 480) as f64;
        let base_volume = 200_000.0 + (symbol_hash % 1_800_000) as f64;
        let mut bars = Vec::with_capacity(n);

        for i in 0..n {
            let open = close * (1.0 + normal(&mut rng) * volatility * 0.25).max(0.5);
            close = open * (self.config.drift + normal(&mut rng) * volatility).exp();

            let wick_up = rng.gen::<f64>() * volatility * 0.5;
            let wick_down = rng.gen::<f64>() * volatility * 0.5;
            let high = open.max(close) * (1.0 + wick_up);
            let low = open.min(close) * (1.0 - wick_down).max(0.01);
            let volume = (base_volume * (0.5 + rng.gen::<f64>())).round();

            let timestamp = end - (n - 1 - i) as i64 * step;
            bars.push(Bar::new(timestamp, open, high, low, close, volume));
        }

        bars
    }
}

#[async_trait]
impl BarSource for SyntheticSource {
    async fn fetch_bars(&self, request: &SeriesRequest) -> Result<Vec<Bar>, DataError> {
        if request.output_size == 0 {
            return Err(DataError::NoDataAvailable);
        }
        Ok(self.generate(request))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

/// Standard normal draw via Box-Muller.
fn normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn fnv1a(s: &str) -> u64 {
    s.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, b| {
        (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
    })
}
