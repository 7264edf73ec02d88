//! Quote API time-series source.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use insight_core::error::DataError;
use insight_core::traits::{BarSource, SeriesRequest};
use insight_core::types::Bar;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::csv_source::parse_timestamp;
use crate::rate_limit::{Priority, RequestQueue};

/// Quote API configuration.
#[derive(Debug, Clone)]
pub struct QuoteApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl QuoteApiConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Read the API key from the named environment variable.
    pub fn from_env(base_url: impl Into<String>, key_var: &str) -> Result<Self, DataError> {
        let api_key = std::env::var(key_var)
            .map_err(|_| DataError::ApiError(format!("{} not set", key_var)))?;
        Ok(Self::new(base_url, api_key))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Time-series response body.
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    values: Vec<RawBar>,
}

/// One bar; the API encodes every number as a string.
#[derive(Debug, Deserialize)]
struct RawBar {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    #[serde(default)]
    volume: Option<String>,
}

impl RawBar {
    fn into_bar(self) -> Result<Bar, DataError> {
        let num = |field: &str, value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| DataError::ParseError(format!("invalid {} '{}'", field, value)))
        };
        let volume = match self.volume.as_deref() {
            Some(v) if !v.trim().is_empty() => num("volume", v)?,
            _ => 0.0,
        };
        let bar = Bar::new(
            parse_timestamp(&self.datetime)?,
            num("open", &self.open)?,
            num("high", &self.high)?,
            num("low", &self.low)?,
            num("close", &self.close)?,
            volume,
        );
        bar.validate()?;
        Ok(bar)
    }
}

/// Parse a time-series body into bars ordered oldest first.
///
/// The API lists bars newest first and reports failures in-band through
/// `status: "error"`.
pub fn parse_time_series(body: &str) -> Result<Vec<Bar>, DataError> {
    let response: TimeSeriesResponse =
        serde_json::from_str(body).map_err(|e| DataError::ParseError(e.to_string()))?;

    if response.status.as_deref() == Some("error") {
        let message = response.message.unwrap_or_else(|| "unknown error".into());
        if message.to_lowercase().contains("symbol") {
            return Err(DataError::SymbolNotFound(message));
        }
        return Err(DataError::ApiError(message));
    }
    if response.values.is_empty() {
        return Err(DataError::NoDataAvailable);
    }

    let mut bars = response
        .values
        .into_iter()
        .map(RawBar::into_bar)
        .collect::<Result<Vec<_>, _>>()?;
    bars.reverse();
    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

/// Bar source backed by the quote API; every request passes through the
/// shared [`RequestQueue`].
pub struct QuoteApiSource {
    client: Client,
    config: QuoteApiConfig,
    queue: Arc<RequestQueue>,
    priority: Priority,
}

impl QuoteApiSource {
    pub fn new(config: QuoteApiConfig, queue: Arc<RequestQueue>) -> Result<Self, DataError> {
        if config.api_key.trim().is_empty() {
            return Err(DataError::ApiError("API key is empty".into()));
        }
        let client = Client::builder()
            .user_agent(concat!("insight/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        info!(base_url = %config.base_url, "Quote API source ready");
        Ok(Self {
            client,
            config,
            queue,
            priority: Priority::Normal,
        })
    }

    /// Priority used for this source's requests.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/time_series", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl BarSource for QuoteApiSource {
    async fn fetch_bars(&self, request: &SeriesRequest) -> Result<Vec<Bar>, DataError> {
        let params = [
            ("symbol", request.symbol.clone()),
            ("interval", request.timeframe.api_interval().to_string()),
            ("outputsize", request.output_size.to_string()),
            ("apikey", self.config.api_key.clone()),
        ];

        let _permit = self.queue.acquire(self.priority).await?;
        debug!(symbol = %request.symbol, interval = request.timeframe.api_interval(), "Requesting time series");

        let resp = self
            .client
            .get(self.endpoint())
            .query(&params)
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound(request.symbol.clone()));
        }
        if !status.is_success() {
            return Err(DataError::ApiError(format!("{}: {}", status, body)));
        }

        let bars = parse_time_series(&body)?;
        info!(symbol = %request.symbol, bars = bars.len(), "Fetched time series");
        Ok(bars)
    }

    fn name(&self) -> &str {
        "quote-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimit;

    const BODY: &str = r#"{
        "meta": {"symbol": "ACME", "interval": "1day"},
        "status": "ok",
        "values": [
            {"datetime": "2024-01-04", "open": "12.0", "high": "13.0", "low": "11.5", "close": "12.5", "volume": "900"},
            {"datetime": "2024-01-03", "open": "11.0", "high": "12.2", "low": "10.8", "close": "12.0", "volume": "800"},
            {"datetime": "2024-01-02", "open": "10.0", "high": "11.1", "low": "9.9", "close": "11.0"}
        ]
    }"#;

    #[test]
    fn test_parse_reverses_to_oldest_first() {
        let bars = parse_time_series(BODY).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].close, 11.0);
        assert_eq!(bars[0].volume, 0.0);
        assert_eq!(bars[2].close, 12.5);
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_parse_error_status() {
        let body = r#"{"code": 400, "status": "error", "message": "**symbol** not found: XYZ"}"#;
        assert!(matches!(
            parse_time_series(body),
            Err(DataError::SymbolNotFound(_))
        ));

        let body = r#"{"code": 429, "status": "error", "message": "You have run out of API credits"}"#;
        assert!(matches!(parse_time_series(body), Err(DataError::ApiError(_))));
    }

    #[test]
    fn test_parse_rejects_bad_numbers_and_empty_values() {
        let body = r#"{"status": "ok", "values": [
            {"datetime": "2024-01-02", "open": "n/a", "high": "1", "low": "1", "close": "1"}
        ]}"#;
        assert!(matches!(parse_time_series(body), Err(DataError::ParseError(_))));
        assert!(matches!(
            parse_time_series(r#"{"status": "ok", "values": []}"#),
            Err(DataError::NoDataAvailable)
        ));
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let queue = Arc::new(RequestQueue::new(RateLimit::default()));
        let config = QuoteApiConfig::new("https://api.example.com", " ");
        assert!(QuoteApiSource::new(config, queue).is_err());
    }
}
