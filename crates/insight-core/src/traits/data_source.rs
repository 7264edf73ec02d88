//! Bar source trait definitions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::types::{Bar, Timeframe};

/// Parameters of a bar history request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesRequest {
    /// Symbol to fetch
    pub symbol: String,
    /// Bar period
    pub timeframe: Timeframe,
    /// Number of most recent bars wanted
    pub output_size: usize,
}

impl SeriesRequest {
    /// Create a request.
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, output_size: usize) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            output_size,
        }
    }

    /// Key identifying the request in caches.
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.symbol.to_uppercase(), self.timeframe)
    }
}

/// Trait for historical bar providers.
#[async_trait]
pub trait BarSource: Send + Sync {
    /// Fetch bars ordered from oldest to newest.
    async fn fetch_bars(&self, request: &SeriesRequest) -> Result<Vec<Bar>, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
