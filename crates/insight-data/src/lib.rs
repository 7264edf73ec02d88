//! Bar series providers.
//!
//! Sources implement [`BarSource`](insight_core::traits::BarSource):
//! - [`CsvDataSource`] for local files
//! - [`QuoteApiSource`] for the HTTP quote API, throttled by a [`RequestQueue`]
//! - [`SyntheticSource`] for seeded random walks
//!
//! [`SeriesLoader`] ties a primary source to the synthetic fallback and the
//! session cache.

mod cache;
mod csv_source;
mod http_source;
mod loader;
mod rate_limit;
mod synthetic;

pub use cache::DataCache;
pub use csv_source::CsvDataSource;
pub use http_source::{parse_time_series, QuoteApiConfig, QuoteApiSource};
pub use loader::{LoadOutcome, SeriesLoader};
pub use rate_limit::{Permit, Priority, RateLimit, RequestQueue};
pub use synthetic::{SyntheticConfig, SyntheticSource};

