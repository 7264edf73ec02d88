//! Core types and traits for the technical analysis engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries, Timeframe)
//! - Indicator output series and signal records
//! - Recommendation horizons
//! - Core traits for indicators and bar sources

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AnalysisError, DataError, IndicatorError, InsightError, InsightResult};
pub use traits::*;
pub use types::*;
