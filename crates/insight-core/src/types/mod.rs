//! Core data types for the analysis engine.

mod horizon;
mod ohlcv;
mod series;
mod signal;
mod timeframe;

pub use horizon::Horizon;
pub use ohlcv::{Bar, BarSeries, SeriesSource};
pub use series::{IndicatorSeries, Point};
pub use signal::{
    Direction, IndicatorCategory, SignalMetadata, SignalRecord, SignalStrength, NOT_ENOUGH_DATA,
};
pub use timeframe::Timeframe;
