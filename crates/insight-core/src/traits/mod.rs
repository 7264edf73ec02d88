//! Core traits for the analysis engine.

mod data_source;
mod indicator;

pub use data_source::{BarSource, SeriesRequest};
pub use indicator::Indicator;
