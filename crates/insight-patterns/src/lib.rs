//! Pattern and level detectors.
//!
//! - Candlestick formations with a discrete strength label
//! - Support/resistance levels from clustered swing points
//! - Price/RSI divergence over a trailing window

pub mod candlestick;
pub mod divergence;
pub mod levels;

pub use candlestick::{CandlestickPattern, CandlestickScanner, PatternMatch};
pub use divergence::{Divergence, DivergenceDetector};
pub use levels::{LevelDetector, SupportResistance};
