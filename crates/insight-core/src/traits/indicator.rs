//! Indicator trait definitions.

use crate::error::IndicatorError;
use crate::types::{Bar, IndicatorSeries};

/// Trait for technical indicators.
///
/// Indicators map an ascending bar sequence to a derived series. Each output
/// point is stamped with the last bar of its window, so the output is never
/// longer than the input. Too little input yields an empty series, not an
/// error.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given bars.
    fn calculate(&self, bars: &[Bar]) -> IndicatorSeries<Self::Output>;

    /// Get the minimum number of bars required for one output value.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data.
    fn validate_data(&self, bars: &[Bar]) -> Result<(), IndicatorError> {
        if bars.len() < self.period() {
            return Err(IndicatorError::InsufficientData {
                required: self.period(),
                available: bars.len(),
            });
        }
        Ok(())
    }
}
