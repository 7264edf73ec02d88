//! Error types for the analysis engine.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Bar source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Invalid bar at {timestamp}: {reason}")]
    InvalidBar { timestamp: i64, reason: String },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Request queue closed")]
    QueueClosed,
}

/// Indicator calculation errors.
#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },
}

/// Scoring and recommendation errors.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Empty bar series for {0}")]
    EmptySeries(String),

    #[error("Invalid blend weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid analysis settings: {0}")]
    InvalidSettings(String),
}

/// Result type alias for engine operations.
pub type InsightResult<T> = Result<T, InsightError>;
