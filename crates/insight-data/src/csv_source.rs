//! CSV bar source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::ReaderBuilder;
use insight_core::error::DataError;
use insight_core::traits::{BarSource, SeriesRequest};
use insight_core::types::Bar;
use serde::Deserialize;
use tracing::{debug, warn};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "datetime", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: f64,
}

/// Historical bars from a local CSV file.
///
/// The file holds a single symbol; the request symbol is only used for
/// logging and the request output size trims to the most recent bars.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
}

impl CsvDataSource {
    /// Create a source for an existing file.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every valid bar in the file, oldest first.
    pub fn load_all(&self) -> Result<Vec<Bar>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut bars = Vec::new();
        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
            let timestamp = parse_timestamp(&record.date)?;
            let bar = Bar::new(
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            );

            match bar.validate() {
                Ok(()) => bars.push(bar),
                Err(e) => warn!(path = %self.path.display(), error = %e, "Skipping invalid bar"),
            }
        }

        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

#[async_trait]
impl BarSource for CsvDataSource {
    async fn fetch_bars(&self, request: &SeriesRequest) -> Result<Vec<Bar>, DataError> {
        let mut bars = self.load_all()?;
        if bars.is_empty() {
            return Err(DataError::NoDataAvailable);
        }
        if bars.len() > request.output_size {
            bars.drain(..bars.len() - request.output_size);
        }
        debug!(symbol = %request.symbol, bars = bars.len(), "Loaded CSV bars");
        Ok(bars)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse a date, datetime or unix timestamp into epoch milliseconds.
pub(crate) fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            return Ok(d.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }

    if let Ok(ts) = date_str.parse::<i64>() {
        // More than 10 digits means milliseconds
        if ts > 10_000_000_000 {
            return Ok(ts);
        }
        return Ok(ts * 1000);
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        date_str
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("2024-01-15").unwrap(), 1_705_276_800_000);
        assert_eq!(
            parse_timestamp("2024-01-15 10:30:00").unwrap(),
            1_705_276_800_000 + (10 * 3600 + 30 * 60) * 1000
        );
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000);
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CsvDataSource::new("/definitely/not/here.csv"),
            Err(DataError::NoDataAvailable)
        ));
    }

    #[tokio::test]
    async fn test_fetch_sorts_trims_and_skips_invalid_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
        writeln!(file, "2024-01-04,12,13,11,12.5,900").unwrap();
        writeln!(file, "2024-01-02,10,11,9,10.5,1000").unwrap();
        writeln!(file, "2024-01-03,11,10,12,11.5,800").unwrap();
        writeln!(file, "2024-01-05,13,14,12,13.5,700").unwrap();
        file.flush().unwrap();

        let source = CsvDataSource::new(file.path()).unwrap();
        assert_eq!(source.load_all().unwrap().len(), 3);

        let request = SeriesRequest::new("ACME", insight_core::types::Timeframe::Daily, 2);
        let bars = source.fetch_bars(&request).await.unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 12.5);
        assert_eq!(bars[1].close, 13.5);
    }
}
