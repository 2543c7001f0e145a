//! CSV directory data adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with the header
//! `date,open,high,low,close,volume` and ISO dates.

use crate::domain::error::SignaltraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn unavailable(symbol: &str, reason: String) -> SignaltraderError {
    SignaltraderError::DataUnavailable {
        symbol: symbol.to_string(),
        reason,
    }
}

fn field<T: std::str::FromStr>(
    record: &StringRecord,
    index: usize,
    name: &str,
    symbol: &str,
) -> Result<T, SignaltraderError>
where
    T::Err: std::fmt::Display,
{
    let raw = record
        .get(index)
        .ok_or_else(|| unavailable(symbol, format!("missing {} column", name)))?;
    raw.trim()
        .parse()
        .map_err(|e| unavailable(symbol, format!("invalid {} value {:?}: {}", name, raw, e)))
}

/// Prices must be finite and strictly positive.
fn price(
    record: &StringRecord,
    index: usize,
    name: &str,
    symbol: &str,
) -> Result<f64, SignaltraderError> {
    let value: f64 = field(record, index, name, symbol)?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(unavailable(
            symbol,
            format!("{} must be a positive number, got {}", name, value),
        ))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SignaltraderError> {
        let path = self.csv_path(symbol);
        let mut rdr = csv::Reader::from_path(&path)
            .map_err(|e| unavailable(symbol, format!("failed to read {}: {}", path.display(), e)))?;
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| unavailable(symbol, format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| unavailable(symbol, "missing date column".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
                .map_err(|e| unavailable(symbol, format!("invalid date format: {}", e)))?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(OhlcvBar {
                date,
                open: price(&record, 1, "open", symbol)?,
                high: price(&record, 2, "high", symbol)?,
                low: price(&record, 3, "low", symbol)?,
                close: price(&record, 4, "close", symbol)?,
                volume: field(&record, 5, "volume", symbol)?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}
