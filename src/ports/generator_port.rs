//! Synthetic bar generation port.

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait BarGenerator {
    /// A non-empty, date-ascending series for `symbol` covering
    /// `[start_date, end_date]`.
    fn generate(&self, symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> Vec<OhlcvBar>;
}
