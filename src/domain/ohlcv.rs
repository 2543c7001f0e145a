//! OHLCV bar representation.

use chrono::NaiveDate;

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

#[cfg(test)]
impl OhlcvBar {
    /// A bar whose open, high, low and close all equal `close`.
    pub(crate) fn flat(date: NaiveDate, close: f64, volume: i64) -> Self {
        OhlcvBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }
}

/// Extract the close-price sequence the indicator engine works on.
pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
