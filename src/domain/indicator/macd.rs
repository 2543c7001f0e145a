//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line (0 while the signal line warms up)
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! The first `slow - 1` MACD values are discarded, so the series starts at bar
//! index `slow - 1`. The signal line is undefined for its first `signal - 1`
//! values.

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{IndicatorSeries, IndicatorType, MacdPoint};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries<MacdPoint> {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 || closes.len() < slow {
        return IndicatorSeries::empty(indicator_type);
    }

    let ema_fast = ema_values(closes, fast);
    let ema_slow = ema_values(closes, slow);
    let offset = slow - 1;

    let macd_line: Vec<f64> = ema_fast[offset..]
        .iter()
        .zip(&ema_slow[offset..])
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema_values(&macd_line, signal_period);
    let signal_warmup = signal_period - 1;

    let values = macd_line
        .iter()
        .zip(&signal_line)
        .enumerate()
        .map(|(k, (&line, &signal))| {
            if k < signal_warmup {
                MacdPoint {
                    line,
                    signal: None,
                    histogram: 0.0,
                }
            } else {
                MacdPoint {
                    line,
                    signal: Some(signal),
                    histogram: line - signal,
                }
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        offset,
        values,
    }
}
