//! Technical indicator implementations.
//!
//! Every indicator is a pure function of the close-price sequence and returns
//! an [`IndicatorSeries`]: a vector of values plus the bar index of the first
//! value. Series may be shorter than the input; callers look values up by bar
//! index through [`IndicatorSeries::at`] instead of assuming alignment.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod stddev;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;

use crate::domain::strategy::Strategy;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    /// `None` while the signal EMA is still warming up.
    pub signal: Option<f64>,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries<T> {
    pub indicator_type: IndicatorType,
    /// Bar index of `values[0]`.
    pub offset: usize,
    pub values: Vec<T>,
}

impl<T> IndicatorSeries<T> {
    pub fn empty(indicator_type: IndicatorType) -> Self {
        IndicatorSeries {
            indicator_type,
            offset: 0,
            values: Vec::new(),
        }
    }

    /// Value belonging to `bar_index`, or `None` outside the covered range.
    pub fn at(&self, bar_index: usize) -> Option<&T> {
        bar_index
            .checked_sub(self.offset)
            .and_then(|k| self.values.get(k))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Indicator output for one strategy run.
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorSet {
    Rsi(IndicatorSeries<f64>),
    Macd(IndicatorSeries<MacdPoint>),
    Bollinger(IndicatorSeries<BollingerPoint>),
}

/// Compute the indicator the strategy trades on.
pub fn compute_indicator_set(closes: &[f64], strategy: &Strategy) -> IndicatorSet {
    match strategy {
        Strategy::Rsi(p) => IndicatorSet::Rsi(calculate_rsi(closes, p.period)),
        Strategy::Macd(p) => {
            IndicatorSet::Macd(calculate_macd(closes, p.fast, p.slow, p.signal))
        }
        Strategy::Bollinger(p) => {
            IndicatorSet::Bollinger(calculate_bollinger(closes, p.period, p.stddev_mult))
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
