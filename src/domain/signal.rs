//! Signal generation: one BUY/SELL/HOLD decision per bar.
//!
//! Signals are produced for bar indices `1..N`. Bars the indicator does not
//! cover yet resolve to HOLD with zero strength.

use chrono::NaiveDate;
use std::fmt;

use crate::domain::indicator::{
    compute_indicator_set, BollingerPoint, IndicatorSeries, IndicatorSet, MacdPoint,
};
use crate::domain::ohlcv::{closes, OhlcvBar};
use crate::domain::strategy::{RsiParams, Strategy};

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Buy => write!(f, "BUY"),
            SignalType::Sell => write!(f, "SELL"),
            SignalType::Hold => write!(f, "HOLD"),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub date: NaiveDate,
    pub signal_type: SignalType,
    /// Confidence in `[0, 1]`.
    pub strength: f64,
    pub price: f64,
}

/// Compute the strategy's indicator and derive one signal per bar from index 1.
pub fn generate_signals(bars: &[OhlcvBar], strategy: &Strategy) -> Vec<Signal> {
    let set = compute_indicator_set(&closes(bars), strategy);
    signals_from_indicators(bars, &set, strategy)
}

/// Derive signals from a precomputed indicator set.
///
/// An indicator set that does not belong to `strategy` yields HOLD throughout.
pub fn signals_from_indicators(
    bars: &[OhlcvBar],
    set: &IndicatorSet,
    strategy: &Strategy,
) -> Vec<Signal> {
    (1..bars.len())
        .map(|i| {
            let (signal_type, strength) = match (strategy, set) {
                (Strategy::Rsi(params), IndicatorSet::Rsi(series)) => {
                    rsi_decision(series.at(i).copied(), params)
                }
                (Strategy::Macd(_), IndicatorSet::Macd(series)) => macd_decision(series, i),
                (Strategy::Bollinger(_), IndicatorSet::Bollinger(series)) => {
                    bollinger_decision(series.at(i), bars[i].close)
                }
                _ => (SignalType::Hold, 0.0),
            };

            Signal {
                date: bars[i].date,
                signal_type,
                strength: if signal_type == SignalType::Hold {
                    0.0
                } else {
                    clamp_strength(strength)
                },
                price: bars[i].close,
            }
        })
        .collect()
}

fn rsi_decision(rsi: Option<f64>, params: &RsiParams) -> (SignalType, f64) {
    let Some(rsi) = rsi else {
        return (SignalType::Hold, 0.0);
    };

    if rsi < params.oversold {
        (SignalType::Buy, (params.oversold - rsi) / params.oversold)
    } else if rsi > params.overbought {
        (
            SignalType::Sell,
            (rsi - params.overbought) / (100.0 - params.overbought),
        )
    } else {
        (SignalType::Hold, 0.0)
    }
}

fn macd_decision(series: &IndicatorSeries<MacdPoint>, i: usize) -> (SignalType, f64) {
    let current = series.at(i).and_then(|p| p.signal.map(|s| (p.line, s)));
    let previous = series.at(i - 1).and_then(|p| p.signal.map(|s| (p.line, s)));

    let (Some((macd, signal)), Some((prev_macd, prev_signal))) = (current, previous) else {
        return (SignalType::Hold, 0.0);
    };

    let strength = if signal == 0.0 {
        1.0
    } else {
        ((macd - signal).abs() / signal.abs()).min(1.0)
    };

    if macd > signal && prev_macd <= prev_signal {
        (SignalType::Buy, strength)
    } else if macd < signal && prev_macd >= prev_signal {
        (SignalType::Sell, strength)
    } else {
        (SignalType::Hold, 0.0)
    }
}

fn bollinger_decision(bands: Option<&BollingerPoint>, price: f64) -> (SignalType, f64) {
    let Some(b) = bands else {
        return (SignalType::Hold, 0.0);
    };

    if price <= b.lower {
        let width = b.middle - b.lower;
        let strength = if width > 0.0 { (b.lower - price) / width } else { 0.0 };
        (SignalType::Buy, strength)
    } else if price >= b.upper {
        let width = b.upper - b.middle;
        let strength = if width > 0.0 { (price - b.upper) / width } else { 0.0 };
        (SignalType::Sell, strength)
    } else {
        (SignalType::Hold, 0.0)
    }
}

fn clamp_strength(strength: f64) -> f64 {
    if strength.is_finite() {
        strength.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
