//! Strategy selection with typed parameters per strategy kind.

use crate::domain::indicator::{bollinger, macd};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct RsiParams {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        RsiParams {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        MacdParams {
            fast: macd::DEFAULT_FAST,
            slow: macd::DEFAULT_SLOW,
            signal: macd::DEFAULT_SIGNAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerParams {
    pub period: usize,
    pub stddev_mult: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        BollingerParams {
            period: bollinger::DEFAULT_PERIOD,
            stddev_mult: bollinger::DEFAULT_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Rsi(RsiParams),
    Macd(MacdParams),
    Bollinger(BollingerParams),
}

impl Strategy {
    /// Parse a strategy kind name, using default parameters.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind.trim().to_lowercase().as_str() {
            "rsi" => Some(Strategy::Rsi(RsiParams::default())),
            "macd" => Some(Strategy::Macd(MacdParams::default())),
            "bollinger" => Some(Strategy::Bollinger(BollingerParams::default())),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Strategy::Rsi(_) => "rsi",
            Strategy::Macd(_) => "macd",
            Strategy::Bollinger(_) => "bollinger",
        }
    }

    /// Check parameter ranges. Returns the offending key and the reason.
    pub fn check_params(&self) -> Result<(), (&'static str, String)> {
        match self {
            Strategy::Rsi(p) => {
                if p.period == 0 {
                    return Err(("period", "period must be at least 1".into()));
                }
                if !(p.oversold > 0.0 && p.oversold < 100.0) {
                    return Err(("oversold", "oversold must be between 0 and 100".into()));
                }
                if !(p.overbought > 0.0 && p.overbought < 100.0) {
                    return Err(("overbought", "overbought must be between 0 and 100".into()));
                }
                if p.oversold >= p.overbought {
                    return Err(("oversold", "oversold must be below overbought".into()));
                }
            }
            Strategy::Macd(p) => {
                if p.fast == 0 || p.slow == 0 || p.signal == 0 {
                    return Err(("fast", "MACD periods must be at least 1".into()));
                }
                if p.fast >= p.slow {
                    return Err(("fast", "fast period must be shorter than slow period".into()));
                }
            }
            Strategy::Bollinger(p) => {
                if p.period == 0 {
                    return Err(("period", "period must be at least 1".into()));
                }
                if !p.stddev_mult.is_finite() || p.stddev_mult <= 0.0 {
                    return Err(("stddev_mult", "stddev_mult must be positive".into()));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Rsi(_) => write!(f, "RSI"),
            Strategy::Macd(_) => write!(f, "MACD"),
            Strategy::Bollinger(_) => write!(f, "Bollinger"),
        }
    }
}
