//! Executed trades.

use chrono::NaiveDate;
use std::fmt;

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: u64,
    pub price: f64,
    /// quantity × price, before commission.
    pub value: f64,
    pub commission: f64,
    pub label: String,
}

impl Trade {
    /// Signed effect on cash: buys pay value + commission, sells receive
    /// value - commission.
    pub fn cash_flow(&self) -> f64 {
        match self.side {
            TradeSide::Buy => -(self.value + self.commission),
            TradeSide::Sell => self.value - self.commission,
        }
    }
}
