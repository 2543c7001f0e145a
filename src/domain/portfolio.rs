//! Simulated account state and equity tracking.

use chrono::NaiveDate;
use std::collections::BTreeMap;

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
    /// Buy-and-hold value of the initial capital in the primary symbol.
    pub benchmark: f64,
}

/// Cash plus whole-share holdings per tracked symbol.
///
/// Share counts are unsigned; there is no short selling and no margin.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub shares: BTreeMap<String, u64>,
}

impl PortfolioState {
    pub fn new(initial_capital: f64, symbols: &[String]) -> Self {
        PortfolioState {
            cash: initial_capital,
            shares: symbols.iter().map(|s| (s.clone(), 0)).collect(),
        }
    }

    pub fn holdings(&self, symbol: &str) -> u64 {
        self.shares.get(symbol).copied().unwrap_or(0)
    }

    /// cash + Σ shares × price, every symbol marked at the same quote.
    pub fn total_value(&self, price: f64) -> f64 {
        self.cash + self.shares.values().map(|&q| q as f64 * price).sum::<f64>()
    }
}
