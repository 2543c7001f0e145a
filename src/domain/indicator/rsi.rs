//! RSI (Relative Strength Index).
//!
//! Day-over-day changes are split into gains and losses. For every trailing
//! window of `period` changes:
//!
//! RS = mean(gains) / mean(losses), RSI = 100 - 100 / (1 + RS)
//!
//! - mean(losses) == 0 with some gain: RSI = 100
//! - no gains and no losses (flat window): RSI = 50
//!
//! The first value needs `period + 1` prices, so the series starts at bar
//! index `period`.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

const NEUTRAL_RSI: f64 = 50.0;

pub fn calculate_rsi(closes: &[f64], period: usize) -> IndicatorSeries<f64> {
    if period == 0 || closes.len() < period + 1 {
        return IndicatorSeries::empty(IndicatorType::Rsi(period));
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let values = changes
        .windows(period)
        .map(|window| {
            let gain: f64 = window.iter().filter(|&&c| c > 0.0).sum();
            let loss: f64 = window.iter().filter(|&&c| c < 0.0).map(|c| -c).sum();
            rsi_from_averages(gain / period as f64, loss / period as f64)
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        offset: period,
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return NEUTRAL_RSI;
        }
        return 100.0;
    }
    let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
    rsi.clamp(0.0, 100.0)
}
