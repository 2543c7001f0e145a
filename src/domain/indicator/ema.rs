//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first value: EMA[0] = S[0],
//! EMA[i] = S[i]*k + EMA[i-1]*(1-k). Defined at every index.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn calculate_ema(series: &[f64], period: usize) -> IndicatorSeries<f64> {
    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        offset: 0,
        values: ema_values(series, period),
    }
}

/// Raw EMA values over an arbitrary series. Empty for `period == 0`.
pub(crate) fn ema_values(series: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || series.is_empty() {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(series.len());
    let mut ema = series[0];
    values.push(ema);

    for &value in &series[1..] {
        ema = value * k + ema * (1.0 - k);
        values.push(ema);
    }

    values
}
