//! Bollinger Bands.
//!
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Default parameters: period=20, multiplier=2.0.
//! The series starts at bar index `period - 1`.

use crate::domain::indicator::stddev::{mean, population_stddev};
use crate::domain::indicator::{BollingerPoint, IndicatorSeries, IndicatorType};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

pub fn calculate_bollinger(
    closes: &[f64],
    period: usize,
    stddev_mult: f64,
) -> IndicatorSeries<BollingerPoint> {
    let indicator_type = IndicatorType::Bollinger {
        period,
        stddev_mult_x100: (stddev_mult * 100.0).round().max(0.0) as u32,
    };

    if period == 0 || closes.len() < period {
        return IndicatorSeries::empty(indicator_type);
    }

    let values = closes
        .windows(period)
        .map(|window| {
            let middle = mean(window);
            let band = stddev_mult * population_stddev(window);
            BollingerPoint {
                upper: middle + band,
                middle,
                lower: middle - band,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        offset: period - 1,
        values,
    }
}
