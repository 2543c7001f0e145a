//! Seeded random-walk bar generator used when no market data is available.

use crate::domain::config_validation::DEFAULT_BASE_PRICE;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::generator_port::BarGenerator;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

/// Largest absolute close-to-close move per bar.
const MAX_DAILY_MOVE: f64 = 0.02;
/// Prices never fall below this fraction of the base price.
const PRICE_FLOOR_FRACTION: f64 = 0.01;

pub struct RandomWalkGenerator {
    base_price: f64,
    seed: Option<u64>,
}

impl RandomWalkGenerator {
    /// `seed = None` draws from OS entropy, so runs are not reproducible.
    /// A non-finite or non-positive `base_price` is replaced by
    /// [`DEFAULT_BASE_PRICE`].
    pub fn new(base_price: f64, seed: Option<u64>) -> Self {
        let base_price = if base_price.is_finite() && base_price > 0.0 {
            base_price
        } else {
            warn!(base_price, fallback = DEFAULT_BASE_PRICE, "invalid base price");
            DEFAULT_BASE_PRICE
        };
        Self { base_price, seed }
    }

    fn rng(&self, symbol: &str) -> StdRng {
        match self.seed {
            Some(seed) => {
                let symbol_seed: u64 = symbol.bytes().map(|b| b as u64).sum();
                StdRng::seed_from_u64(seed.wrapping_add(symbol_seed))
            }
            None => StdRng::from_entropy(),
        }
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

impl BarGenerator for RandomWalkGenerator {
    fn generate(&self, symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> Vec<OhlcvBar> {
        let mut dates: Vec<NaiveDate> = start_date
            .iter_days()
            .take_while(|d| *d <= end_date)
            .filter(|d| is_weekday(*d))
            .collect();
        if dates.is_empty() {
            dates.push(start_date);
        }

        let mut rng = self.rng(symbol);
        let floor = self.base_price * PRICE_FLOOR_FRACTION;
        let mut price = self.base_price;

        dates
            .into_iter()
            .map(|date| {
                let open = price;
                let ret = rng.gen_range(-MAX_DAILY_MOVE..=MAX_DAILY_MOVE);
                price = (price * (1.0 + ret)).max(floor);
                let close = price;
                let wick = open.max(close) * MAX_DAILY_MOVE * 0.5;
                OhlcvBar {
                    date,
                    open,
                    high: open.max(close) + rng.gen_range(0.0..=wick),
                    low: (open.min(close) - rng.gen_range(0.0..=wick)).max(floor * 0.5),
                    close,
                    volume: rng.gen_range(100_000..=2_000_000),
                }
            })
            .collect()
    }
}
