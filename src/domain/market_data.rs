//! Bar loading with synthetic fallback.
//!
//! A symbol's series comes entirely from the data port or entirely from the
//! generator, never a mix of the two.

use chrono::NaiveDate;
use tracing::{info, warn};

use super::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use crate::ports::generator_port::BarGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarSource {
    Market,
    Synthetic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedBars {
    pub bars: Vec<OhlcvBar>,
    pub source: BarSource,
}

/// Fetch bars for `symbol` in `[start, end]`, substituting generated bars
/// when the port fails or returns nothing.
pub fn load_bars(
    data_port: &dyn DataPort,
    fallback: &dyn BarGenerator,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> LoadedBars {
    match data_port.fetch_ohlcv(symbol, start, end) {
        Ok(bars) if !bars.is_empty() => {
            info!(symbol, bars = bars.len(), "loaded market data");
            LoadedBars {
                bars,
                source: BarSource::Market,
            }
        }
        Ok(_) => {
            warn!(symbol, %start, %end, "no market data in range, using synthetic series");
            synthetic(fallback, symbol, start, end)
        }
        Err(e) => {
            warn!(symbol, error = %e, "market data unavailable, using synthetic series");
            synthetic(fallback, symbol, start, end)
        }
    }
}

fn synthetic(
    fallback: &dyn BarGenerator,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> LoadedBars {
    LoadedBars {
        bars: fallback.generate(symbol, start, end),
        source: BarSource::Synthetic,
    }
}
