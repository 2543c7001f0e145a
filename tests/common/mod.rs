#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use signaltrader::domain::backtest::{BacktestConfig, RebalanceFrequency};
use signaltrader::domain::error::SignaltraderError;
pub use signaltrader::domain::ohlcv::OhlcvBar;
use signaltrader::domain::strategy::{RsiParams, Strategy};
use signaltrader::ports::data_port::DataPort;
use signaltrader::ports::generator_port::BarGenerator;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<String>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SignaltraderError> {
        self.calls.borrow_mut().push(symbol.to_string());
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SignaltraderError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Generator that replays a fixed close sequence from `start_date`.
pub struct FixtureGenerator {
    pub closes: Vec<f64>,
}

impl BarGenerator for FixtureGenerator {
    fn generate(&self, _symbol: &str, start_date: NaiveDate, _end_date: NaiveDate) -> Vec<OhlcvBar> {
        bars_from_closes(start_date, &self.closes)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day starting at `start`.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + Days::new(i as u64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        })
        .collect()
}

pub fn linear_closes(from: f64, to: f64, count: usize) -> Vec<f64> {
    let step = (to - from) / (count - 1) as f64;
    (0..count).map(|i| from + step * i as f64).collect()
}

pub fn rsi_config(period: usize) -> BacktestConfig {
    BacktestConfig {
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        initial_capital: 10_000.0,
        strategy: Strategy::Rsi(RsiParams {
            period,
            oversold: 30.0,
            overbought: 70.0,
        }),
        symbols: vec!["AAPL".into()],
        rebalance_frequency: RebalanceFrequency::Daily,
        transaction_cost_pct: 0.0,
        stop_loss_pct: None,
        take_profit_pct: None,
    }
}

pub const VALID_INI: &str = r#"
[backtest]
start_date = 2024-01-01
end_date = 2024-12-31
initial_capital = 10000
symbols = AAPL, MSFT
transaction_cost_pct = 0.1

[strategy]
kind = rsi
period = 14
oversold = 30
overbought = 70

[data]
base_price = 100
seed = 42
"#;
