//! Backtest configuration, the portfolio simulator and the pipeline entry
//! points.
//!
//! Pipeline: bars → indicators → signals → simulator → metrics.
//!
//! The simulator trades only the first configured symbol and marks every
//! tracked symbol at that symbol's quote. Stop-loss and take-profit settings
//! are accepted but not enforced.

use chrono::{Days, NaiveDate};
use tracing::{debug, info, warn};

use super::error::SignaltraderError;
use super::execution::{execute_buy, execute_sell, EntryResult, ExitResult};
use super::market_data::{load_bars, BarSource};
use super::metrics::Metrics;
use super::ohlcv::OhlcvBar;
use super::portfolio::{EquityPoint, PortfolioState};
use super::signal::{generate_signals, Signal, SignalType};
use super::strategy::Strategy;
use super::trade::{Trade, TradeSide};
use crate::ports::data_port::DataPort;
use crate::ports::generator_port::BarGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl RebalanceFrequency {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "daily" => Some(RebalanceFrequency::Daily),
            "weekly" => Some(RebalanceFrequency::Weekly),
            "monthly" => Some(RebalanceFrequency::Monthly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub strategy: Strategy,
    /// The first symbol is the one traded.
    pub symbols: Vec<String>,
    /// Accepted for compatibility; the simulator rebalances on every signal.
    pub rebalance_frequency: RebalanceFrequency,
    pub transaction_cost_pct: f64,
    /// Accepted but not enforced.
    pub stop_loss_pct: Option<f64>,
    /// Accepted but not enforced.
    pub take_profit_pct: Option<f64>,
}

impl BacktestConfig {
    /// Reject configurations the pipeline cannot run.
    pub fn validate(&self) -> Result<(), SignaltraderError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(SignaltraderError::invalid(
                "backtest",
                "initial_capital",
                "initial_capital must be positive",
            ));
        }
        if self.symbols.is_empty() || self.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(SignaltraderError::invalid(
                "backtest",
                "symbols",
                "at least one non-empty symbol is required",
            ));
        }
        if self.end_date <= self.start_date {
            return Err(SignaltraderError::invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
        if !(0.0..=100.0).contains(&self.transaction_cost_pct) {
            return Err(SignaltraderError::invalid(
                "backtest",
                "transaction_cost_pct",
                "transaction_cost_pct must be between 0 and 100",
            ));
        }
        for (key, value) in [
            ("stop_loss_pct", self.stop_loss_pct),
            ("take_profit_pct", self.take_profit_pct),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(SignaltraderError::invalid(
                        "backtest",
                        key,
                        format!("{} must be non-negative", key),
                    ));
                }
            }
        }
        self.strategy
            .check_params()
            .map_err(|(key, reason)| SignaltraderError::invalid("strategy", key, reason))
    }

    pub fn primary_symbol(&self) -> &str {
        self.symbols.first().map(String::as_str).unwrap_or_default()
    }
}

/// Step-by-step replay of signals against one private account.
#[derive(Debug)]
pub struct PortfolioSimulator {
    state: PortfolioState,
    symbol: String,
    strategy_name: String,
    transaction_cost_pct: f64,
    initial_capital: f64,
    first_close: f64,
    trades: Vec<Trade>,
    equity: Vec<EquityPoint>,
}

impl PortfolioSimulator {
    pub fn new(config: &BacktestConfig, first_close: f64) -> Self {
        PortfolioSimulator {
            state: PortfolioState::new(config.initial_capital, &config.symbols),
            symbol: config.primary_symbol().to_string(),
            strategy_name: config.strategy.to_string(),
            transaction_cost_pct: config.transaction_cost_pct,
            initial_capital: config.initial_capital,
            first_close,
            trades: Vec::new(),
            equity: Vec::new(),
        }
    }

    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn equity(&self) -> &[EquityPoint] {
        &self.equity
    }

    /// Apply one signal and record the resulting equity point.
    pub fn step(&mut self, signal: &Signal) {
        let price = signal.price;

        match signal.signal_type {
            SignalType::Buy => {
                if let EntryResult::Bought {
                    quantity,
                    cost,
                    commission,
                } = execute_buy(
                    &mut self.state,
                    &self.symbol,
                    price,
                    signal.strength,
                    self.transaction_cost_pct,
                ) {
                    self.record_trade(signal, TradeSide::Buy, quantity, cost, commission);
                }
            }
            SignalType::Sell => {
                if let ExitResult::Sold {
                    quantity,
                    proceeds,
                    commission,
                } = execute_sell(
                    &mut self.state,
                    &self.symbol,
                    price,
                    signal.strength,
                    self.transaction_cost_pct,
                ) {
                    self.record_trade(signal, TradeSide::Sell, quantity, proceeds, commission);
                }
            }
            SignalType::Hold => {}
        }

        let benchmark = if self.first_close > 0.0 {
            self.initial_capital * (price / self.first_close)
        } else {
            self.initial_capital
        };

        self.equity.push(EquityPoint {
            date: signal.date,
            value: self.state.total_value(price),
            benchmark,
        });
    }

    fn record_trade(
        &mut self,
        signal: &Signal,
        side: TradeSide,
        quantity: u64,
        value: f64,
        commission: f64,
    ) {
        let label = format!(
            "{} {} (confidence {:.0}%)",
            self.strategy_name,
            side,
            signal.strength * 100.0
        );
        debug!(date = %signal.date, %side, quantity, price = signal.price, "trade executed");

        self.trades.push(Trade {
            date: signal.date,
            symbol: self.symbol.clone(),
            side,
            quantity,
            price: signal.price,
            value,
            commission,
            label,
        });
    }

    pub fn finish(self) -> SimulationOutcome {
        SimulationOutcome {
            trades: self.trades,
            equity: self.equity,
            final_state: self.state,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub trades: Vec<Trade>,
    pub equity: Vec<EquityPoint>,
    pub final_state: PortfolioState,
}

/// Replay `signals` in order on a fresh account.
pub fn simulate(bars: &[OhlcvBar], signals: &[Signal], config: &BacktestConfig) -> SimulationOutcome {
    let first_close = bars.first().map(|b| b.close).unwrap_or(0.0);
    let mut simulator = PortfolioSimulator::new(config, first_close);
    for signal in signals {
        simulator.step(signal);
    }
    debug!(
        trades = simulator.trades().len(),
        points = simulator.equity().len(),
        cash = simulator.state().cash,
        "simulation finished"
    );
    simulator.finish()
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub metrics: Metrics,
    pub trades: Vec<Trade>,
    pub equity: Vec<EquityPoint>,
}

/// Run the full pipeline over an in-memory bar series.
pub fn run_backtest(
    bars: &[OhlcvBar],
    config: &BacktestConfig,
) -> Result<BacktestResult, SignaltraderError> {
    config.validate()?;
    Ok(run_pipeline(bars, config))
}

fn run_pipeline(bars: &[OhlcvBar], config: &BacktestConfig) -> BacktestResult {
    if config.stop_loss_pct.is_some() || config.take_profit_pct.is_some() {
        warn!("stop_loss_pct/take_profit_pct are accepted but not enforced by the simulator");
    }

    let signals = generate_signals(bars, &config.strategy);
    let outcome = simulate(bars, &signals, config);
    let metrics = Metrics::compute(&outcome.equity, &outcome.trades, config.initial_capital);

    info!(
        strategy = %config.strategy,
        bars = bars.len(),
        trades = outcome.trades.len(),
        final_value = metrics.final_value,
        "backtest complete"
    );

    BacktestResult {
        metrics,
        trades: outcome.trades,
        equity: outcome.equity,
    }
}

/// Validate, fetch the primary symbol's bars (falling back to synthetic data)
/// and run the pipeline.
pub fn run_backtest_with_data(
    data_port: &dyn DataPort,
    fallback: &dyn BarGenerator,
    config: &BacktestConfig,
) -> Result<(BacktestResult, BarSource), SignaltraderError> {
    config.validate()?;
    let loaded = load_bars(
        data_port,
        fallback,
        config.primary_symbol(),
        config.start_date,
        config.end_date,
    );
    Ok((run_pipeline(&loaded.bars, config), loaded.source))
}

/// Run the strategy over a synthetic series covering the `days` calendar days
/// after `config.end_date` (inclusive of both ends), on its own simulator.
pub fn run_forward_simulation(
    generator: &dyn BarGenerator,
    config: &BacktestConfig,
    days: u64,
) -> Result<BacktestResult, SignaltraderError> {
    config.validate()?;
    if days == 0 {
        return Err(SignaltraderError::invalid(
            "simulate",
            "days",
            "days must be at least 1",
        ));
    }

    let start = config
        .end_date
        .checked_add_days(Days::new(1))
        .ok_or_else(|| SignaltraderError::invalid("backtest", "end_date", "date out of range"))?;
    let end = start
        .checked_add_days(Days::new(days - 1))
        .ok_or_else(|| SignaltraderError::invalid("simulate", "days", "date out of range"))?;

    let forward = BacktestConfig {
        start_date: start,
        end_date: end,
        ..config.clone()
    };
    let bars = generator.generate(forward.primary_symbol(), start, end);
    info!(symbol = forward.primary_symbol(), %start, %end, bars = bars.len(), "forward simulation");
    // A one-day window has start == end, which validate() rejects.
    Ok(run_pipeline(&bars, &forward))
}
