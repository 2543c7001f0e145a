//! Configuration loading and validation.
//!
//! Reads the `[backtest]`, `[strategy]` and `[data]` sections through a
//! [`ConfigPort`], rejects missing or malformed values and builds the typed
//! [`BacktestConfig`].

use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::backtest::{BacktestConfig, RebalanceFrequency};
use crate::domain::error::SignaltraderError;
use crate::domain::strategy::{BollingerParams, MacdParams, RsiParams, Strategy};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_BASE_PRICE: f64 = 100.0;

/// Where bars come from: an optional CSV directory, plus the synthetic
/// fallback settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub dir: Option<PathBuf>,
    pub base_price: f64,
    pub seed: Option<u64>,
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SignaltraderError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;

    let initial_capital = parse_opt::<f64>(config, "backtest", "initial_capital")?
        .ok_or_else(|| SignaltraderError::missing("backtest", "initial_capital"))?;
    let transaction_cost_pct =
        parse_opt::<f64>(config, "backtest", "transaction_cost_pct")?.unwrap_or(0.0);

    let rebalance_frequency = match non_empty(config, "backtest", "rebalance_frequency") {
        None => RebalanceFrequency::Daily,
        Some(s) => RebalanceFrequency::parse(&s).ok_or_else(|| {
            SignaltraderError::invalid(
                "backtest",
                "rebalance_frequency",
                format!("unknown frequency {:?}, expected daily|weekly|monthly", s),
            )
        })?,
    };

    let config = BacktestConfig {
        start_date,
        end_date,
        initial_capital,
        strategy: build_strategy(config)?,
        symbols: parse_symbols(config)?,
        rebalance_frequency,
        transaction_cost_pct,
        stop_loss_pct: parse_opt(config, "backtest", "stop_loss_pct")?,
        take_profit_pct: parse_opt(config, "backtest", "take_profit_pct")?,
    };
    config.validate()?;
    Ok(config)
}

pub fn build_strategy(config: &dyn ConfigPort) -> Result<Strategy, SignaltraderError> {
    let kind = non_empty(config, "strategy", "kind")
        .ok_or_else(|| SignaltraderError::missing("strategy", "kind"))?;

    let strategy = match Strategy::from_kind(&kind) {
        Some(Strategy::Rsi(d)) => Strategy::Rsi(RsiParams {
            period: parse_opt(config, "strategy", "period")?.unwrap_or(d.period),
            oversold: parse_opt(config, "strategy", "oversold")?.unwrap_or(d.oversold),
            overbought: parse_opt(config, "strategy", "overbought")?.unwrap_or(d.overbought),
        }),
        Some(Strategy::Macd(d)) => Strategy::Macd(MacdParams {
            fast: parse_opt(config, "strategy", "fast")?.unwrap_or(d.fast),
            slow: parse_opt(config, "strategy", "slow")?.unwrap_or(d.slow),
            signal: parse_opt(config, "strategy", "signal")?.unwrap_or(d.signal),
        }),
        Some(Strategy::Bollinger(d)) => Strategy::Bollinger(BollingerParams {
            period: parse_opt(config, "strategy", "period")?.unwrap_or(d.period),
            stddev_mult: parse_opt(config, "strategy", "stddev_mult")?.unwrap_or(d.stddev_mult),
        }),
        None => {
            return Err(SignaltraderError::invalid(
                "strategy",
                "kind",
                format!("unknown strategy {:?}, expected rsi|macd|bollinger", kind),
            ))
        }
    };
    Ok(strategy)
}

pub fn build_data_settings(config: &dyn ConfigPort) -> Result<DataSettings, SignaltraderError> {
    let base_price = parse_opt::<f64>(config, "data", "base_price")?.unwrap_or(DEFAULT_BASE_PRICE);
    if !base_price.is_finite() || base_price <= 0.0 {
        return Err(SignaltraderError::invalid(
            "data",
            "base_price",
            "base_price must be positive",
        ));
    }
    Ok(DataSettings {
        dir: non_empty(config, "data", "dir").map(PathBuf::from),
        base_price,
        seed: parse_opt(config, "data", "seed")?,
    })
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `None` when the key is absent or blank, an error when it does not parse.
fn parse_opt<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, SignaltraderError> {
    match non_empty(config, section, key) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            SignaltraderError::invalid(section, key, format!("cannot parse {:?}", raw))
        }),
    }
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, SignaltraderError> {
    let raw = non_empty(config, "backtest", key)
        .ok_or_else(|| SignaltraderError::missing("backtest", key))?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
        SignaltraderError::invalid(
            "backtest",
            key,
            format!("invalid {} format, expected YYYY-MM-DD", key),
        )
    })
}

fn parse_symbols(config: &dyn ConfigPort) -> Result<Vec<String>, SignaltraderError> {
    let raw = non_empty(config, "backtest", "symbols")
        .or_else(|| non_empty(config, "backtest", "symbol"))
        .ok_or_else(|| SignaltraderError::missing("backtest", "symbols"))?;

    let symbols: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if symbols.is_empty() {
        return Err(SignaltraderError::missing("backtest", "symbols"));
    }
    Ok(symbols)
}
