//! Performance metrics and statistics.
//!
//! Each equity point is treated as one calendar day when annualizing.
//! Volatility annualizes with 365 days, downside deviation with 252 trading
//! days. Ratios with a zero denominator resolve to 0.

use std::collections::{BTreeMap, VecDeque};

use super::indicator::stddev::population_stddev;
use super::portfolio::EquityPoint;
use super::trade::{Trade, TradeSide};

pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub downside_deviation: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    /// Longest run of consecutive points below the running peak.
    pub max_drawdown_duration: usize,
    pub win_rate: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub number_of_trades: usize,
    pub final_value: f64,
    pub benchmark_return: f64,
}

impl Metrics {
    pub fn compute(equity_curve: &[EquityPoint], trades: &[Trade], initial_capital: f64) -> Self {
        let final_value = equity_curve
            .last()
            .map(|p| p.value)
            .unwrap_or(initial_capital);

        let total_return = relative_change(initial_capital, final_value);
        let benchmark_return = equity_curve
            .last()
            .map(|p| relative_change(initial_capital, p.benchmark))
            .unwrap_or(0.0);

        let annualized_return = annualize(total_return, equity_curve.len());

        let returns = daily_returns(equity_curve);
        let volatility = population_stddev(&returns) * CALENDAR_DAYS_PER_YEAR.sqrt();
        let sharpe_ratio = safe_ratio(annualized_return, volatility);

        let negative: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
        let downside_deviation = population_stddev(&negative) * TRADING_DAYS_PER_YEAR.sqrt();
        let sortino_ratio = safe_ratio(annualized_return, downside_deviation);

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);

        let outcomes = match_lots(trades);
        let matched = outcomes.winning + outcomes.losing;
        let win_rate = if matched > 0 {
            outcomes.winning as f64 / matched as f64
        } else {
            0.0
        };

        Metrics {
            total_return,
            annualized_return,
            volatility,
            sharpe_ratio,
            downside_deviation,
            sortino_ratio,
            max_drawdown,
            max_drawdown_duration,
            win_rate,
            winning_trades: outcomes.winning,
            losing_trades: outcomes.losing,
            number_of_trades: trades.len(),
            final_value,
            benchmark_return,
        }
    }
}

fn relative_change(base: f64, value: f64) -> f64 {
    if base > 0.0 {
        (value - base) / base
    } else {
        0.0
    }
}

fn annualize(total_return: f64, points: usize) -> f64 {
    if points == 0 {
        return 0.0;
    }
    let growth = 1.0 + total_return;
    if growth <= 0.0 {
        return -1.0;
    }
    let annualized = growth.powf(CALENDAR_DAYS_PER_YEAR / points as f64) - 1.0;
    if annualized.is_finite() {
        annualized
    } else {
        0.0
    }
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        let ratio = numerator / denominator;
        if ratio.is_finite() { ratio } else { 0.0 }
    } else {
        0.0
    }
}

/// Point-to-point returns; a zero previous value contributes 0.
pub fn daily_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].value;
            let curr = w[1].value;
            if prev > 0.0 {
                (curr - prev) / prev
            } else {
                0.0
            }
        })
        .collect()
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.value;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0usize;
    let mut current_dd_duration = 0usize;

    for point in equity_curve {
        if point.value >= peak {
            peak = point.value;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_dd_duration += 1;
            if current_dd_duration > max_dd_duration {
                max_dd_duration = current_dd_duration;
            }
        }
    }

    (max_dd.clamp(0.0, 1.0), max_dd_duration)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeOutcomes {
    pub winning: usize,
    pub losing: usize,
}

struct Lot {
    remaining: u64,
    /// Fill price plus the buy commission spread over the lot.
    unit_cost: f64,
}

/// Classify every SELL by FIFO lot matching.
///
/// Each SELL consumes the earliest open BUY lots of the same symbol. It wins
/// when its net proceeds exceed the consumed cost basis including prorated buy
/// commissions. SELLs with no open lot are ignored.
pub fn match_lots(trades: &[Trade]) -> TradeOutcomes {
    let mut lots: BTreeMap<&str, VecDeque<Lot>> = BTreeMap::new();
    let mut outcomes = TradeOutcomes::default();

    for trade in trades {
        if trade.quantity == 0 {
            continue;
        }
        let queue = lots.entry(trade.symbol.as_str()).or_default();

        match trade.side {
            TradeSide::Buy => queue.push_back(Lot {
                remaining: trade.quantity,
                unit_cost: -trade.cash_flow() / trade.quantity as f64,
            }),
            TradeSide::Sell => {
                let mut to_match = trade.quantity;
                let mut matched = 0u64;
                let mut cost_basis = 0.0;

                while to_match > 0 {
                    let Some(lot) = queue.front_mut() else {
                        break;
                    };
                    let take = lot.remaining.min(to_match);
                    cost_basis += take as f64 * lot.unit_cost;
                    lot.remaining -= take;
                    to_match -= take;
                    matched += take;
                    if lot.remaining == 0 {
                        queue.pop_front();
                    }
                }

                if matched == 0 {
                    continue;
                }

                let net_proceeds = trade.cash_flow() * matched as f64 / trade.quantity as f64;
                if net_proceeds > cost_basis {
                    outcomes.winning += 1;
                } else {
                    outcomes.losing += 1;
                }
            }
        }
    }

    outcomes
}
