//! Order sizing and fill simulation.
//!
//! Buys are capped at 10% of portfolio value scaled by signal strength and by
//! what the cash balance can pay for including commission. Sells release at
//! most half of the current holding per signal. Fills happen at the bar close.

use super::portfolio::PortfolioState;

/// Largest share of portfolio value a single full-strength buy may commit.
pub const MAX_BUY_FRACTION: f64 = 0.1;
/// Largest share of a holding a single full-strength sell may release.
pub const MAX_SELL_FRACTION: f64 = 0.5;

/// Commission on executed notional: `notional × pct / 100`.
pub fn calculate_commission(notional: f64, transaction_cost_pct: f64) -> f64 {
    notional * transaction_cost_pct / 100.0
}

/// Result of a buy attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Bought {
        quantity: u64,
        cost: f64,
        commission: f64,
    },
    InsufficientCapital,
}

/// Result of a sell attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ExitResult {
    Sold {
        quantity: u64,
        proceeds: f64,
        commission: f64,
    },
    NothingToSell,
}

/// Shares the cash balance can pay for, commission included.
pub fn max_affordable_shares(cash: f64, price: f64, transaction_cost_pct: f64) -> u64 {
    if price <= 0.0 || !price.is_finite() || cash <= 0.0 {
        return 0;
    }
    let unit_cost = price * (1.0 + transaction_cost_pct / 100.0);
    (cash / unit_cost).floor() as u64
}

/// Buy `symbol` at `price`.
///
/// Steps:
/// 1. Mark the portfolio at `price`
/// 2. Target = floor(value × strength × 10% / price), capped by affordability
/// 3. If the target is 0, return InsufficientCapital
/// 4. Deduct cost + commission from cash and add the shares
pub fn execute_buy(
    state: &mut PortfolioState,
    symbol: &str,
    price: f64,
    strength: f64,
    transaction_cost_pct: f64,
) -> EntryResult {
    if price <= 0.0 || !price.is_finite() {
        return EntryResult::InsufficientCapital;
    }

    let portfolio_value = state.total_value(price);
    let target = (portfolio_value * strength * MAX_BUY_FRACTION / price).floor();
    let target = if target.is_finite() && target > 0.0 {
        target as u64
    } else {
        0
    };

    let mut quantity = target.min(max_affordable_shares(state.cash, price, transaction_cost_pct));

    // Rounding in the affordability estimate can overshoot by a share.
    let (cost, commission) = loop {
        if quantity == 0 {
            return EntryResult::InsufficientCapital;
        }
        let cost = quantity as f64 * price;
        let commission = calculate_commission(cost, transaction_cost_pct);
        if cost + commission <= state.cash {
            break (cost, commission);
        }
        quantity -= 1;
    };

    state.cash -= cost + commission;
    *state.shares.entry(symbol.to_string()).or_insert(0) += quantity;

    EntryResult::Bought {
        quantity,
        cost,
        commission,
    }
}

/// Sell up to half of the `symbol` holding, scaled by `strength`.
pub fn execute_sell(
    state: &mut PortfolioState,
    symbol: &str,
    price: f64,
    strength: f64,
    transaction_cost_pct: f64,
) -> ExitResult {
    let holdings = state.holdings(symbol);
    if holdings == 0 || price <= 0.0 || !price.is_finite() {
        return ExitResult::NothingToSell;
    }

    let target = (holdings as f64 * strength * MAX_SELL_FRACTION).floor();
    let quantity = if target.is_finite() && target > 0.0 {
        (target as u64).min(holdings)
    } else {
        0
    };

    if quantity == 0 {
        return ExitResult::NothingToSell;
    }

    let proceeds = quantity as f64 * price;
    let commission = calculate_commission(proceeds, transaction_cost_pct);

    state.cash += proceeds - commission;
    if let Some(held) = state.shares.get_mut(symbol) {
        *held -= quantity;
    }

    ExitResult::Sold {
        quantity,
        proceeds,
        commission,
    }
}
