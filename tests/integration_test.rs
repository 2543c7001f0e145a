//! End-to-end pipeline tests.
//!
//! Tests cover:
//! - Flat, declining and V-shaped price fixtures through the full pipeline
//! - Cost sensitivity of the final value
//! - Accounting invariants over random price series for every strategy
//! - Market data loading with synthetic fallback
//! - Forward simulation after the configured range

mod common;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use common::*;
use proptest::prelude::*;
use signaltrader::adapters::csv_adapter::CsvAdapter;
use signaltrader::adapters::synthetic_adapter::RandomWalkGenerator;
use signaltrader::domain::backtest::{
    run_backtest, run_backtest_with_data, run_forward_simulation, simulate, BacktestConfig,
    PortfolioSimulator,
};
use signaltrader::domain::error::SignaltraderError;
use signaltrader::domain::market_data::BarSource;
use signaltrader::domain::signal::{generate_signals, SignalType};
use signaltrader::domain::strategy::{BollingerParams, MacdParams, Strategy};
use signaltrader::domain::trade::TradeSide;
use signaltrader::ports::generator_port::BarGenerator;
use std::cell::RefCell;

mod pipeline_scenarios {
    use super::*;

    #[test]
    fn flat_prices_never_trade() {
        let bars = bars_from_closes(date(2024, 1, 1), &[100.0; 30]);
        let result = run_backtest(&bars, &rsi_config(14)).unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.equity.len(), 29);
        assert!(result.equity.iter().all(|p| p.value == 10_000.0));
        assert_eq!(result.metrics.total_return, 0.0);
        assert_eq!(result.metrics.max_drawdown, 0.0);
        assert_eq!(result.metrics.number_of_trades, 0);
    }

    #[test]
    fn declining_prices_trigger_buy_and_debit_cash_exactly() {
        let bars = bars_from_closes(date(2024, 1, 1), &linear_closes(100.0, 50.0, 20));
        let config = BacktestConfig {
            transaction_cost_pct: 0.5,
            ..rsi_config(14)
        };
        let signals = generate_signals(&bars, &config.strategy);
        assert!(signals.iter().any(|s| s.signal_type == SignalType::Buy));

        let mut sim = PortfolioSimulator::new(&config, bars[0].close);
        for signal in &signals {
            let cash_before = sim.state().cash;
            let trades_before = sim.trades().len();
            sim.step(signal);

            if sim.trades().len() > trades_before {
                let trade = sim.trades().last().unwrap();
                assert_eq!(trade.side, TradeSide::Buy);
                assert_eq!(sim.state().cash, cash_before - (trade.value + trade.commission));
            }
        }
        assert!(!sim.trades().is_empty());
        assert!(sim.state().cash >= 0.0);
    }

    #[test]
    fn transaction_costs_reduce_final_value() {
        let closes = [100.0, 90.0, 80.0, 90.0, 100.0, 110.0];
        let bars = bars_from_closes(date(2024, 1, 1), &closes);

        let free = run_backtest(&bars, &rsi_config(2)).unwrap();
        let costly = run_backtest(
            &bars,
            &BacktestConfig {
                transaction_cost_pct: 1.0,
                ..rsi_config(2)
            },
        )
        .unwrap();

        // Buy 12 @ 80, sell 6 @ 100, sell 3 @ 110.
        assert_eq!(free.trades.len(), 3);
        assert_eq!(costly.trades.len(), 3);
        assert_relative_eq!(free.metrics.final_value, 10_300.0, epsilon = 1e-9);
        assert_relative_eq!(costly.metrics.final_value, 10_281.1, epsilon = 1e-9);
        assert!(costly.metrics.final_value <= free.metrics.final_value);

        let commissions: f64 = costly.trades.iter().map(|t| t.commission).sum();
        assert_relative_eq!(
            free.metrics.final_value - costly.metrics.final_value,
            commissions,
            epsilon = 1e-9
        );
    }

    #[test]
    fn v_shape_trades_and_labels() {
        let closes = [100.0, 90.0, 80.0, 90.0, 100.0, 110.0];
        let bars = bars_from_closes(date(2024, 1, 1), &closes);
        let result = run_backtest(&bars, &rsi_config(2)).unwrap();

        let sides: Vec<TradeSide> = result.trades.iter().map(|t| t.side).collect();
        assert_eq!(sides, vec![TradeSide::Buy, TradeSide::Sell, TradeSide::Sell]);
        assert_eq!(result.trades[0].quantity, 12);
        assert_eq!(result.trades[0].label, "RSI BUY (confidence 100%)");
        assert_eq!(result.trades[1].label, "RSI SELL (confidence 100%)");
        // Both sells close part of a lot bought at 80.
        assert_eq!(result.metrics.winning_trades, 2);
        assert_eq!(result.metrics.win_rate, 1.0);
        assert_relative_eq!(result.metrics.benchmark_return, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn rerun_is_identical() {
        let bars = RandomWalkGenerator::new(100.0, Some(9)).generate(
            "AAPL",
            date(2023, 1, 1),
            date(2023, 12, 31),
        );
        let config = rsi_config(14);
        let first = run_backtest(&bars, &config).unwrap();
        let second = run_backtest(&bars, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_and_single_bar_series() {
        let result = run_backtest(&[], &rsi_config(14)).unwrap();
        assert!(result.equity.is_empty());
        assert_eq!(result.metrics.final_value, 10_000.0);

        let one = bars_from_closes(date(2024, 1, 1), &[100.0]);
        let result = run_backtest(&one, &rsi_config(14)).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.equity.is_empty());
    }

    #[test]
    fn stop_loss_is_accepted_but_not_applied() {
        let closes = [100.0, 90.0, 80.0, 90.0, 100.0, 110.0];
        let bars = bars_from_closes(date(2024, 1, 1), &closes);
        let plain = run_backtest(&bars, &rsi_config(2)).unwrap();
        let with_stops = run_backtest(
            &bars,
            &BacktestConfig {
                stop_loss_pct: Some(5.0),
                take_profit_pct: Some(10.0),
                ..rsi_config(2)
            },
        )
        .unwrap();
        assert_eq!(plain, with_stops);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bars = bars_from_closes(date(2024, 1, 1), &[100.0; 5]);
        let config = BacktestConfig {
            symbols: vec![],
            ..rsi_config(14)
        };
        assert!(matches!(
            run_backtest(&bars, &config),
            Err(SignaltraderError::ConfigInvalid { .. })
        ));
    }
}

mod accounting_invariants {
    use super::*;

    fn strategies() -> Vec<Strategy> {
        vec![
            rsi_config(14).strategy,
            Strategy::Macd(MacdParams::default()),
            Strategy::Bollinger(BollingerParams::default()),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn equity_matches_replayed_trades(
            seed in any::<u64>(),
            cost in 0.0f64..2.0,
            which in 0usize..3,
        ) {
            let bars = RandomWalkGenerator::new(100.0, Some(seed)).generate(
                "AAPL",
                date(2022, 1, 1),
                date(2022, 12, 31),
            );
            let config = BacktestConfig {
                strategy: strategies()[which].clone(),
                transaction_cost_pct: cost,
                ..rsi_config(14)
            };
            let signals = generate_signals(&bars, &config.strategy);
            let outcome = simulate(&bars, &signals, &config);

            prop_assert_eq!(outcome.equity.len(), bars.len() - 1);
            prop_assert!(outcome.trades.windows(2).all(|w| w[0].date <= w[1].date));

            let mut cash = config.initial_capital;
            let mut shares: u64 = 0;
            let mut trades = outcome.trades.iter().peekable();
            for (bar, point) in bars.iter().skip(1).zip(&outcome.equity) {
                prop_assert_eq!(point.date, bar.date);
                while let Some(t) = trades.next_if(|t| t.date == bar.date) {
                    cash += t.cash_flow();
                    match t.side {
                        TradeSide::Buy => shares += t.quantity,
                        TradeSide::Sell => shares -= t.quantity,
                    }
                    prop_assert!(cash >= 0.0);
                }
                prop_assert_eq!(point.value, cash + shares as f64 * bar.close);
            }
            prop_assert!(trades.next().is_none());
            prop_assert_eq!(outcome.final_state.cash, cash);
            prop_assert_eq!(outcome.final_state.holdings("AAPL"), shares);
        }

        #[test]
        fn metrics_stay_in_range(seed in any::<u64>(), which in 0usize..3) {
            let bars = RandomWalkGenerator::new(100.0, Some(seed)).generate(
                "AAPL",
                date(2022, 1, 1),
                date(2022, 6, 30),
            );
            let config = BacktestConfig {
                strategy: strategies()[which].clone(),
                ..rsi_config(14)
            };
            let m = run_backtest(&bars, &config).unwrap().metrics;

            prop_assert!((0.0..=1.0).contains(&m.max_drawdown));
            prop_assert!((0.0..=1.0).contains(&m.win_rate));
            prop_assert!(m.volatility >= 0.0);
            prop_assert!(m.sharpe_ratio.is_finite());
            prop_assert!(m.sortino_ratio.is_finite());
            prop_assert!(m.winning_trades + m.losing_trades <= m.number_of_trades);
        }
    }
}

mod data_loading {
    use super::*;

    #[test]
    fn uses_market_bars_when_available() {
        let bars = bars_from_closes(date(2024, 1, 1), &[100.0, 90.0, 80.0, 90.0, 100.0, 110.0]);
        let port = MockDataPort::new().with_bars("AAPL", bars.clone());
        let fallback = FixtureGenerator {
            closes: vec![1.0; 3],
        };

        let (result, source) = run_backtest_with_data(&port, &fallback, &rsi_config(2)).unwrap();

        assert_eq!(source, BarSource::Market);
        assert_eq!(result, run_backtest(&bars, &rsi_config(2)).unwrap());
        assert_eq!(*port.calls.borrow(), vec!["AAPL".to_string()]);
    }

    #[test]
    fn falls_back_to_generator_on_error() {
        let port = MockDataPort::new().with_error("AAPL", "connection refused");
        let fallback = FixtureGenerator {
            closes: vec![100.0; 10],
        };

        let (result, source) = run_backtest_with_data(&port, &fallback, &rsi_config(14)).unwrap();

        assert_eq!(source, BarSource::Synthetic);
        assert_eq!(result.equity.len(), 9);
        assert!(result.trades.is_empty());
    }

    #[test]
    fn falls_back_when_range_is_empty() {
        let bars = bars_from_closes(date(2020, 1, 1), &[100.0; 5]);
        let port = MockDataPort::new().with_bars("AAPL", bars);
        let fallback = FixtureGenerator {
            closes: vec![100.0; 4],
        };

        let (result, source) = run_backtest_with_data(&port, &fallback, &rsi_config(14)).unwrap();

        assert_eq!(source, BarSource::Synthetic);
        assert_eq!(result.equity.len(), 3);
        assert_eq!(result.equity[0].date, date(2024, 1, 2));
    }

    #[test]
    fn non_finite_csv_price_uses_full_synthetic_series() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("AAPL.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-02,100.0,101.0,99.0,100.0,1000\n\
             2024-01-03,100.0,101.0,99.0,NaN,1000\n\
             2024-01-04,100.0,101.0,99.0,100.0,1000\n",
        )
        .unwrap();
        let port = CsvAdapter::new(dir.path().to_path_buf());
        let fallback = FixtureGenerator {
            closes: linear_closes(100.0, 50.0, 20),
        };

        let (result, source) = run_backtest_with_data(&port, &fallback, &rsi_config(14)).unwrap();

        assert_eq!(source, BarSource::Synthetic);
        assert_eq!(result.equity.len(), 19);
        assert!(result
            .equity
            .iter()
            .all(|p| p.value.is_finite() && p.benchmark.is_finite()));
        assert!(result.metrics.final_value.is_finite());
        assert!(result.metrics.volatility.is_finite());
        assert!(result.metrics.sharpe_ratio.is_finite());
    }

    #[test]
    fn validates_before_fetching() {
        let port = MockDataPort::new();
        let fallback = FixtureGenerator { closes: vec![] };
        let config = BacktestConfig {
            initial_capital: 0.0,
            ..rsi_config(14)
        };

        assert!(run_backtest_with_data(&port, &fallback, &config).is_err());
        assert!(port.calls.borrow().is_empty());
    }
}

mod forward_simulation {
    use super::*;

    struct RangeRecorder {
        ranges: RefCell<Vec<(NaiveDate, NaiveDate)>>,
    }

    impl BarGenerator for RangeRecorder {
        fn generate(&self, _symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> Vec<OhlcvBar> {
            self.ranges.borrow_mut().push((start_date, end_date));
            bars_from_closes(start_date, &[100.0; 3])
        }
    }

    #[test]
    fn covers_exactly_the_requested_days() {
        let config = rsi_config(14);
        let recorder = RangeRecorder {
            ranges: RefCell::new(Vec::new()),
        };

        run_forward_simulation(&recorder, &config, 1).unwrap();
        run_forward_simulation(&recorder, &config, 60).unwrap();

        assert_eq!(
            *recorder.ranges.borrow(),
            vec![
                (date(2025, 1, 1), date(2025, 1, 1)),
                (date(2025, 1, 1), date(2025, 3, 1)),
            ]
        );
    }

    #[test]
    fn starts_after_end_date() {
        let generator = RandomWalkGenerator::new(100.0, Some(5));
        let config = rsi_config(14);

        let result = run_forward_simulation(&generator, &config, 60).unwrap();

        assert!(!result.equity.is_empty());
        assert!(result.equity.iter().all(|p| p.date > config.end_date));
        assert!(result.equity.iter().all(|p| p.date <= date(2025, 3, 1)));
    }

    #[test]
    fn is_deterministic_with_seed() {
        let config = rsi_config(14);
        let a = run_forward_simulation(&RandomWalkGenerator::new(100.0, Some(5)), &config, 90)
            .unwrap();
        let b = run_forward_simulation(&RandomWalkGenerator::new(100.0, Some(5)), &config, 90)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_zero_days() {
        let generator = RandomWalkGenerator::new(100.0, Some(5));
        assert!(matches!(
            run_forward_simulation(&generator, &rsi_config(14), 0),
            Err(SignaltraderError::ConfigInvalid { .. })
        ));
    }
}
