//! CSV report adapter implementing ReportPort.
//!
//! Writes `trades.csv`, `equity.csv` and `summary.csv` into the output
//! directory, creating it if needed.

use std::fs;
use std::path::Path;

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::SignaltraderError;
use crate::ports::report_port::ReportPort;
use csv::Writer;
use tracing::info;

pub const TRADES_FILE: &str = "trades.csv";
pub const EQUITY_FILE: &str = "equity.csv";
pub const SUMMARY_FILE: &str = "summary.csv";

pub struct CsvReportAdapter;

fn report_err(e: csv::Error) -> SignaltraderError {
    SignaltraderError::Report {
        reason: e.to_string(),
    }
}

fn write_trades(path: &Path, result: &BacktestResult) -> Result<(), SignaltraderError> {
    let mut w = Writer::from_path(path).map_err(report_err)?;
    w.write_record([
        "date",
        "symbol",
        "side",
        "quantity",
        "price",
        "value",
        "commission",
        "label",
    ])
    .map_err(report_err)?;
    for t in &result.trades {
        w.write_record([
            t.date.to_string(),
            t.symbol.clone(),
            t.side.to_string(),
            t.quantity.to_string(),
            format!("{:.4}", t.price),
            format!("{:.4}", t.value),
            format!("{:.4}", t.commission),
            t.label.clone(),
        ])
        .map_err(report_err)?;
    }
    w.flush()?;
    Ok(())
}

fn write_equity(path: &Path, result: &BacktestResult) -> Result<(), SignaltraderError> {
    let mut w = Writer::from_path(path).map_err(report_err)?;
    w.write_record(["date", "value", "benchmark"])
        .map_err(report_err)?;
    for p in &result.equity {
        w.write_record([
            p.date.to_string(),
            format!("{:.4}", p.value),
            format!("{:.4}", p.benchmark),
        ])
        .map_err(report_err)?;
    }
    w.flush()?;
    Ok(())
}

fn write_summary(
    path: &Path,
    result: &BacktestResult,
    config: &BacktestConfig,
) -> Result<(), SignaltraderError> {
    let m = &result.metrics;
    let rows: Vec<(&str, String)> = vec![
        ("strategy", config.strategy.to_string()),
        ("symbol", config.primary_symbol().to_string()),
        ("start_date", config.start_date.to_string()),
        ("end_date", config.end_date.to_string()),
        ("initial_capital", format!("{:.2}", config.initial_capital)),
        ("final_value", format!("{:.2}", m.final_value)),
        ("total_return", format!("{:.6}", m.total_return)),
        ("annualized_return", format!("{:.6}", m.annualized_return)),
        ("volatility", format!("{:.6}", m.volatility)),
        ("sharpe_ratio", format!("{:.6}", m.sharpe_ratio)),
        ("sortino_ratio", format!("{:.6}", m.sortino_ratio)),
        ("max_drawdown", format!("{:.6}", m.max_drawdown)),
        ("max_drawdown_duration", m.max_drawdown_duration.to_string()),
        ("win_rate", format!("{:.6}", m.win_rate)),
        ("number_of_trades", m.number_of_trades.to_string()),
        ("benchmark_return", format!("{:.6}", m.benchmark_return)),
    ];

    let mut w = Writer::from_path(path).map_err(report_err)?;
    w.write_record(["metric", "value"]).map_err(report_err)?;
    for (name, value) in rows {
        w.write_record([name, value.as_str()]).map_err(report_err)?;
    }
    w.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        config: &BacktestConfig,
        output_path: &str,
    ) -> Result<(), SignaltraderError> {
        let dir = Path::new(output_path);
        fs::create_dir_all(dir)?;

        write_trades(&dir.join(TRADES_FILE), result)?;
        write_equity(&dir.join(EQUITY_FILE), result)?;
        write_summary(&dir.join(SUMMARY_FILE), result, config)?;

        info!(dir = %dir.display(), "report written");
        Ok(())
    }
}
