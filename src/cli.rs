//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::synthetic_adapter::RandomWalkGenerator;
use crate::domain::backtest::{
    run_backtest as run_pipeline, run_backtest_with_data, run_forward_simulation, BacktestConfig,
    BacktestResult,
};
use crate::domain::config_validation::{build_backtest_config, build_data_settings, DataSettings};
use crate::domain::error::SignaltraderError;
use crate::domain::market_data::BarSource;
use crate::domain::strategy::Strategy;
use crate::ports::generator_port::BarGenerator;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "signaltrader", about = "Indicator signal backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over the configured date range
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Trade this symbol instead of the first configured one
        #[arg(long)]
        symbol: Option<String>,
        /// Directory of <SYMBOL>.csv files
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Seed for the synthetic fallback series
        #[arg(long)]
        seed: Option<u64>,
        /// Directory for trades.csv, equity.csv and summary.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the strategy forward on a synthetic series after end_date
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        days: u64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            symbol,
            data_dir,
            seed,
            output,
            dry_run,
        } => run_backtest(
            &config,
            symbol.as_deref(),
            data_dir,
            seed,
            output.as_deref(),
            dry_run,
        ),
        Command::Simulate { config, days, seed } => run_simulate(&config, days, seed),
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load an INI file and build the typed backtest and data settings.
pub fn load_config(path: &Path) -> Result<(BacktestConfig, DataSettings), SignaltraderError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    let config = build_backtest_config(&adapter)?;
    let settings = build_data_settings(&adapter)?;
    Ok((config, settings))
}

/// Move `symbol` to the front of the symbol list so it becomes the traded one.
pub fn apply_symbol_override(config: &mut BacktestConfig, symbol: &str) {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return;
    }
    config.symbols.retain(|s| *s != symbol);
    config.symbols.insert(0, symbol);
}

fn run_backtest(
    config_path: &Path,
    symbol: Option<&str>,
    data_dir: Option<PathBuf>,
    seed: Option<u64>,
    output: Option<&Path>,
    dry_run: bool,
) -> Result<(), SignaltraderError> {
    let (mut config, mut settings) = load_config(config_path)?;
    if let Some(symbol) = symbol {
        apply_symbol_override(&mut config, symbol);
    }
    if data_dir.is_some() {
        settings.dir = data_dir;
    }
    if seed.is_some() {
        settings.seed = seed;
    }
    config.validate()?;

    print_config(&config, &settings);
    if dry_run {
        eprintln!("\nDry run: config validated, backtest not executed");
        return Ok(());
    }

    let generator = RandomWalkGenerator::new(settings.base_price, settings.seed);
    let (result, source) = match &settings.dir {
        Some(dir) => run_backtest_with_data(&CsvAdapter::new(dir.clone()), &generator, &config)?,
        None => {
            warn!(
                symbol = config.primary_symbol(),
                "no data directory configured, using synthetic series"
            );
            let bars = generator.generate(config.primary_symbol(), config.start_date, config.end_date);
            (run_pipeline(&bars, &config)?, BarSource::Synthetic)
        }
    };

    if source == BarSource::Synthetic {
        eprintln!("Note: results use a synthetic price series");
    }
    print_summary(&result, &config);

    if let Some(dir) = output {
        let dir = dir.to_string_lossy();
        CsvReportAdapter.write(&result, &config, &dir)?;
        eprintln!("\nReport written to {}", dir);
    }
    Ok(())
}

fn run_simulate(config_path: &Path, days: u64, seed: Option<u64>) -> Result<(), SignaltraderError> {
    let (config, mut settings) = load_config(config_path)?;
    if seed.is_some() {
        settings.seed = seed;
    }

    let generator = RandomWalkGenerator::new(settings.base_price, settings.seed);
    let result = run_forward_simulation(&generator, &config, days)?;

    eprintln!(
        "\nForward simulation: {} days after {} ({} bars)",
        days,
        config.end_date,
        result.equity.len() + 1
    );
    print_summary(&result, &config);
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SignaltraderError> {
    let (config, settings) = load_config(config_path)?;
    eprintln!("Config validated successfully");
    print_config(&config, &settings);
    Ok(())
}

fn describe_strategy(strategy: &Strategy) -> String {
    match strategy {
        Strategy::Rsi(p) => format!(
            "RSI(period={}, oversold={}, overbought={})",
            p.period, p.oversold, p.overbought
        ),
        Strategy::Macd(p) => format!("MACD(fast={}, slow={}, signal={})", p.fast, p.slow, p.signal),
        Strategy::Bollinger(p) => format!(
            "Bollinger(period={}, stddev_mult={})",
            p.period, p.stddev_mult
        ),
    }
}

fn print_config(config: &BacktestConfig, settings: &DataSettings) {
    eprintln!("\n=== Configuration ===");
    eprintln!("Strategy:         {}", describe_strategy(&config.strategy));
    eprintln!("Symbols:          {}", config.symbols.join(", "));
    eprintln!("Period:           {} to {}", config.start_date, config.end_date);
    eprintln!("Initial Capital:  {:.2}", config.initial_capital);
    eprintln!("Cost per Trade:   {}%", config.transaction_cost_pct);
    match &settings.dir {
        Some(dir) => eprintln!("Data:             {}", dir.display()),
        None => eprintln!("Data:             synthetic (base {:.2})", settings.base_price),
    }
}

fn print_summary(result: &BacktestResult, config: &BacktestConfig) {
    let m = &result.metrics;
    eprintln!("\n=== Results: {} on {} ===", config.strategy, config.primary_symbol());
    eprintln!("Final Value:      {:.2}", m.final_value);
    eprintln!("Total Return:     {:.2}%", m.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", m.annualized_return * 100.0);
    eprintln!("Volatility:       {:.2}%", m.volatility * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.2}", m.sortino_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", m.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", m.number_of_trades);
    eprintln!("Win Rate:         {:.1}%", m.win_rate * 100.0);
    eprintln!("Benchmark Return: {:.2}%", m.benchmark_return * 100.0);
}
