//! EdgeLab CLI — signal backtest, strategy simulation and risk commands.
//!
//! Commands:
//! - `signals` — list the signal kinds with their trigger style and warm-up
//! - `backtest` — forward-return backtest of one signal kind
//! - `simulate` — entry/exit round-trip simulation with stop loss and take profit
//! - `risk` — risk metrics of one symbol against a benchmark
//!
//! Bars come from a CSV file (`--csv`) or a deterministic synthetic walk
//! (`--synthetic N`). Results are printed to stdout as JSON; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use edgelab_core::signals::SignalKind;
use edgelab_runner::{
    load_csv, run_risk_metrics, run_signal_backtest, run_strategy_simulation, synthetic_bars,
    EngineConfig, LoadedData, RiskRequest, SignalBacktestRequest, StrategyRequest,
};

#[derive(Parser)]
#[command(
    name = "edgelab",
    about = "EdgeLab CLI — signal backtesting and risk analytics"
)]
struct Cli {
    /// Path to a TOML engine config. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the bars for one symbol come from.
#[derive(Args)]
struct Source {
    /// Ticker symbol the data belongs to.
    #[arg(long)]
    symbol: String,

    /// CSV file with date,open,high,low,close,volume columns.
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Generate N synthetic bars instead of reading a file.
    #[arg(long)]
    synthetic: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every signal kind.
    Signals,
    /// Detect one signal kind and report forward returns.
    Backtest {
        #[command(flatten)]
        source: Source,

        /// Signal kind (e.g. rsi_oversold, golden_cross).
        #[arg(long)]
        signal: String,

        /// Forward horizons in bars, overriding the config (e.g. --horizons 5,20).
        #[arg(long, value_delimiter = ',')]
        horizons: Option<Vec<usize>>,
    },
    /// Simulate entry/exit round trips.
    Simulate {
        #[command(flatten)]
        source: Source,

        /// Entry signal kind.
        #[arg(long)]
        entry: String,

        /// Exit signal kind.
        #[arg(long)]
        exit: String,

        /// Stop loss in percent, overriding the config.
        #[arg(long)]
        stop_loss: Option<f64>,

        /// Take profit in percent, overriding the config.
        #[arg(long)]
        take_profit: Option<f64>,
    },
    /// Risk metrics against a benchmark.
    Risk {
        #[command(flatten)]
        source: Source,

        /// Benchmark symbol.
        #[arg(long, default_value = "SPY")]
        benchmark: String,

        /// Benchmark CSV file.
        #[arg(long, conflicts_with = "benchmark_synthetic")]
        benchmark_csv: Option<PathBuf>,

        /// Generate N synthetic benchmark bars.
        #[arg(long)]
        benchmark_synthetic: Option<usize>,

        /// Confidence for the reported tail risk, overriding the config.
        #[arg(long)]
        confidence: Option<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "edgelab=info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Signals => print_json(&signal_table(), cli.pretty),
        Commands::Backtest {
            source,
            signal,
            horizons,
        } => {
            let data = load_source(&source.symbol, source.csv.as_deref(), source.synthetic)?;
            let mut request = SignalBacktestRequest::new(&source.symbol, signal.parse()?, &config);
            if let Some(horizons) = horizons {
                request.horizons = horizons;
            }
            let result = run_signal_backtest(&request, &data)?;
            print_json(&result, cli.pretty)
        }
        Commands::Simulate {
            source,
            entry,
            exit,
            stop_loss,
            take_profit,
        } => {
            let data = load_source(&source.symbol, source.csv.as_deref(), source.synthetic)?;
            let mut request =
                StrategyRequest::new(&source.symbol, entry.parse()?, exit.parse()?, &config);
            if let Some(pct) = stop_loss {
                request.simulation.stop_loss_pct = pct;
            }
            if take_profit.is_some() {
                request.simulation.take_profit_pct = take_profit;
            }
            let result = run_strategy_simulation(&request, &data)?;
            print_json(&result, cli.pretty)
        }
        Commands::Risk {
            source,
            benchmark,
            benchmark_csv,
            benchmark_synthetic,
            confidence,
        } => {
            let asset = load_source(&source.symbol, source.csv.as_deref(), source.synthetic)?;
            let bench = load_source(&benchmark, benchmark_csv.as_deref(), benchmark_synthetic)?;
            let mut request = RiskRequest::new(&source.symbol, &benchmark, &config);
            if let Some(c) = confidence {
                request.confidence = c;
            }
            let report = run_risk_metrics(&request, &asset, &bench)?;
            print_json(&report, cli.pretty)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn load_source(symbol: &str, csv: Option<&Path>, synthetic: Option<usize>) -> Result<LoadedData> {
    match (csv, synthetic) {
        (Some(path), _) => Ok(load_csv(path, symbol)?),
        (None, Some(n)) => {
            let data = synthetic_bars(symbol, n)?;
            tracing::warn!(symbol, bars = n, "using SYNTHETIC data");
            Ok(data)
        }
        (None, None) => bail!("one of --csv or --synthetic is required for {symbol}"),
    }
}

#[derive(Serialize)]
struct SignalRow {
    name: &'static str,
    trigger: edgelab_core::signals::Trigger,
    warmup: usize,
}

fn signal_table() -> Vec<SignalRow> {
    SignalKind::ALL
        .iter()
        .map(|&kind| SignalRow {
            name: kind.name(),
            trigger: kind.trigger(),
            warmup: kind.warmup(),
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
