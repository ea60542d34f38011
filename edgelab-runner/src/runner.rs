//! Request runner — wires loaded bars through the core engine.
//!
//! Three entry points, one per request kind:
//! - `run_signal_backtest()`: detect one signal kind and report forward returns.
//! - `run_strategy_simulation()`: detect entry and exit kinds, simulate, aggregate.
//! - `run_risk_metrics()`: risk metrics of one series against a benchmark.
//!
//! Every request has a content-addressed `run_id` (BLAKE3 over the canonical
//! request JSON and the dataset hash) so identical requests on identical data
//! can share cached results.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, info_span, warn};

use edgelab_core::backtest::{
    aggregate, forward_returns, simulate, ForwardReturnReport, PerformanceSummary,
    SimulationConfig,
};
use edgelab_core::domain::{SignalIndices, TradeRecord};
use edgelab_core::risk::{
    conditional_var, risk_metrics, value_at_risk, ReturnStats, RiskMetrics, ValueAtRisk,
};
use edgelab_core::signals::{detect, SignalKind, Trigger};
use edgelab_core::EngineError;

use crate::config::{ConfigError, EngineConfig};
use crate::data_loader::{LoadError, LoadedData};

/// Unique identifier for a request run (content-addressable hash).
pub type RunId = String;

/// Current schema version for serialized results.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("insufficient data: need at least {needed} overlapping observations, have {available}")]
    InsufficientData { needed: usize, available: usize },
    #[error("request is for '{requested}' but loaded data is for '{loaded}'")]
    SymbolMismatch { requested: String, loaded: String },
    #[error("failed to serialize request: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ─── Requests ───────────────────────────────────────────────────────

/// Forward-return backtest of one signal kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBacktestRequest {
    pub symbol: String,
    pub signal: SignalKind,
    pub horizons: Vec<usize>,
}

impl SignalBacktestRequest {
    pub fn new(symbol: impl Into<String>, signal: SignalKind, config: &EngineConfig) -> Self {
        Self {
            symbol: symbol.into(),
            signal,
            horizons: config.signal_backtest.horizons.clone(),
        }
    }

    pub fn fingerprint(&self, dataset_hash: &str) -> Result<RunId, RunError> {
        fingerprint("signal_backtest", self, dataset_hash)
    }
}

/// Entry/exit strategy simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRequest {
    pub symbol: String,
    pub entry_signal: SignalKind,
    pub exit_signal: SignalKind,
    pub simulation: SimulationConfig,
}

impl StrategyRequest {
    pub fn new(
        symbol: impl Into<String>,
        entry_signal: SignalKind,
        exit_signal: SignalKind,
        config: &EngineConfig,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            entry_signal,
            exit_signal,
            simulation: config.simulation.clone(),
        }
    }

    pub fn fingerprint(&self, dataset_hash: &str) -> Result<RunId, RunError> {
        fingerprint("strategy", self, dataset_hash)
    }
}

/// Risk metrics of `symbol` against `benchmark`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRequest {
    pub symbol: String,
    pub benchmark: String,
    pub confidence: f64,
    pub min_observations: usize,
}

impl RiskRequest {
    pub fn new(symbol: impl Into<String>, benchmark: impl Into<String>, config: &EngineConfig) -> Self {
        Self {
            symbol: symbol.into(),
            benchmark: benchmark.into(),
            confidence: config.risk.confidence,
            min_observations: config.risk.min_observations,
        }
    }

    pub fn fingerprint(&self, dataset_hash: &str) -> Result<RunId, RunError> {
        fingerprint("risk", self, dataset_hash)
    }
}

fn fingerprint<T: Serialize>(kind: &str, request: &T, dataset_hash: &str) -> Result<RunId, RunError> {
    let json = serde_json::to_string(request)?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(kind.as_bytes());
    hasher.update(json.as_bytes());
    hasher.update(dataset_hash.as_bytes());
    Ok(hasher.finalize().to_hex().to_string())
}

// ─── Results ────────────────────────────────────────────────────────

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Result of a forward-return signal backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBacktestResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub signal: SignalKind,
    /// Level-triggered kinds fire on every qualifying bar, so their counts
    /// are not comparable with edge-triggered kinds.
    pub trigger: Trigger,
    pub data_points: usize,
    pub synthetic: bool,
    pub signals: SignalIndices,
    pub report: ForwardReturnReport,
}

/// Result of a strategy simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub entry_signal: SignalKind,
    pub exit_signal: SignalKind,
    pub data_points: usize,
    pub synthetic: bool,
    pub config: SimulationConfig,
    pub summary: PerformanceSummary,
    pub trades: Vec<TradeRecord>,
}

/// VaR and CVaR at the requested confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailRisk {
    pub confidence: f64,
    pub var: Option<ValueAtRisk>,
    pub cvar: Option<f64>,
}

/// Result of a risk-metrics request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub benchmark: String,
    /// Number of asset returns.
    pub data_points: usize,
    pub synthetic: bool,
    pub metrics: RiskMetrics,
    pub tail: TailRisk,
    pub return_stats: ReturnStats,
}

// ─── Runners ────────────────────────────────────────────────────────

/// Detect `request.signal` over `data` and analyze forward returns.
pub fn run_signal_backtest(
    request: &SignalBacktestRequest,
    data: &LoadedData,
) -> Result<SignalBacktestResult, RunError> {
    let _span = info_span!("signal_backtest", symbol = %request.symbol, signal = %request.signal)
        .entered();
    check_symbol(&request.symbol, data)?;

    let signals = detect(&data.series, request.signal);
    let report = forward_returns(&data.series, &signals, &request.horizons)?;

    info!(
        bars = data.series.len(),
        signals = signals.len(),
        "signal backtest complete"
    );
    Ok(SignalBacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: request.fingerprint(&data.dataset_hash)?,
        symbol: request.symbol.clone(),
        signal: request.signal,
        trigger: request.signal.trigger(),
        data_points: data.series.len(),
        synthetic: data.synthetic,
        signals,
        report,
    })
}

/// Simulate entry/exit round trips over `data` and aggregate them.
pub fn run_strategy_simulation(
    request: &StrategyRequest,
    data: &LoadedData,
) -> Result<StrategyResult, RunError> {
    let _span = info_span!(
        "strategy_simulation",
        symbol = %request.symbol,
        entry = %request.entry_signal,
        exit = %request.exit_signal
    )
    .entered();
    check_symbol(&request.symbol, data)?;

    let entries = detect(&data.series, request.entry_signal);
    let exits = detect(&data.series, request.exit_signal);
    let trades = simulate(&data.series, &entries, &exits, &request.simulation)?;
    let summary = aggregate(&trades, &data.series);

    info!(
        bars = data.series.len(),
        entries = entries.len(),
        exits = exits.len(),
        trades = trades.len(),
        "strategy simulation complete"
    );
    Ok(StrategyResult {
        schema_version: SCHEMA_VERSION,
        run_id: request.fingerprint(&data.dataset_hash)?,
        symbol: request.symbol.clone(),
        entry_signal: request.entry_signal,
        exit_signal: request.exit_signal,
        data_points: data.series.len(),
        synthetic: data.synthetic,
        config: request.simulation.clone(),
        summary,
        trades,
    })
}

/// Risk metrics of `asset` against `benchmark`, computed on simple close-to-close returns.
pub fn run_risk_metrics(
    request: &RiskRequest,
    asset: &LoadedData,
    benchmark: &LoadedData,
) -> Result<RiskReport, RunError> {
    let _span = info_span!("risk_metrics", symbol = %request.symbol, benchmark = %request.benchmark)
        .entered();
    check_symbol(&request.symbol, asset)?;
    check_symbol(&request.benchmark, benchmark)?;
    if !(request.confidence > 0.0 && request.confidence < 1.0) {
        return Err(ConfigError::Invalid(format!(
            "confidence must be in (0, 1), got {}",
            request.confidence
        ))
        .into());
    }

    let returns = asset.series.returns();
    let bench_returns = benchmark.series.returns();
    let available = returns.len().min(bench_returns.len());
    if available < request.min_observations {
        warn!(
            needed = request.min_observations,
            available, "insufficient data for risk metrics"
        );
        return Err(RunError::InsufficientData {
            needed: request.min_observations,
            available,
        });
    }

    let metrics = risk_metrics(&returns, &bench_returns)?;
    let tail = TailRisk {
        confidence: request.confidence,
        var: value_at_risk(&returns, request.confidence),
        cvar: conditional_var(&returns, request.confidence),
    };

    let dataset_hash = format!("{}:{}", asset.dataset_hash, benchmark.dataset_hash);
    info!(
        observations = returns.len(),
        aligned = metrics.aligned_observations,
        "risk metrics complete"
    );
    Ok(RiskReport {
        schema_version: SCHEMA_VERSION,
        run_id: request.fingerprint(&dataset_hash)?,
        symbol: request.symbol.clone(),
        benchmark: request.benchmark.clone(),
        data_points: returns.len(),
        synthetic: asset.synthetic || benchmark.synthetic,
        return_stats: ReturnStats::from_returns(&returns),
        metrics,
        tail,
    })
}

fn check_symbol(requested: &str, data: &LoadedData) -> Result<(), RunError> {
    if requested.eq_ignore_ascii_case(&data.symbol) {
        Ok(())
    } else {
        Err(RunError::SymbolMismatch {
            requested: requested.to_string(),
            loaded: data.symbol.clone(),
        })
    }
}
