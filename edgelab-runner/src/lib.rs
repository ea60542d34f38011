//! EdgeLab Runner — request orchestration around `edgelab-core`.
//!
//! This crate provides:
//! - TOML engine configuration with defaults and validation
//! - Bar loading from CSV or a deterministic synthetic walk
//! - One runner per request kind (signal backtest, strategy, risk)
//! - Content-addressed run fingerprints
//! - Batch execution, serial or on the rayon pool

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod runner;

pub use batch::{run_batch, Job, JobOutput};
pub use config::{ConfigError, EngineConfig, RiskSettings, SignalBacktestSettings};
pub use data_loader::{load_csv, read_csv, synthetic_bars, LoadError, LoadedData};
pub use runner::{
    run_risk_metrics, run_signal_backtest, run_strategy_simulation, RiskReport, RiskRequest,
    RunError, RunId, SignalBacktestRequest, SignalBacktestResult, StrategyRequest,
    StrategyResult, TailRisk, SCHEMA_VERSION,
};
