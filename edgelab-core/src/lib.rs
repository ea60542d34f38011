//! EdgeLab Core — signal detection, backtesting and risk analytics.
//!
//! This crate is the pure engine. It performs no I/O:
//! - Domain types (bars, validated series, signal indices, trades)
//! - Causal indicators (SMA, EMA, RSI, MACD, Bollinger, trailing volume)
//! - Signal detection over a closed set of signal kinds
//! - Forward-return analysis and round-trip trade simulation
//! - Performance aggregation and risk metrics

pub mod backtest;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod risk;
pub mod signals;

pub use backtest::{
    aggregate, forward_returns, simulate, ForwardReturnReport, OpenPositionPolicy,
    PerformanceSummary, SimulationConfig, DEFAULT_HORIZONS,
};
pub use domain::{Bar, BarError, ExitReason, OhlcvSeries, SignalIndices, TradeRecord};
pub use error::EngineError;
pub use risk::{risk_metrics, RiskMetrics};
pub use signals::{detect, detect_named, SignalKind, Trigger};
