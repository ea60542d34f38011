//! Backtesting over detected signal indices.
//!
//! - [`forward`]: read-only forward-return statistics per horizon.
//! - [`simulator`]: round-trip trade simulation with protective exits.
//! - [`performance`]: aggregate statistics over simulated trades.

pub mod forward;
pub mod performance;
pub mod simulator;

pub use forward::{
    forward_returns, ForwardReturnReport, HorizonStats, DEFAULT_HORIZONS, MAX_AVAILABLE_HORIZON,
};
pub use performance::{aggregate, ExitReasonCounts, PerformanceSummary};
pub use simulator::{
    exit_decision, simulate, OpenPositionPolicy, PositionState, SimulationConfig,
};
