//! Risk metrics over return series.
//!
//! Every statistic is an `Option<f64>`: too few observations or a zero
//! denominator yields `None`, and no NaN or infinity reaches a result record.

pub mod metrics;
pub mod stats;
pub mod var;

pub use metrics::{risk_metrics, RiskMetrics, TRADING_DAYS};
pub use stats::{JarqueBera, ReturnStats};
pub use var::{conditional_var, value_at_risk, ValueAtRisk};
