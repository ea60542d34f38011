//! Risk-adjusted performance of an asset return series against a benchmark.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stats::{finite, mean, sample_covariance, sample_std, JarqueBera, ReturnStats};
use super::var::{conditional_var, value_at_risk, ValueAtRisk};
use crate::error::EngineError;

/// Annualization factor for daily returns.
pub const TRADING_DAYS: f64 = 252.0;

/// Risk metrics for one asset. `None` marks a statistic that is undefined
/// for the given input (too few observations or a zero denominator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub sharpe_ratio: Option<f64>,
    pub sortino_ratio: Option<f64>,
    /// Fraction in `[0, 1]`.
    pub max_drawdown: Option<f64>,
    pub beta: Option<f64>,
    /// Jensen's alpha, annualized.
    pub alpha: Option<f64>,
    pub var_95: Option<ValueAtRisk>,
    pub cvar_95: Option<f64>,
    pub var_99: Option<ValueAtRisk>,
    pub cvar_99: Option<f64>,
    pub annualized_return: Option<f64>,
    pub annualized_volatility: Option<f64>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
    pub jarque_bera: Option<JarqueBera>,
    pub observations: usize,
    /// Length of the asset/benchmark overlap used for beta and alpha.
    pub aligned_observations: usize,
}

/// Compute [`RiskMetrics`] for `returns` against `benchmark`.
///
/// Fails only when either series contains NaN or infinity. The two series
/// are aligned by keeping the most recent `min(len)` observations of each.
pub fn risk_metrics(returns: &[f64], benchmark: &[f64]) -> Result<RiskMetrics, EngineError> {
    check_finite(returns)?;
    check_finite(benchmark)?;

    let stats = ReturnStats::from_returns(returns);
    let m = mean(returns);
    let std = sample_std(returns);
    let sqrt_days = TRADING_DAYS.sqrt();

    let sharpe_ratio = match (m, std) {
        (Some(m), Some(s)) if s > 0.0 => finite(m / s * sqrt_days),
        _ => None,
    };

    let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    let sortino_ratio = match (m, sample_std(&downside)) {
        (Some(m), Some(d)) if d > 0.0 => finite(m / d * sqrt_days),
        _ => None,
    };

    let aligned = returns.len().min(benchmark.len());
    let asset = &returns[returns.len() - aligned..];
    let bench = &benchmark[benchmark.len() - aligned..];
    let beta = beta(asset, bench);
    let alpha = match (beta, mean(asset), mean(bench)) {
        (Some(b), Some(ma), Some(mb)) => finite((ma - b * mb) * TRADING_DAYS),
        _ => None,
    };

    let metrics = RiskMetrics {
        sharpe_ratio,
        sortino_ratio,
        max_drawdown: stats.max_drawdown,
        beta,
        alpha,
        var_95: value_at_risk(returns, 0.95),
        cvar_95: conditional_var(returns, 0.95),
        var_99: value_at_risk(returns, 0.99),
        cvar_99: conditional_var(returns, 0.99),
        annualized_return: m.and_then(|m| finite(m * TRADING_DAYS)),
        annualized_volatility: std.and_then(|s| finite(s * sqrt_days)),
        skewness: stats.skewness,
        kurtosis: stats.kurtosis,
        jarque_bera: stats.jarque_bera,
        observations: returns.len(),
        aligned_observations: aligned,
    };

    debug!(
        observations = metrics.observations,
        aligned = aligned,
        beta_defined = metrics.beta.is_some(),
        "risk metrics computed"
    );
    Ok(metrics)
}

/// Sample covariance over sample benchmark variance.
fn beta(asset: &[f64], bench: &[f64]) -> Option<f64> {
    let var = sample_std(bench)?.powi(2);
    if var <= 0.0 {
        return None;
    }
    finite(sample_covariance(asset, bench)? / var)
}

fn check_finite(values: &[f64]) -> Result<(), EngineError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(position) => Err(EngineError::NonFiniteInput { position }),
        None => Ok(()),
    }
}
