//! Value at Risk and Conditional Value at Risk.
//!
//! Historical VaR at confidence c is the ascending-sorted return at index
//! `floor(n * (1 - c))`. CVaR averages the sorted returns up to and including
//! that index, so it never exceeds the historical VaR.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::stats::{finite, mean, population_std};

/// VaR estimates as (typically negative) returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueAtRisk {
    pub historical: f64,
    /// `mean - z(c) * std` under a normal assumption, with the population
    /// standard deviation. `None` below two observations.
    pub parametric: Option<f64>,
}

/// VaR of `returns` at `confidence`. `None` for an empty series or a
/// confidence outside `(0, 1)`.
pub fn value_at_risk(returns: &[f64], confidence: f64) -> Option<ValueAtRisk> {
    let sorted = sorted_ascending(returns);
    let idx = tail_index(sorted.len(), confidence)?;
    let historical = sorted[idx];

    let parametric = match (mean(returns), population_std(returns), z_score(confidence)) {
        (Some(m), Some(s), Some(z)) => finite(m - z * s),
        _ => None,
    };

    Some(ValueAtRisk {
        historical,
        parametric,
    })
}

/// Expected shortfall: mean of the returns at or below the historical VaR position.
pub fn conditional_var(returns: &[f64], confidence: f64) -> Option<f64> {
    let sorted = sorted_ascending(returns);
    let idx = tail_index(sorted.len(), confidence)?;
    mean(&sorted[..=idx])
}

/// Standard-normal quantile for `confidence` (≈1.645 at 0.95).
pub fn z_score(confidence: f64) -> Option<f64> {
    let normal = Normal::new(0.0, 1.0).ok()?;
    finite(normal.inverse_cdf(confidence))
}

fn sorted_ascending(returns: &[f64]) -> Vec<f64> {
    let mut sorted = returns.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn tail_index(n: usize, confidence: f64) -> Option<usize> {
    if n == 0 || !(confidence > 0.0 && confidence < 1.0) {
        return None;
    }
    let idx = (n as f64 * (1.0 - confidence)).floor() as usize;
    Some(idx.min(n - 1))
}
