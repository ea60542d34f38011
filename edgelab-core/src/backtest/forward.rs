//! Forward-return analysis: what happened after each signal, without trading.
//!
//! For signal index i and horizon h with i + h < len:
//! ret = (close[i+h] - close[i]) / close[i]. Signals too close to the end of
//! the series simply contribute no sample for that horizon.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{OhlcvSeries, SignalIndices};
use crate::error::EngineError;
use crate::risk::stats::mean;

/// Horizons (in bars) used when the caller does not supply any.
pub const DEFAULT_HORIZONS: [usize; 3] = [5, 20, 60];

/// Cap, in bars, on the holding window behind `best_trade`, `worst_trade`
/// and `profit_factor`. Independent of the requested horizons.
pub const MAX_AVAILABLE_HORIZON: usize = 60;

/// Forward-return statistics for one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonStats {
    pub horizon: usize,
    pub samples: usize,
    /// Fraction of samples strictly above zero.
    pub win_rate: Option<f64>,
    pub avg_return: Option<f64>,
}

/// Result of [`forward_returns`].
///
/// `best_trade`, `worst_trade` and `profit_factor` are computed over the
/// maximum-available return of each signal: the return to
/// `min(i + MAX_AVAILABLE_HORIZON, len - 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardReturnReport {
    pub total_signals: usize,
    pub horizons: Vec<HorizonStats>,
    pub best_trade: Option<f64>,
    pub worst_trade: Option<f64>,
    pub profit_factor: Option<f64>,
}

impl ForwardReturnReport {
    pub fn horizon(&self, horizon: usize) -> Option<&HorizonStats> {
        self.horizons.iter().find(|h| h.horizon == horizon)
    }
}

/// Compute forward-return statistics for `indices` over `series`.
pub fn forward_returns(
    series: &OhlcvSeries,
    indices: &SignalIndices,
    horizons: &[usize],
) -> Result<ForwardReturnReport, EngineError> {
    validate_horizons(horizons)?;
    indices.validate_for(series.len())?;

    let closes = series.closes();
    let len = closes.len();

    let horizon_stats: Vec<HorizonStats> = horizons
        .iter()
        .map(|&h| {
            let rets: Vec<f64> = indices
                .iter()
                .filter(|&i| i + h < len)
                .map(|i| simple_return(closes[i], closes[i + h]))
                .collect();
            summarize_horizon(h, &rets)
        })
        .collect();

    let max_available: Vec<f64> = indices
        .iter()
        .filter_map(|i| {
            let exit = (i + MAX_AVAILABLE_HORIZON).min(len - 1);
            (exit > i).then(|| simple_return(closes[i], closes[exit]))
        })
        .collect();

    let best_trade = max_available.iter().copied().reduce(f64::max);
    let worst_trade = max_available.iter().copied().reduce(f64::min);

    debug!(
        signals = indices.len(),
        horizons = horizons.len(),
        max_available = max_available.len(),
        "forward returns computed"
    );

    Ok(ForwardReturnReport {
        total_signals: indices.len(),
        horizons: horizon_stats,
        best_trade,
        worst_trade,
        profit_factor: profit_factor(&max_available),
    })
}

/// Gross gains over gross losses. `None` when there are no losses.
pub fn profit_factor(returns: &[f64]) -> Option<f64> {
    let gains: f64 = returns.iter().filter(|&&r| r > 0.0).sum();
    let losses: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r.abs()).sum();
    if losses > 0.0 {
        Some(gains / losses)
    } else {
        None
    }
}

fn validate_horizons(horizons: &[usize]) -> Result<(), EngineError> {
    if horizons.is_empty() {
        return Err(EngineError::InvalidConfig(
            "at least one forward horizon is required".into(),
        ));
    }
    if horizons.contains(&0) {
        return Err(EngineError::InvalidConfig(
            "forward horizons must be positive".into(),
        ));
    }
    Ok(())
}

fn simple_return(from: f64, to: f64) -> f64 {
    (to - from) / from
}

fn summarize_horizon(horizon: usize, rets: &[f64]) -> HorizonStats {
    let win_rate = if rets.is_empty() {
        None
    } else {
        Some(rets.iter().filter(|&&r| r > 0.0).count() as f64 / rets.len() as f64)
    };
    HorizonStats {
        horizon,
        samples: rets.len(),
        win_rate,
        avg_return: mean(rets),
    }
}
