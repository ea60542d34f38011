//! Performance aggregation over simulated trades.
//!
//! The equity curve is trade-indexed: it starts at 100 and compounds each
//! trade's percentage PnL in order. Drawdown is measured on that curve, not
//! on the bar-by-bar mark-to-market.

use serde::{Deserialize, Serialize};

use super::forward::profit_factor;
use crate::domain::{ExitReason, OhlcvSeries, TradeRecord};
use crate::risk::stats::{finite, mean, population_std};
use crate::risk::TRADING_DAYS;

const STARTING_EQUITY: f64 = 100.0;

/// Number of trades closed for each reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitReasonCounts {
    pub stop_loss: usize,
    pub take_profit: usize,
    pub signal: usize,
    pub end_of_data: usize,
}

impl ExitReasonCounts {
    pub fn record(&mut self, reason: ExitReason) {
        match reason {
            ExitReason::StopLoss => self.stop_loss += 1,
            ExitReason::TakeProfit => self.take_profit += 1,
            ExitReason::Signal => self.signal += 1,
            ExitReason::EndOfData => self.end_of_data += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.stop_loss + self.take_profit + self.signal + self.end_of_data
    }
}

/// Summary statistics of a simulated strategy.
///
/// With no trades every statistic is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_trades: usize,
    pub win_rate: Option<f64>,
    pub avg_pnl_pct: Option<f64>,
    /// Largest peak-to-trough decline of the trade equity curve, in percent.
    pub max_drawdown_pct: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub strategy_return_pct: Option<f64>,
    pub buy_hold_return_pct: Option<f64>,
    pub vs_buy_and_hold: Option<f64>,
    pub profit_factor: Option<f64>,
    pub avg_days_held: Option<f64>,
    pub exit_reasons: ExitReasonCounts,
}

impl PerformanceSummary {
    fn empty() -> Self {
        Self {
            total_trades: 0,
            win_rate: None,
            avg_pnl_pct: None,
            max_drawdown_pct: None,
            sharpe_ratio: None,
            strategy_return_pct: None,
            buy_hold_return_pct: None,
            vs_buy_and_hold: None,
            profit_factor: None,
            avg_days_held: None,
            exit_reasons: ExitReasonCounts::default(),
        }
    }
}

/// Aggregate `trades` simulated over `series`.
pub fn aggregate(trades: &[TradeRecord], series: &OhlcvSeries) -> PerformanceSummary {
    if trades.is_empty() {
        return PerformanceSummary::empty();
    }

    let pnls: Vec<f64> = trades.iter().map(|t| t.pnl_pct).collect();
    let days: Vec<f64> = trades.iter().map(|t| t.days_held as f64).collect();
    let winners = trades.iter().filter(|t| t.is_winner()).count();

    let equity = equity_curve(trades);
    let final_equity = equity.last().copied().unwrap_or(STARTING_EQUITY);
    let strategy_return_pct = finite(final_equity - STARTING_EQUITY);

    let buy_hold_return_pct = match (series.first_close(), series.last_close()) {
        (Some(first), Some(last)) => finite((last - first) / first * 100.0),
        _ => None,
    };
    let vs_buy_and_hold = match (strategy_return_pct, buy_hold_return_pct) {
        (Some(s), Some(b)) => finite(s - b),
        _ => None,
    };

    let avg_days_held = mean(&days);
    let mut exit_reasons = ExitReasonCounts::default();
    for t in trades {
        exit_reasons.record(t.exit_reason);
    }

    PerformanceSummary {
        total_trades: trades.len(),
        win_rate: Some(winners as f64 / trades.len() as f64),
        avg_pnl_pct: mean(&pnls),
        max_drawdown_pct: Some(max_drawdown_pct(&equity)),
        sharpe_ratio: trade_sharpe(&pnls, avg_days_held),
        strategy_return_pct,
        buy_hold_return_pct,
        vs_buy_and_hold,
        profit_factor: profit_factor(&pnls),
        avg_days_held,
        exit_reasons,
    }
}

/// Equity after each trade, preceded by the starting value.
pub fn equity_curve(trades: &[TradeRecord]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(trades.len() + 1);
    let mut equity = STARTING_EQUITY;
    curve.push(equity);
    for t in trades {
        equity *= 1.0 + t.return_fraction();
        curve.push(equity);
    }
    curve
}

/// Maximum peak-to-trough decline in percent, clamped to `[0, 100]`.
fn max_drawdown_pct(equity: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for &e in equity {
        peak = peak.max(e);
        if peak > 0.0 {
            max_dd = max_dd.max((peak - e) / peak * 100.0);
        }
    }
    max_dd.clamp(0.0, 100.0)
}

/// Per-trade Sharpe scaled by the number of average-length holding periods per year.
///
/// Uses the population standard deviation of trade PnL.
fn trade_sharpe(pnls: &[f64], avg_days_held: Option<f64>) -> Option<f64> {
    let m = mean(pnls)?;
    let s = population_std(pnls)?;
    if s <= 0.0 {
        return None;
    }
    let periods_per_year = TRADING_DAYS / avg_days_held?.max(1.0);
    finite(m / s * periods_per_year.sqrt())
}
