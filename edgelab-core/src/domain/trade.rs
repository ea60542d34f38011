//! TradeRecord — a completed round-trip trade.

use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Signal,
    /// Force-closed on the last bar under `OpenPositionPolicy::CloseAtEnd`.
    EndOfData,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
            ExitReason::Signal => "signal",
            ExitReason::EndOfData => "end_of_data",
        }
    }
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A long round trip: entry at one bar's close, exit at a later bar's close.
///
/// `entry_index < exit_index` always holds; records are never mutated after
/// the simulator emits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Percentage PnL, e.g. `3.0` for +3%.
    pub pnl_pct: f64,
    pub exit_reason: ExitReason,
    pub days_held: usize,
}

impl TradeRecord {
    /// PnL as a fraction of entry price.
    pub fn return_fraction(&self) -> f64 {
        self.pnl_pct / 100.0
    }

    pub fn is_winner(&self) -> bool {
        self.pnl_pct > 0.0
    }
}
