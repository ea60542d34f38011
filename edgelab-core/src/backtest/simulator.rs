//! Trade simulator: a two-state machine driven by entry and exit indices.
//!
//! One forward pass over the closes. While flat, an entry index opens a long
//! at that bar's close; the entry bar itself is never checked for exits.
//! While in a trade, each later bar is checked in a fixed order (see
//! [`exit_decision`]) and the first match closes the trade at that close.
//! Entries that arrive while a trade is open are ignored, and the closing bar
//! cannot re-enter.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::{ExitReason, OhlcvSeries, SignalIndices, TradeRecord};
use crate::error::EngineError;

/// What happens to a trade still open after the last bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenPositionPolicy {
    /// Drop the open trade; it never appears in the results.
    #[default]
    Discard,
    /// Close at the last bar's close with `ExitReason::EndOfData`.
    CloseAtEnd,
}

/// Exit thresholds and terminal policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Close when PnL falls to `-stop_loss_pct` percent or below.
    pub stop_loss_pct: f64,
    /// Close when PnL reaches this many percent, if set.
    pub take_profit_pct: Option<f64>,
    pub open_position: OpenPositionPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            stop_loss_pct: 5.0,
            take_profit_pct: None,
            open_position: OpenPositionPolicy::Discard,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.stop_loss_pct.is_finite() || self.stop_loss_pct <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "stop_loss_pct must be finite and positive, got {}",
                self.stop_loss_pct
            )));
        }
        if let Some(tp) = self.take_profit_pct {
            if !tp.is_finite() || tp <= 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "take_profit_pct must be finite and positive, got {tp}"
                )));
            }
        }
        Ok(())
    }
}

/// Simulator state between bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat,
    InTrade { entry_index: usize, entry_price: f64 },
}

/// Decide whether an open trade closes on the current bar.
///
/// Priority: stop loss, then take profit, then exit signal. A bar that both
/// breaches the stop and carries an exit signal closes as a stop loss.
pub fn exit_decision(
    pnl_pct: f64,
    is_exit_signal: bool,
    config: &SimulationConfig,
) -> Option<ExitReason> {
    if pnl_pct <= -config.stop_loss_pct {
        return Some(ExitReason::StopLoss);
    }
    if let Some(tp) = config.take_profit_pct {
        if pnl_pct >= tp {
            return Some(ExitReason::TakeProfit);
        }
    }
    if is_exit_signal {
        return Some(ExitReason::Signal);
    }
    None
}

/// Run the state machine over `series` and return completed trades in time order.
pub fn simulate(
    series: &OhlcvSeries,
    entries: &SignalIndices,
    exits: &SignalIndices,
    config: &SimulationConfig,
) -> Result<Vec<TradeRecord>, EngineError> {
    config.validate()?;
    entries.validate_for(series.len())?;
    exits.validate_for(series.len())?;

    let bars = series.bars();
    let mut trades = Vec::new();
    let mut state = PositionState::Flat;

    for (i, bar) in bars.iter().enumerate() {
        match state {
            PositionState::Flat => {
                if entries.contains(i) {
                    trace!(bar = i, price = bar.close, "enter long");
                    state = PositionState::InTrade {
                        entry_index: i,
                        entry_price: bar.close,
                    };
                }
            }
            PositionState::InTrade {
                entry_index,
                entry_price,
            } => {
                let pnl_pct = pnl_pct(entry_price, bar.close);
                if let Some(reason) = exit_decision(pnl_pct, exits.contains(i), config) {
                    trades.push(close_trade(entry_index, entry_price, i, bar.close, reason));
                    state = PositionState::Flat;
                }
            }
        }
    }

    if let PositionState::InTrade {
        entry_index,
        entry_price,
    } = state
    {
        let last = bars.len() - 1;
        match config.open_position {
            OpenPositionPolicy::CloseAtEnd if last > entry_index => {
                trades.push(close_trade(
                    entry_index,
                    entry_price,
                    last,
                    bars[last].close,
                    ExitReason::EndOfData,
                ));
            }
            _ => debug!(entry_index, "open trade at end of data discarded"),
        }
    }

    debug!(
        bars = bars.len(),
        entries = entries.len(),
        exits = exits.len(),
        trades = trades.len(),
        "simulation complete"
    );
    Ok(trades)
}

fn pnl_pct(entry_price: f64, price: f64) -> f64 {
    (price - entry_price) / entry_price * 100.0
}

fn close_trade(
    entry_index: usize,
    entry_price: f64,
    exit_index: usize,
    exit_price: f64,
    exit_reason: ExitReason,
) -> TradeRecord {
    trace!(entry_index, exit_index, reason = %exit_reason, "close trade");
    TradeRecord {
        entry_index,
        exit_index,
        entry_price,
        exit_price,
        pnl_pct: pnl_pct(entry_price, exit_price),
        exit_reason,
        days_held: exit_index - entry_index,
    }
}
