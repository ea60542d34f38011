//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single symbol on a single session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(alias = "date")]
    pub timestamp: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any OHLCV field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic OHLCV sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }
}

/// Errors raised while assembling an [`OhlcvSeries`](super::OhlcvSeries).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar {index}: timestamp {timestamp} is not after the previous bar ({previous})")]
    NonIncreasingTimestamp {
        index: usize,
        timestamp: NaiveDate,
        previous: NaiveDate,
    },

    #[error("bar {index}: close must be finite and positive, got {close}")]
    InvalidClose { index: usize, close: f64 },

    #[error("bar {index}: volume must be finite and non-negative, got {volume}")]
    InvalidVolume { index: usize, volume: f64 },
}
