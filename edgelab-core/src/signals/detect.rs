//! Signal detection: one forward scan per kind over precomputed indicators.
//!
//! Every indicator used here is causal, so the qualification of bar i depends
//! only on bars 0..=i.

use tracing::debug;

use super::{Condition, SignalKind};
use crate::domain::{OhlcvSeries, SignalIndices};
use crate::error::EngineError;
use crate::indicators::{Bollinger, Indicator, Macd, Rsi, Sma, TrailingVolume};

/// Return the bar indices at which `kind` holds.
///
/// A series shorter than the kind's warm-up yields an empty set.
pub fn detect(series: &OhlcvSeries, kind: SignalKind) -> SignalIndices {
    let spec = kind.spec();
    let bars = series.bars();
    let warmup = spec.warmup;

    if bars.len() <= warmup {
        debug!(signal = %kind, bars = bars.len(), warmup, "series shorter than warm-up");
        return SignalIndices::empty();
    }

    let indices = match spec.condition {
        Condition::RsiBelow { period, threshold } => {
            let rsi = Rsi::new(period).compute(bars);
            qualifying(bars.len(), warmup, |i| defined(rsi[i]) && rsi[i] < threshold)
        }
        Condition::RsiAbove { period, threshold } => {
            let rsi = Rsi::new(period).compute(bars);
            qualifying(bars.len(), warmup, |i| defined(rsi[i]) && rsi[i] > threshold)
        }
        Condition::MacdHistogramCrossUp { fast, slow, signal } => {
            let hist = Macd::histogram(fast, slow, signal).compute(bars);
            qualifying(bars.len(), warmup, |i| {
                defined(hist[i]) && defined(hist[i - 1]) && hist[i - 1] <= 0.0 && hist[i] > 0.0
            })
        }
        Condition::SmaCrossAbove { fast, slow } => {
            let fast = Sma::new(fast).compute(bars);
            let slow = Sma::new(slow).compute(bars);
            qualifying(bars.len(), warmup, |i| {
                all_defined(&[fast[i], slow[i], fast[i - 1], slow[i - 1]])
                    && fast[i] > slow[i]
                    && fast[i - 1] <= slow[i - 1]
            })
        }
        Condition::SmaCrossBelow { fast, slow } => {
            let fast = Sma::new(fast).compute(bars);
            let slow = Sma::new(slow).compute(bars);
            qualifying(bars.len(), warmup, |i| {
                all_defined(&[fast[i], slow[i], fast[i - 1], slow[i - 1]])
                    && fast[i] < slow[i]
                    && fast[i - 1] >= slow[i - 1]
            })
        }
        Condition::LowBelowBollinger { period, multiplier } => {
            let lower = Bollinger::lower(period, multiplier).compute(bars);
            qualifying(bars.len(), warmup, |i| {
                defined(lower[i]) && bars[i].low <= lower[i]
            })
        }
        Condition::VolumeAboveTrailing { period, multiple } => {
            let trailing = TrailingVolume::new(period).compute(bars);
            qualifying(bars.len(), warmup, |i| {
                defined(trailing[i]) && trailing[i] > 0.0 && bars[i].volume > multiple * trailing[i]
            })
        }
    };

    debug!(
        signal = %kind,
        trigger = ?spec.trigger,
        bars = bars.len(),
        hits = indices.len(),
        "signal scan complete"
    );
    SignalIndices::from_sorted(indices)
}

/// Parse `name` into a [`SignalKind`] and run [`detect`].
pub fn detect_named(series: &OhlcvSeries, name: &str) -> Result<SignalIndices, EngineError> {
    let kind: SignalKind = name.parse()?;
    Ok(detect(series, kind))
}

fn qualifying(len: usize, warmup: usize, holds: impl Fn(usize) -> bool) -> Vec<usize> {
    (warmup..len).filter(|&i| holds(i)).collect()
}

fn defined(value: f64) -> bool {
    value.is_finite()
}

fn all_defined(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}
