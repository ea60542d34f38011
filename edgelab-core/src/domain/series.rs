//! OhlcvSeries — an ordered, validated run of bars for one instrument.

use serde::{Deserialize, Serialize};

use super::bar::{Bar, BarError};

/// Ordered OHLCV history with strictly increasing timestamps.
///
/// Every close is finite and positive, so simple returns and percentage
/// PnL computed from closes never divide by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Bar>", into = "Vec<Bar>")]
pub struct OhlcvSeries {
    bars: Vec<Bar>,
}

impl OhlcvSeries {
    /// Validate and wrap a bar vector.
    pub fn new(bars: Vec<Bar>) -> Result<Self, BarError> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(BarError::InvalidClose {
                    index,
                    close: bar.close,
                });
            }
            if !bar.volume.is_finite() || bar.volume < 0.0 {
                return Err(BarError::InvalidVolume {
                    index,
                    volume: bar.volume,
                });
            }
            if index > 0 {
                let previous = bars[index - 1].timestamp;
                if bar.timestamp <= previous {
                    return Err(BarError::NonIncreasingTimestamp {
                        index,
                        timestamp: bar.timestamp,
                        previous,
                    });
                }
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close at `index`. Callers index within `0..len()`.
    pub fn close(&self, index: usize) -> f64 {
        self.bars[index].close
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn first_close(&self) -> Option<f64> {
        self.bars.first().map(|b| b.close)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Simple single-period returns: `close[i+1] / close[i] - 1`.
    ///
    /// One element shorter than the series; empty for fewer than two bars.
    pub fn returns(&self) -> Vec<f64> {
        self.bars
            .windows(2)
            .map(|w| w[1].close / w[0].close - 1.0)
            .collect()
    }

    /// Log returns: `ln(close[i+1] / close[i])`.
    pub fn log_returns(&self) -> Vec<f64> {
        self.bars
            .windows(2)
            .map(|w| (w[1].close / w[0].close).ln())
            .collect()
    }

    /// The first `len` bars as a new series (the whole series if `len` exceeds it).
    pub fn truncated(&self, len: usize) -> Self {
        let end = len.min(self.bars.len());
        Self {
            bars: self.bars[..end].to_vec(),
        }
    }
}

impl TryFrom<Vec<Bar>> for OhlcvSeries {
    type Error = BarError;

    fn try_from(bars: Vec<Bar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl From<OhlcvSeries> for Vec<Bar> {
    fn from(series: OhlcvSeries) -> Self {
        series.bars
    }
}
