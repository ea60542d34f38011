//! Moving Average Convergence Divergence (MACD).
//!
//! - Line: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(line, signal), seeded from the first defined line value
//! - Histogram: line - signal
//!
//! With (12, 26, 9) the line is defined from index 25 and the signal and
//! histogram from index 33.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::Bar;

/// Which MACD output series to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdOutput {
    Line,
    Signal,
    Histogram,
}

/// All three MACD series, aligned to the input.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    output: MacdOutput,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, output: MacdOutput) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(slow > fast, "MACD slow period must be > fast period");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        let label = match output {
            MacdOutput::Line => "line",
            MacdOutput::Signal => "signal",
            MacdOutput::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            output,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdOutput::Histogram)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.output {
            MacdOutput::Line => self.slow - 1,
            MacdOutput::Signal | MacdOutput::Histogram => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let series = macd_of_series(&closes, self.fast, self.slow, self.signal);
        match self.output {
            MacdOutput::Line => series.line,
            MacdOutput::Signal => series.signal,
            MacdOutput::Histogram => series.histogram,
        }
    }
}

/// Compute line, signal and histogram in one pass over the closes.
pub fn macd_of_series(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let n = closes.len();
    let fast_ema = ema_of_series(closes, fast);
    let slow_ema = ema_of_series(closes, slow);

    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();

    let mut signal_line = vec![f64::NAN; n];
    if let Some(start) = line.iter().position(|v| !v.is_nan()) {
        let smoothed = ema_of_series(&line[start..], signal);
        signal_line[start..].copy_from_slice(&smoothed);
    }

    let histogram = line
        .iter()
        .zip(&signal_line)
        .map(|(l, s)| l - s)
        .collect();

    MacdSeries {
        line,
        signal: signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn macd_warmup_boundaries() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let series = macd_of_series(&closes, 12, 26, 9);

        assert!(series.line[24].is_nan());
        assert!(!series.line[25].is_nan());
        assert!(series.histogram[32].is_nan());
        assert!(!series.histogram[33].is_nan());
    }

    #[test]
    fn macd_constant_price_is_zero() {
        let closes = vec![50.0; 40];
        let series = macd_of_series(&closes, 3, 6, 3);
        for i in 7..40 {
            assert_approx(series.line[i], 0.0, DEFAULT_EPSILON);
            assert_approx(series.histogram[i], 0.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64 * 0.5).collect();
        let series = macd_of_series(&closes, 3, 6, 3);
        for i in 7..50 {
            assert_approx(
                series.histogram[i],
                series.line[i] - series.signal[i],
                DEFAULT_EPSILON,
            );
        }
    }

    #[test]
    fn indicator_matches_series_fn() {
        let bars = make_bars(&(0..45).map(|i| 10.0 + (i % 7) as f64).collect::<Vec<_>>());
        let hist = Macd::histogram(12, 26, 9);
        assert_eq!(hist.lookback(), 33);
        let result = hist.compute(&bars);
        assert!(result[32].is_nan());
        assert!(!result[33].is_nan());
    }
}
