//! Trailing average volume.
//!
//! value[i] = mean(volume[i-period .. i]), i.e. the `period` bars strictly
//! before bar i. The current bar is excluded so it can be compared against
//! its own history. Lookback: period.

use super::sma::sma_of_series;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct TrailingVolume {
    period: usize,
    name: String,
}

impl TrailingVolume {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "volume period must be >= 1");
        Self {
            period,
            name: format!("trailing_volume_{period}"),
        }
    }
}

impl Indicator for TrailingVolume {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let inclusive = sma_of_series(&volumes, self.period);

        // Shift by one bar: the average ending at i-1 is the trailing average at i.
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n > self.period {
            result[self.period..].copy_from_slice(&inclusive[self.period - 1..n - 1]);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn excludes_current_bar() {
        let mut bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        for (i, bar) in bars.iter_mut().enumerate() {
            bar.volume = (i as f64 + 1.0) * 100.0;
        }
        let result = TrailingVolume::new(3).compute(&bars);

        assert!(result[2].is_nan());
        // Bars 0..3 → (100 + 200 + 300) / 3
        assert_approx(result[3], 200.0, DEFAULT_EPSILON);
        // Bars 1..4 → (200 + 300 + 400) / 3
        assert_approx(result[4], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn lookback_equals_period() {
        assert_eq!(TrailingVolume::new(20).lookback(), 20);
    }
}
