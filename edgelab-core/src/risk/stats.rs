//! Descriptive statistics over return series.
//!
//! Small pure helpers shared by the risk metrics and the backtest
//! aggregators, plus [`ReturnStats`] for the distribution summary.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// `Some(x)` when `x` is finite.
pub fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    finite(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (Bessel's correction). `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    finite((ss / (values.len() - 1) as f64).sqrt())
}

/// Population standard deviation (divides by n). `None` below two values.
pub fn population_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    finite((ss / values.len() as f64).sqrt())
}

/// Sample covariance of two equal-length slices. `None` below two pairs.
pub fn sample_covariance(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let ma = mean(a)?;
    let mb = mean(b)?;
    let s: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    finite(s / (a.len() - 1) as f64)
}

/// Maximum peak-to-trough decline of the compounded path `Π(1 + r)`.
///
/// The running peak starts at the first compounded value, so a loss in the
/// first period alone is not a drawdown. Returned as a fraction in `[0, 1]`;
/// `0` for an empty or never-declining path.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut wealth = 1.0_f64;
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for r in returns {
        wealth *= 1.0 + r;
        peak = peak.max(wealth);
        if peak > 0.0 {
            max_dd = max_dd.max((peak - wealth) / peak);
        }
    }
    max_dd.clamp(0.0, 1.0)
}

/// Jarque–Bera normality test: `JB = n/6 (S² + K²/4)`, p-value from χ²(2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JarqueBera {
    pub statistic: f64,
    pub p_value: f64,
}

/// Distribution summary of a return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStats {
    pub observations: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation.
    pub std: Option<f64>,
    /// Population skewness (biased estimator).
    pub skewness: Option<f64>,
    /// Population excess kurtosis (biased estimator, normal = 0).
    pub kurtosis: Option<f64>,
    pub jarque_bera: Option<JarqueBera>,
    pub max_drawdown: Option<f64>,
}

impl ReturnStats {
    /// Summarize `returns`. Every field but `observations` is `None` below two values.
    pub fn from_returns(returns: &[f64]) -> Self {
        let n = returns.len();
        if n < 2 {
            return Self {
                observations: n,
                mean: None,
                std: None,
                skewness: None,
                kurtosis: None,
                jarque_bera: None,
                max_drawdown: None,
            };
        }

        let (skewness, kurtosis) = match central_moments(returns) {
            Some((m2, m3, m4)) if m2 > 0.0 => (
                finite(m3 / m2.powf(1.5)),
                finite(m4 / (m2 * m2) - 3.0),
            ),
            _ => (None, None),
        };

        let jarque_bera = match (skewness, kurtosis) {
            (Some(s), Some(k)) => jarque_bera(n, s, k),
            _ => None,
        };

        Self {
            observations: n,
            mean: mean(returns),
            std: sample_std(returns),
            skewness,
            kurtosis,
            jarque_bera,
            max_drawdown: Some(max_drawdown(returns)),
        }
    }
}

/// Population central moments (m2, m3, m4).
fn central_moments(values: &[f64]) -> Option<(f64, f64, f64)> {
    let m = mean(values)?;
    let n = values.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    Some((m2 / n, m3 / n, m4 / n))
}

fn jarque_bera(n: usize, skewness: f64, excess_kurtosis: f64) -> Option<JarqueBera> {
    let statistic =
        finite(n as f64 / 6.0 * (skewness.powi(2) + excess_kurtosis.powi(2) / 4.0))?;
    let chi2 = ChiSquared::new(2.0).ok()?;
    Some(JarqueBera {
        statistic,
        p_value: finite(chi2.sf(statistic))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() < eps, "{a} != {b}");
    }

    #[test]
    fn mean_and_sample_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        approx(mean(&v).unwrap(), 5.0, 1e-12);
        // Sum of squares 32 over 7 degrees of freedom.
        approx(sample_std(&v).unwrap(), (32.0_f64 / 7.0).sqrt(), 1e-12);
        assert!(sample_std(&[1.0]).is_none());
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn covariance_of_series_with_itself_is_variance() {
        let v = [0.01, -0.02, 0.015, -0.01, 0.02];
        let var = sample_std(&v).unwrap().powi(2);
        approx(sample_covariance(&v, &v).unwrap(), var, 1e-15);
        assert!(sample_covariance(&v, &v[..4]).is_none());
    }

    #[test]
    fn drawdown_peak_starts_at_first_compounded_value() {
        assert_eq!(max_drawdown(&[-0.1, 0.05, 0.01, 0.02]), 0.0);
        assert_eq!(max_drawdown(&[-1.0]), 0.0);
        approx(max_drawdown(&[-0.1, 0.05, -0.2]), 0.2, 1e-12);
        approx(max_drawdown(&[0.1, -0.5, 0.2]), 0.5, 1e-12);
        approx(max_drawdown(&[0.1, -1.0, 0.5]), 1.0, 1e-12);
        assert_eq!(max_drawdown(&[]), 0.0);
        assert_eq!(max_drawdown(&[0.01, 0.02]), 0.0);
    }

    #[test]
    fn population_std_divides_by_n() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        approx(population_std(&v).unwrap(), 2.0, 1e-12);
        assert!(population_std(&[1.0]).is_none());
    }

    #[test]
    fn symmetric_series_has_zero_skew() {
        let stats = ReturnStats::from_returns(&[-0.02, -0.01, 0.0, 0.01, 0.02]);
        approx(stats.skewness.unwrap(), 0.0, 1e-12);
        // Uniform-like spread: m4/m2^2 = 1.7, excess = -1.3.
        approx(stats.kurtosis.unwrap(), -1.3, 1e-9);
        let jb = stats.jarque_bera.unwrap();
        approx(jb.statistic, 5.0 / 6.0 * (1.3_f64.powi(2) / 4.0), 1e-9);
        approx(jb.p_value, (-jb.statistic / 2.0).exp(), 1e-9);
    }

    #[test]
    fn constant_series_has_no_shape_statistics() {
        let stats = ReturnStats::from_returns(&[0.25; 6]);
        assert_eq!(stats.std, Some(0.0));
        assert!(stats.skewness.is_none());
        assert!(stats.kurtosis.is_none());
        assert!(stats.jarque_bera.is_none());
        assert_eq!(stats.max_drawdown, Some(0.0));
    }

    #[test]
    fn single_observation_is_all_none() {
        let stats = ReturnStats::from_returns(&[0.03]);
        assert_eq!(stats.observations, 1);
        assert!(stats.mean.is_none());
        assert!(stats.max_drawdown.is_none());
    }
}
