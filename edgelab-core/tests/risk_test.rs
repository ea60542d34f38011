//! Risk metric integration tests.
//!
//! Verifies:
//! 1. Historical VaR and CVaR on a five-observation series
//! 2. Beta of one and zero alpha against an identical benchmark
//! 3. Returns derived from a price series feed straight into the metrics
//! 4. CVaR never exceeds VaR; drawdown stays within [0, 1] (proptest)

use chrono::NaiveDate;
use edgelab_core::domain::{Bar, OhlcvSeries};
use edgelab_core::risk::{conditional_var, risk_metrics, value_at_risk, ReturnStats};
use proptest::prelude::*;

const FIVE_RETURNS: [f64; 5] = [0.01, -0.02, 0.015, -0.01, 0.02];

#[test]
fn var_and_cvar_on_five_returns() {
    let m = risk_metrics(&FIVE_RETURNS, &FIVE_RETURNS).unwrap();
    let var = m.var_95.unwrap();
    assert_eq!(var.historical, -0.02);
    assert_eq!(m.cvar_95, Some(-0.02));
    // floor(5 * 0.01) = 0 as well.
    assert_eq!(m.var_99.unwrap().historical, -0.02);
    assert_eq!(m.cvar_99, Some(-0.02));
    assert_eq!(m.observations, 5);
}

#[test]
fn identical_benchmark_has_unit_beta() {
    let m = risk_metrics(&FIVE_RETURNS, &FIVE_RETURNS).unwrap();
    assert!((m.beta.unwrap() - 1.0).abs() < 1e-9);
    assert!(m.alpha.unwrap().abs() < 1e-9);
    assert_eq!(m.aligned_observations, 5);
}

#[test]
fn five_return_distribution() {
    let m = risk_metrics(&FIVE_RETURNS, &FIVE_RETURNS).unwrap();
    let mean = 0.003;
    assert!((m.annualized_return.unwrap() - mean * 252.0).abs() < 1e-9);
    assert!(m.sharpe_ratio.unwrap() > 0.0);
    // Two negative returns: downside deviation is defined.
    assert!(m.sortino_ratio.unwrap() > m.sharpe_ratio.unwrap());
    // Wealth 1.01 → 0.9898: a 2% drawdown from the first peak.
    assert!((m.max_drawdown.unwrap() - 0.02).abs() < 1e-9);
    assert!(m.jarque_bera.is_some());
}

#[test]
fn metrics_from_price_series() {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let closes = [100.0, 102.0, 99.0, 101.0, 104.0, 103.0, 105.0, 102.0, 106.0, 108.0, 107.0, 110.0];
    let bars: Vec<Bar> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            timestamp: base + chrono::Duration::days(i as i64),
            open: c,
            high: c,
            low: c,
            close: c,
            volume: 1.0,
        })
        .collect();
    let series = OhlcvSeries::new(bars).unwrap();
    let returns = series.returns();
    assert_eq!(returns.len(), closes.len() - 1);

    let m = risk_metrics(&returns, &returns[..6]).unwrap();
    assert_eq!(m.observations, 11);
    assert_eq!(m.aligned_observations, 6);
    // The last six asset returns are the benchmark's first six shifted: not identical.
    assert!(m.beta.is_some());
    let json = serde_json::to_value(&m).unwrap();
    assert!(json["var_95"]["historical"].is_number());
}

proptest! {
    /// CVaR averages the tail up to the VaR position, so it is never above VaR.
    #[test]
    fn cvar_never_exceeds_var(
        returns in prop::collection::vec(-0.2..0.2_f64, 1..300),
        confidence in 0.80..0.995_f64,
    ) {
        let var = value_at_risk(&returns, confidence).unwrap();
        let cvar = conditional_var(&returns, confidence).unwrap();
        prop_assert!(cvar <= var.historical + 1e-12);
    }

    /// Max drawdown is a fraction in [0, 1].
    #[test]
    fn drawdown_is_bounded(returns in prop::collection::vec(-0.99..1.0_f64, 2..200)) {
        let stats = ReturnStats::from_returns(&returns);
        let dd = stats.max_drawdown.unwrap();
        prop_assert!((0.0..=1.0).contains(&dd));
    }

    /// Every statistic is either absent or finite.
    #[test]
    fn no_nan_escapes(
        returns in prop::collection::vec(-0.1..0.1_f64, 0..60),
        bench in prop::collection::vec(-0.1..0.1_f64, 0..60),
    ) {
        let m = risk_metrics(&returns, &bench).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        prop_assert!(!json.contains("NaN"));
        for v in [m.sharpe_ratio, m.sortino_ratio, m.beta, m.alpha, m.cvar_95, m.skewness, m.kurtosis] {
            prop_assert!(v.map_or(true, f64::is_finite));
        }
    }
}
