//! End-to-end runner tests: files on disk through to serialized results.

use std::io::Write;

use edgelab_core::backtest::OpenPositionPolicy;
use edgelab_core::domain::ExitReason;
use edgelab_core::signals::{SignalKind, Trigger};
use edgelab_runner::{
    load_csv, run_risk_metrics, run_signal_backtest, run_strategy_simulation, synthetic_bars,
    ConfigError, EngineConfig, LoadError, RiskRequest, RunError, SignalBacktestRequest,
    SignalBacktestResult, StrategyRequest, SCHEMA_VERSION,
};

fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

/// Bars on consecutive calendar days with the given closes.
fn csv_from_closes(closes: &[f64]) -> String {
    let start = chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for (i, c) in closes.iter().enumerate() {
        let date = start + chrono::Duration::days(i as i64);
        out.push_str(&format!("{date},{c},{},{},{c},1000000\n", c + 0.5, c - 0.5));
    }
    out
}

#[test]
fn signal_backtest_on_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    // Sideways chop, a ten-bar slide from bar 50, then a jump back above the range.
    let closes: Vec<f64> = (0..220)
        .map(|i| match i {
            0..=49 => 100.0 + (i % 2) as f64,
            50..=59 => 90.0 - 4.0 * (i - 50) as f64,
            60 => 120.0,
            _ => 120.0 + ((i - 60) % 2) as f64,
        })
        .collect();
    let path = write_temp(&dir, "dip.csv", &csv_from_closes(&closes));

    let data = load_csv(&path, "DIP").unwrap();
    assert_eq!(data.series.len(), 220);
    assert!(!data.synthetic);

    let request =
        SignalBacktestRequest::new("dip", SignalKind::RsiOversold, &EngineConfig::default());
    let result = run_signal_backtest(&request, &data).unwrap();

    assert_eq!(result.schema_version, SCHEMA_VERSION);
    assert_eq!(result.data_points, 220);
    assert_eq!(result.trigger, Trigger::Level);
    assert_eq!(
        result.signals.as_slice(),
        (50..=59).collect::<Vec<_>>().as_slice()
    );
    assert_eq!(result.report.total_signals, 10);
    let h20 = result.report.horizon(20).unwrap();
    assert_eq!(h20.win_rate, Some(1.0));
}

#[test]
fn missing_csv_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.csv");
    assert!(matches!(load_csv(&missing, "X"), Err(LoadError::Io { .. })));
}

#[test]
fn config_file_drives_requests() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp(
        &dir,
        "edgelab.toml",
        r#"
[signal_backtest]
horizons = [3, 7]

[simulation]
stop_loss_pct = 2.0
take_profit_pct = 3.0
open_position = "close_at_end"

[risk]
confidence = 0.99
min_observations = 50
"#,
    );
    let config = EngineConfig::load(&path).unwrap();

    let backtest = SignalBacktestRequest::new("SPY", SignalKind::VolumeSpike, &config);
    assert_eq!(backtest.horizons, vec![3, 7]);

    let strategy =
        StrategyRequest::new("SPY", SignalKind::RsiOversold, SignalKind::RsiOverbought, &config);
    assert_eq!(strategy.simulation.take_profit_pct, Some(3.0));
    assert_eq!(strategy.simulation.open_position, OpenPositionPolicy::CloseAtEnd);

    let risk = RiskRequest::new("SPY", "QQQ", &config);
    assert_eq!(risk.confidence, 0.99);
    assert_eq!(risk.min_observations, 50);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn strategy_on_synthetic_data_closes_at_end_when_asked() {
    let data = synthetic_bars("SPY", 500).unwrap();
    let mut config = EngineConfig::default();
    config.simulation.open_position = OpenPositionPolicy::CloseAtEnd;
    // Golden crosses are rare here, so most trades end on a stop or at the last bar.
    let request =
        StrategyRequest::new("SPY", SignalKind::VolumeSpike, SignalKind::GoldenCross, &config);
    let result = run_strategy_simulation(&request, &data).unwrap();

    assert!(result.synthetic);
    assert_eq!(result.summary.total_trades, result.trades.len());
    for pair in result.trades.windows(2) {
        assert!(pair[0].exit_index < pair[1].entry_index);
    }
    if let Some(last) = result.trades.last() {
        if last.exit_reason == ExitReason::EndOfData {
            assert_eq!(last.exit_index, data.series.len() - 1);
        }
    }
    let counts = result.summary.exit_reasons;
    assert_eq!(counts.total(), result.trades.len());
}

#[test]
fn risk_report_on_synthetic_pair() {
    let asset = synthetic_bars("AAPL", 400).unwrap();
    let bench = synthetic_bars("SPY", 300).unwrap();
    let request = RiskRequest::new("AAPL", "SPY", &EngineConfig::default());
    let report = run_risk_metrics(&request, &asset, &bench).unwrap();

    assert_eq!(report.data_points, 399);
    assert_eq!(report.metrics.observations, 399);
    assert_eq!(report.metrics.aligned_observations, 299);
    assert!(report.metrics.beta.is_some());
    assert_eq!(report.tail.confidence, 0.95);
    let var = report.tail.var.unwrap();
    assert!(report.tail.cvar.unwrap() <= var.historical);
    assert_eq!(report.return_stats.observations, 399);
}

#[test]
fn risk_rejects_invalid_confidence() {
    let asset = synthetic_bars("AAPL", 100).unwrap();
    let bench = synthetic_bars("SPY", 100).unwrap();
    let mut request = RiskRequest::new("AAPL", "SPY", &EngineConfig::default());
    request.confidence = 1.5;
    assert!(matches!(
        run_risk_metrics(&request, &asset, &bench),
        Err(RunError::Config(ConfigError::Invalid(_)))
    ));
}

#[test]
fn invalid_horizons_surface_as_engine_errors() {
    let data = synthetic_bars("SPY", 100).unwrap();
    let mut request =
        SignalBacktestRequest::new("SPY", SignalKind::RsiOversold, &EngineConfig::default());
    request.horizons = vec![];
    assert!(matches!(
        run_signal_backtest(&request, &data),
        Err(RunError::Engine(_))
    ));
}

#[test]
fn results_round_trip_through_json() {
    let data = synthetic_bars("QQQ", 300).unwrap();
    let request =
        SignalBacktestRequest::new("QQQ", SignalKind::VolumeSpike, &EngineConfig::default());
    let result = run_signal_backtest(&request, &data).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let back: SignalBacktestResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.run_id, result.run_id);
    assert_eq!(back.signals, result.signals);
    assert_eq!(back.report.total_signals, result.report.total_signals);
}

#[test]
fn same_request_same_data_same_run_id() {
    let a = synthetic_bars("SPY", 200).unwrap();
    let b = synthetic_bars("SPY", 200).unwrap();
    let request =
        SignalBacktestRequest::new("SPY", SignalKind::MacdBullishCross, &EngineConfig::default());
    let ra = run_signal_backtest(&request, &a).unwrap();
    let rb = run_signal_backtest(&request, &b).unwrap();
    assert_eq!(ra.run_id, rb.run_id);
    assert_eq!(ra, rb);

    let longer = synthetic_bars("SPY", 201).unwrap();
    let rc = run_signal_backtest(&request, &longer).unwrap();
    assert_ne!(ra.run_id, rc.run_id);
}
