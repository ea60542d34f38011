//! Engine configuration loaded from TOML.
//!
//! Every section and field is optional; missing values fall back to the
//! defaults below.
//!
//! ```toml
//! [signal_backtest]
//! horizons = [5, 20, 60]
//!
//! [simulation]
//! stop_loss_pct = 5.0
//! take_profit_pct = 10.0
//! open_position = "discard"   # or "close_at_end"
//!
//! [risk]
//! confidence = 0.95
//! min_observations = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use edgelab_core::backtest::{SimulationConfig, DEFAULT_HORIZONS};

/// Errors from reading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for forward-return backtests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalBacktestSettings {
    pub horizons: Vec<usize>,
}

impl Default for SignalBacktestSettings {
    fn default() -> Self {
        Self {
            horizons: DEFAULT_HORIZONS.to_vec(),
        }
    }
}

/// Settings for risk metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Confidence level for the reported tail risk, in `(0, 1)`.
    pub confidence: f64,
    /// Smallest overlapping asset/benchmark length accepted.
    pub min_observations: usize,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            confidence: 0.95,
            min_observations: 10,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub signal_backtest: SignalBacktestSettings,
    pub simulation: SimulationConfig,
    pub risk: RiskSettings,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let horizons = &self.signal_backtest.horizons;
        if horizons.is_empty() {
            return Err(ConfigError::Invalid(
                "signal_backtest.horizons must not be empty".into(),
            ));
        }
        if horizons.contains(&0) {
            return Err(ConfigError::Invalid(
                "signal_backtest.horizons must be positive".into(),
            ));
        }

        self.simulation
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let c = self.risk.confidence;
        if !(c > 0.0 && c < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "risk.confidence must be in (0, 1), got {c}"
            )));
        }
        if self.risk.min_observations < 2 {
            return Err(ConfigError::Invalid(
                "risk.min_observations must be at least 2".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgelab_core::backtest::OpenPositionPolicy;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.signal_backtest.horizons, vec![5, 20, 60]);
        assert_eq!(config.simulation.stop_loss_pct, 5.0);
        assert_eq!(config.simulation.take_profit_pct, None);
        assert_eq!(config.risk.min_observations, 10);
    }

    #[test]
    fn full_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            [signal_backtest]
            horizons = [1, 10]

            [simulation]
            stop_loss_pct = 7.5
            take_profit_pct = 12.0
            open_position = "close_at_end"

            [risk]
            confidence = 0.99
            min_observations = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.signal_backtest.horizons, vec![1, 10]);
        assert_eq!(config.simulation.stop_loss_pct, 7.5);
        assert_eq!(config.simulation.take_profit_pct, Some(12.0));
        assert_eq!(config.simulation.open_position, OpenPositionPolicy::CloseAtEnd);
        assert_eq!(config.risk.confidence, 0.99);
        assert_eq!(config.risk.min_observations, 30);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str("[simulation]\ntake_profit_pct = 4.0\n").unwrap();
        assert_eq!(config.simulation.stop_loss_pct, 5.0);
        assert_eq!(config.simulation.take_profit_pct, Some(4.0));
        assert_eq!(config.risk, RiskSettings::default());
    }

    #[test]
    fn rejects_invalid_values() {
        for doc in [
            "[signal_backtest]\nhorizons = []",
            "[signal_backtest]\nhorizons = [5, 0]",
            "[simulation]\nstop_loss_pct = 0.0",
            "[simulation]\ntake_profit_pct = -2.0",
            "[risk]\nconfidence = 1.0",
            "[risk]\nmin_observations = 1",
        ] {
            assert!(
                matches!(EngineConfig::from_toml_str(doc), Err(ConfigError::Invalid(_))),
                "accepted: {doc}"
            );
        }
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            EngineConfig::from_toml_str("[simulation\nstop_loss_pct = 5"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[simulation]\nopen_position = \"sometimes\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
