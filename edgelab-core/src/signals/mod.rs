//! Signal kinds and their parameter table.
//!
//! The set of detectable signals is closed: every kind is a variant of
//! [`SignalKind`], and its windows and thresholds live in a `const`
//! [`SignalSpec`] selected by an exhaustive match. Unknown names are rejected
//! at parse time with the list of valid kinds.

mod detect;

pub use detect::{detect, detect_named};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// A technical condition that can be scanned for over a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    #[serde(alias = "rsi_below_30")]
    RsiOversold,
    #[serde(alias = "rsi_above_70")]
    RsiOverbought,
    #[serde(alias = "macd_crossover")]
    MacdBullishCross,
    GoldenCross,
    DeathCross,
    BollingerLowerTouch,
    VolumeSpike,
}

/// Whether a signal fires on every qualifying bar or only on the transition bar.
///
/// Level-triggered kinds produce runs of consecutive indices and therefore
/// higher counts than edge-triggered kinds over the same history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Level,
    Edge,
}

/// The condition evaluated at each bar, with its fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    RsiBelow { period: usize, threshold: f64 },
    RsiAbove { period: usize, threshold: f64 },
    MacdHistogramCrossUp { fast: usize, slow: usize, signal: usize },
    SmaCrossAbove { fast: usize, slow: usize },
    SmaCrossBelow { fast: usize, slow: usize },
    LowBelowBollinger { period: usize, multiplier: f64 },
    VolumeAboveTrailing { period: usize, multiple: f64 },
}

/// Static description of one signal kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSpec {
    pub name: &'static str,
    /// First bar index that may qualify.
    pub warmup: usize,
    pub trigger: Trigger,
    pub condition: Condition,
}

const RSI_OVERSOLD: SignalSpec = SignalSpec {
    name: "rsi_oversold",
    warmup: 14,
    trigger: Trigger::Level,
    condition: Condition::RsiBelow {
        period: 14,
        threshold: 30.0,
    },
};

const RSI_OVERBOUGHT: SignalSpec = SignalSpec {
    name: "rsi_overbought",
    warmup: 14,
    trigger: Trigger::Level,
    condition: Condition::RsiAbove {
        period: 14,
        threshold: 70.0,
    },
};

const MACD_BULLISH_CROSS: SignalSpec = SignalSpec {
    name: "macd_bullish_cross",
    warmup: 27,
    trigger: Trigger::Edge,
    condition: Condition::MacdHistogramCrossUp {
        fast: 12,
        slow: 26,
        signal: 9,
    },
};

const GOLDEN_CROSS: SignalSpec = SignalSpec {
    name: "golden_cross",
    warmup: 200,
    trigger: Trigger::Edge,
    condition: Condition::SmaCrossAbove { fast: 50, slow: 200 },
};

const DEATH_CROSS: SignalSpec = SignalSpec {
    name: "death_cross",
    warmup: 200,
    trigger: Trigger::Edge,
    condition: Condition::SmaCrossBelow { fast: 50, slow: 200 },
};

const BOLLINGER_LOWER_TOUCH: SignalSpec = SignalSpec {
    name: "bollinger_lower_touch",
    warmup: 20,
    trigger: Trigger::Level,
    condition: Condition::LowBelowBollinger {
        period: 20,
        multiplier: 2.0,
    },
};

const VOLUME_SPIKE: SignalSpec = SignalSpec {
    name: "volume_spike",
    warmup: 20,
    trigger: Trigger::Level,
    condition: Condition::VolumeAboveTrailing {
        period: 20,
        multiple: 2.0,
    },
};

impl SignalKind {
    pub const ALL: [SignalKind; 7] = [
        SignalKind::RsiOversold,
        SignalKind::RsiOverbought,
        SignalKind::MacdBullishCross,
        SignalKind::GoldenCross,
        SignalKind::DeathCross,
        SignalKind::BollingerLowerTouch,
        SignalKind::VolumeSpike,
    ];

    pub fn spec(self) -> &'static SignalSpec {
        match self {
            SignalKind::RsiOversold => &RSI_OVERSOLD,
            SignalKind::RsiOverbought => &RSI_OVERBOUGHT,
            SignalKind::MacdBullishCross => &MACD_BULLISH_CROSS,
            SignalKind::GoldenCross => &GOLDEN_CROSS,
            SignalKind::DeathCross => &DEATH_CROSS,
            SignalKind::BollingerLowerTouch => &BOLLINGER_LOWER_TOUCH,
            SignalKind::VolumeSpike => &VOLUME_SPIKE,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn warmup(self) -> usize {
        self.spec().warmup
    }

    pub fn trigger(self) -> Trigger {
        self.spec().trigger
    }

    /// Canonical names of every kind, in declaration order.
    pub fn valid_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.name()).collect()
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignalKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let legacy = match normalized.as_str() {
            "rsi_below_30" => Some(SignalKind::RsiOversold),
            "rsi_above_70" => Some(SignalKind::RsiOverbought),
            "macd_crossover" => Some(SignalKind::MacdBullishCross),
            _ => None,
        };
        legacy
            .or_else(|| Self::ALL.into_iter().find(|k| k.name() == normalized))
            .ok_or_else(|| EngineError::InvalidSignalKind {
                name: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}
