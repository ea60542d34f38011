//! Engine error taxonomy.
//!
//! Only structurally invalid input raises. Statistics that cannot be computed
//! (too few observations, zero variance) resolve to `None` in the result
//! records instead of an error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("unknown signal kind '{name}'; valid kinds: {}", valid.join(", "))]
    InvalidSignalKind {
        name: String,
        valid: Vec<&'static str>,
    },

    #[error("signal indices must be strictly increasing (violated at position {position})")]
    UnorderedIndices { position: usize },

    #[error("signal index {index} is out of range for a series of {len} bars")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("return series contains a non-finite value at position {position}")]
    NonFiniteInput { position: usize },
}
