//! SignalIndices — ordered bar positions where a condition fired.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Strictly increasing, duplicate-free bar indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct SignalIndices(Vec<usize>);

impl SignalIndices {
    /// Validate ordering. Fails on the first position that does not increase.
    pub fn new(indices: Vec<usize>) -> Result<Self, EngineError> {
        if let Some(position) = indices.windows(2).position(|w| w[1] <= w[0]) {
            return Err(EngineError::UnorderedIndices {
                position: position + 1,
            });
        }
        Ok(Self(indices))
    }

    /// Wrap indices produced by a forward scan, which are increasing by construction.
    pub(crate) fn from_sorted(indices: Vec<usize>) -> Self {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        Self(indices)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Check every index falls inside a series of length `len`.
    pub fn validate_for(&self, len: usize) -> Result<(), EngineError> {
        match self.0.last() {
            Some(&index) if index >= len => Err(EngineError::IndexOutOfRange { index, len }),
            _ => Ok(()),
        }
    }

    /// Indices strictly below `len`.
    pub fn below(&self, len: usize) -> Self {
        let end = self.0.partition_point(|&i| i < len);
        Self(self.0[..end].to_vec())
    }
}

impl TryFrom<Vec<usize>> for SignalIndices {
    type Error = EngineError;

    fn try_from(indices: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(indices)
    }
}

impl From<SignalIndices> for Vec<usize> {
    fn from(indices: SignalIndices) -> Self {
        indices.0
    }
}
