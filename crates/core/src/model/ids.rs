use serde::{Deserialize, Serialize};
use std::fmt;

/// Zero-based position of a stage in the hub.
///
/// Validity depends on the progression state it is used against; see
/// `ProgressionState::contains`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageIndex(usize);

impl StageIndex {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn value(&self) -> usize {
        self.0
    }

    /// One-based number shown to players ("Stage 1").
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.0.saturating_add(1)
    }
}

impl fmt::Debug for StageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StageIndex({})", self.0)
    }
}

impl fmt::Display for StageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
