use thiserror::Error;

use crate::model::ids::StageIndex;

/// Score points per key earned.
pub const POINTS_PER_KEY: u32 = 10;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressionError {
    #[error("stage {index} is out of range (stage count {count})")]
    InvalidIndex { index: usize, count: usize },

    #[error("unlock flags ({unlocked}) and scores ({scores}) differ in length")]
    LengthMismatch { unlocked: usize, scores: usize },
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Player currency and unlock state shared by every mini-game.
///
/// Both per-stage vectors always have the same length, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionState {
    keys: u32,
    coins: u32,
    stage_unlocked: Vec<bool>,
    stage_high_score: Vec<u32>,
}

impl ProgressionState {
    /// Fresh state: no currency, every stage locked.
    #[must_use]
    pub fn new(stage_count: usize) -> Self {
        Self {
            keys: 0,
            coins: 0,
            stage_unlocked: vec![false; stage_count],
            stage_high_score: vec![0; stage_count],
        }
    }

    /// Rehydrate from a persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::LengthMismatch` if the per-stage vectors disagree.
    pub fn from_persisted(
        keys: u32,
        coins: u32,
        stage_unlocked: Vec<bool>,
        stage_high_score: Vec<u32>,
    ) -> Result<Self, ProgressionError> {
        if stage_unlocked.len() != stage_high_score.len() {
            return Err(ProgressionError::LengthMismatch {
                unlocked: stage_unlocked.len(),
                scores: stage_high_score.len(),
            });
        }
        Ok(Self {
            keys,
            coins,
            stage_unlocked,
            stage_high_score,
        })
    }

    /// Replace the key balance. Intended for seeding tests and fixtures.
    #[must_use]
    pub fn with_keys(mut self, keys: u32) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub fn keys(&self) -> u32 {
        self.keys
    }

    #[must_use]
    pub fn coins(&self) -> u32 {
        self.coins
    }

    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stage_unlocked.len()
    }

    #[must_use]
    pub fn stage_unlocked(&self) -> &[bool] {
        &self.stage_unlocked
    }

    #[must_use]
    pub fn stage_high_score(&self) -> &[u32] {
        &self.stage_high_score
    }

    #[must_use]
    pub fn contains(&self, stage: StageIndex) -> bool {
        stage.value() < self.stage_unlocked.len()
    }

    /// `None` for an out-of-range stage.
    #[must_use]
    pub fn is_unlocked(&self, stage: StageIndex) -> Option<bool> {
        self.stage_unlocked.get(stage.value()).copied()
    }

    #[must_use]
    pub fn score_for(&self, stage: StageIndex) -> Option<u32> {
        self.stage_high_score.get(stage.value()).copied()
    }

    /// Record a finished session's score.
    ///
    /// Adds `score / POINTS_PER_KEY` keys and overwrites the stage's score.
    /// Returns the number of keys awarded.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::InvalidIndex` if the stage is out of range;
    /// the state is left untouched.
    pub fn apply_score(&mut self, stage: StageIndex, score: u32) -> Result<u32, ProgressionError> {
        let count = self.stage_count();
        let slot = self
            .stage_high_score
            .get_mut(stage.value())
            .ok_or(ProgressionError::InvalidIndex {
                index: stage.value(),
                count,
            })?;
        *slot = score;
        let awarded = score / POINTS_PER_KEY;
        self.keys = self.keys.saturating_add(awarded);
        Ok(awarded)
    }

    /// Add coins from a claimed reward.
    pub fn claim_reward(&mut self, coins: u32) {
        self.coins = self.coins.saturating_add(coins);
    }

    pub(crate) fn spend_and_unlock(&mut self, stage: StageIndex, cost: u32) {
        debug_assert!(self.keys >= cost);
        self.keys -= cost;
        self.stage_unlocked[stage.value()] = true;
    }
}
