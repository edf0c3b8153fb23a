use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TurnError {
    #[error("option {option} is out of range (option count {count})")]
    InvalidOption { option: usize, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingRoundStart,
    Revealing,
    AwaitingGuess,
    Resolved,
    GameOver,
}

/// Score, lives and the current round's meat counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnState {
    pub(crate) score: u32,
    pub(crate) lives_remaining: u32,
    pub(crate) round_index: u32,
    pub(crate) option_weights: Vec<u32>,
    pub(crate) phase: TurnPhase,
}

impl TurnState {
    pub(crate) fn new(option_count: usize, lives: u32) -> Self {
        Self {
            score: 0,
            lives_remaining: lives,
            round_index: 0,
            option_weights: vec![0; option_count],
            phase: TurnPhase::AwaitingRoundStart,
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn lives_remaining(&self) -> u32 {
        self.lives_remaining
    }

    #[must_use]
    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    #[must_use]
    pub fn option_weights(&self) -> &[u32] {
        &self.option_weights
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Largest weight this round. Zero before the first round.
    #[must_use]
    pub fn max_weight(&self) -> u32 {
        self.option_weights.iter().copied().max().unwrap_or(0)
    }

    /// Any option holding the maximum counts as correct, not just the first.
    #[must_use]
    pub fn is_heaviest(&self, option: usize) -> bool {
        self.option_weights
            .get(option)
            .is_some_and(|weight| *weight == self.max_weight())
    }
}
