use std::time::Duration;

use thiserror::Error;

use crate::unlock::STAGE_COST;

/// Number of stages shipped with the hub.
pub const DEFAULT_STAGE_COUNT: usize = 3;

/// Bears on screen in the guessing game.
pub const DEFAULT_OPTION_COUNT: usize = 3;

/// Hearts at the start of a session.
pub const DEFAULT_STARTING_LIVES: u32 = 3;

/// Upper bound (inclusive) of the per-round meat total.
pub const DEFAULT_MAX_TOTAL: u32 = 9;

/// Points awarded for picking the heaviest bear.
pub const DEFAULT_POINTS_PER_CORRECT: u32 = 10;

/// One time unit of the reveal sequence.
pub const DEFAULT_STEP: Duration = Duration::from_secs(1);

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("stage count must be > 0")]
    InvalidStageCount,

    #[error("option count must be >= 2")]
    InvalidOptionCount,

    #[error("starting lives must be > 0")]
    InvalidStartingLives,

    #[error("max total must be >= 1")]
    InvalidMaxTotal,

    #[error("step duration must be non-zero")]
    InvalidStep,
}

//
// ─── TURN CONFIG ───────────────────────────────────────────────────────────────
//

/// Rules and pacing for one mini-game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnConfig {
    option_count: usize,
    starting_lives: u32,
    max_total: u32,
    points_per_correct: u32,
    step: Duration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            option_count: DEFAULT_OPTION_COUNT,
            starting_lives: DEFAULT_STARTING_LIVES,
            max_total: DEFAULT_MAX_TOTAL,
            points_per_correct: DEFAULT_POINTS_PER_CORRECT,
            step: DEFAULT_STEP,
        }
    }
}

impl TurnConfig {
    /// Creates a custom turn configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any bound would make a round unplayable.
    pub fn new(
        option_count: usize,
        starting_lives: u32,
        max_total: u32,
        points_per_correct: u32,
        step: Duration,
    ) -> Result<Self, ConfigError> {
        if option_count < 2 {
            return Err(ConfigError::InvalidOptionCount);
        }
        if starting_lives == 0 {
            return Err(ConfigError::InvalidStartingLives);
        }
        if max_total == 0 {
            return Err(ConfigError::InvalidMaxTotal);
        }
        if step.is_zero() {
            return Err(ConfigError::InvalidStep);
        }

        Ok(Self {
            option_count,
            starting_lives,
            max_total,
            points_per_correct,
            step,
        })
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.option_count
    }

    #[must_use]
    pub fn starting_lives(&self) -> u32 {
        self.starting_lives
    }

    #[must_use]
    pub fn max_total(&self) -> u32 {
        self.max_total
    }

    #[must_use]
    pub fn points_per_correct(&self) -> u32 {
        self.points_per_correct
    }

    #[must_use]
    pub fn step(&self) -> Duration {
        self.step
    }
}

//
// ─── HUB CONFIG ────────────────────────────────────────────────────────────────
//

/// Top-level settings for the hub and its mini-games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    stage_count: usize,
    stage_cost: u32,
    turn: TurnConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            stage_count: DEFAULT_STAGE_COUNT,
            stage_cost: STAGE_COST,
            turn: TurnConfig::default(),
        }
    }
}

impl HubConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidStageCount` if `stage_count` is zero.
    pub fn new(stage_count: usize, stage_cost: u32, turn: TurnConfig) -> Result<Self, ConfigError> {
        if stage_count == 0 {
            return Err(ConfigError::InvalidStageCount);
        }
        Ok(Self {
            stage_count,
            stage_cost,
            turn,
        })
    }

    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    #[must_use]
    pub fn stage_cost(&self) -> u32 {
        self.stage_cost
    }

    #[must_use]
    pub fn turn(&self) -> &TurnConfig {
        &self.turn
    }
}
