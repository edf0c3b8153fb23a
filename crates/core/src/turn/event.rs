use crate::turn::HighlightColor;

/// Change notifications for the presenter, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    RoundStarted { round: u32 },
    Highlighted { option: usize, color: HighlightColor },
    Restored { option: usize },
    AwaitingGuess,
    GuessResolved {
        option: usize,
        correct: bool,
        score: u32,
        lives_remaining: u32,
    },
    WeightsShown { weights: Vec<u32> },
    WeightsHidden,
    Paused,
    Resumed,
    GameOver { final_score: u32, rounds_played: u32 },
    Cancelled,
}

/// Direct result of a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Not accepting guesses right now; nothing changed.
    Ignored,
    Correct { score: u32 },
    Incorrect { lives_remaining: u32 },
    /// The guess was wrong and used the last life.
    GameOver { final_score: u32 },
}
