//! Round-based state machine for the bear guessing game.
//!
//! The engine is time-free: the host advances it with `TurnEngine::tick` and
//! forwards the queued `TurnEvent`s to its presenter.

mod engine;
mod event;
mod palette;
mod state;

pub use engine::TurnEngine;
pub use event::{GuessOutcome, TurnEvent};
pub use palette::{HighlightColor, PALETTE};
pub use state::{TurnError, TurnPhase, TurnState};
