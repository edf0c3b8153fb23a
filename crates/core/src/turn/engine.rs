use std::collections::VecDeque;
use std::time::Duration;

use log::debug;

use crate::config::TurnConfig;
use crate::rng::RandomSource;
use crate::turn::{GuessOutcome, HighlightColor, TurnError, TurnEvent, TurnPhase, TurnState};

//
// ─── TIMELINE ──────────────────────────────────────────────────────────────────
//

/// A scheduled action, due `delay` after the previous step ran.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    delay: Duration,
    action: StepAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StepAction {
    Highlight { option: usize, color: HighlightColor },
    Restore { option: usize },
    OpenGuessing,
    ShowWeights,
    HideWeights,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// One mini-game instance: rounds, lives and the timed reveal sequence.
///
/// Rounds run strictly one after another. After a resolved guess the next
/// round is begun by the timeline itself, so `start_round` is only needed for
/// the first one.
pub struct TurnEngine<R> {
    config: TurnConfig,
    rng: R,
    state: TurnState,
    timeline: VecDeque<Step>,
    elapsed: Duration,
    events: Vec<TurnEvent>,
    paused: bool,
    cancelled: bool,
}

impl<R: RandomSource> TurnEngine<R> {
    #[must_use]
    pub fn new(config: TurnConfig, rng: R) -> Self {
        let state = TurnState::new(config.option_count(), config.starting_lives());
        Self {
            config,
            rng,
            state,
            timeline: VecDeque::new(),
            elapsed: Duration::ZERO,
            events: Vec::new(),
            paused: false,
            cancelled: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> &TurnState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.state.phase
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True once the instance can make no further progress.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.cancelled || self.state.phase == TurnPhase::GameOver
    }

    /// Final score, available only after game over.
    #[must_use]
    pub fn final_score(&self) -> Option<u32> {
        (self.state.phase == TurnPhase::GameOver && !self.cancelled).then_some(self.state.score)
    }

    /// Time until the next scheduled step, if any is pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timeline
            .front()
            .map(|step| step.delay.saturating_sub(self.elapsed))
    }

    /// Drain notifications queued since the last call.
    pub fn take_events(&mut self) -> Vec<TurnEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin a round if none is in progress.
    ///
    /// Returns `false` (and does nothing) while a round is running, after
    /// game over, or after cancellation.
    pub fn start_round(&mut self) -> bool {
        if self.cancelled || self.paused || self.state.phase != TurnPhase::AwaitingRoundStart {
            debug!(
                "start_round ignored in phase {:?} (paused: {}, cancelled: {})",
                self.state.phase, self.paused, self.cancelled
            );
            return false;
        }
        self.begin_round();
        self.run_due();
        true
    }

    /// Advance the timeline by `delta` of real time.
    pub fn tick(&mut self, delta: Duration) {
        if self.cancelled || self.paused || self.timeline.is_empty() {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(delta);
        self.run_due();
    }

    /// Submit the player's pick.
    ///
    /// Guesses outside `AwaitingGuess` (or while paused) are ignored.
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidOption` for an out-of-range option; nothing changes.
    pub fn guess(&mut self, option: usize) -> Result<GuessOutcome, TurnError> {
        if self.cancelled || self.paused || self.state.phase != TurnPhase::AwaitingGuess {
            debug!("guess {option} ignored in phase {:?}", self.state.phase);
            return Ok(GuessOutcome::Ignored);
        }
        let count = self.state.option_weights.len();
        if option >= count {
            return Err(TurnError::InvalidOption { option, count });
        }

        let correct = self.state.is_heaviest(option);
        self.state.phase = TurnPhase::Resolved;
        if correct {
            self.state.score = self
                .state
                .score
                .saturating_add(self.config.points_per_correct());
        } else {
            self.state.lives_remaining = self.state.lives_remaining.saturating_sub(1);
        }
        debug!(
            "round {} guess {option}: correct={correct} score={} lives={}",
            self.state.round_index, self.state.score, self.state.lives_remaining
        );
        self.events.push(TurnEvent::GuessResolved {
            option,
            correct,
            score: self.state.score,
            lives_remaining: self.state.lives_remaining,
        });

        if self.state.lives_remaining == 0 {
            self.finish();
            return Ok(GuessOutcome::GameOver {
                final_score: self.state.score,
            });
        }

        let step = self.config.step();
        self.timeline.push_back(Step {
            delay: Duration::ZERO,
            action: StepAction::ShowWeights,
        });
        self.timeline.push_back(Step {
            delay: step,
            action: StepAction::HideWeights,
        });
        self.run_due();

        Ok(if correct {
            GuessOutcome::Correct {
                score: self.state.score,
            }
        } else {
            GuessOutcome::Incorrect {
                lives_remaining: self.state.lives_remaining,
            }
        })
    }

    /// Freeze the timeline. Returns `false` if already paused or finished.
    pub fn pause(&mut self) -> bool {
        if self.paused || self.is_terminated() {
            return false;
        }
        self.paused = true;
        self.events.push(TurnEvent::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.paused || self.is_terminated() {
            return false;
        }
        self.paused = false;
        self.events.push(TurnEvent::Resumed);
        true
    }

    /// Abandon the instance. Pending steps are dropped and no score is reported.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.timeline.clear();
        self.elapsed = Duration::ZERO;
        self.events.push(TurnEvent::Cancelled);
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    /// Draw this round's meat and queue the reveal sequence.
    fn begin_round(&mut self) {
        let total = self.rng.in_range(1, self.config.max_total());
        let weights = &mut self.state.option_weights;
        weights.iter_mut().for_each(|w| *w = 0);
        // Repeated single increments: not uniform over partitions of `total`.
        for _ in 0..total {
            let option = self.rng.pick_index(weights.len());
            weights[option] += 1;
        }
        debug!(
            "round {} weights {:?} (total {total})",
            self.state.round_index, self.state.option_weights
        );

        self.state.phase = TurnPhase::Revealing;
        self.events.push(TurnEvent::RoundStarted {
            round: self.state.round_index,
        });

        let step = self.config.step();
        for option in 0..self.state.option_weights.len() {
            if self.state.option_weights[option] == 0 {
                continue;
            }
            let color = HighlightColor::random(&mut self.rng);
            self.timeline.push_back(Step {
                delay: Duration::ZERO,
                action: StepAction::Highlight { option, color },
            });
            self.timeline.push_back(Step {
                delay: step,
                action: StepAction::Restore { option },
            });
        }
        self.timeline.push_back(Step {
            delay: step,
            action: StepAction::OpenGuessing,
        });
    }

    fn run_due(&mut self) {
        while let Some(step) = self.timeline.front() {
            if step.delay > self.elapsed {
                break;
            }
            self.elapsed -= step.delay;
            let Some(step) = self.timeline.pop_front() else {
                break;
            };
            self.apply(step.action);
        }
        if self.timeline.is_empty() {
            self.elapsed = Duration::ZERO;
        }
    }

    fn apply(&mut self, action: StepAction) {
        match action {
            StepAction::Highlight { option, color } => {
                self.events.push(TurnEvent::Highlighted { option, color });
            }
            StepAction::Restore { option } => {
                self.events.push(TurnEvent::Restored { option });
            }
            StepAction::OpenGuessing => {
                self.state.phase = TurnPhase::AwaitingGuess;
                self.events.push(TurnEvent::AwaitingGuess);
            }
            StepAction::ShowWeights => {
                self.events.push(TurnEvent::WeightsShown {
                    weights: self.state.option_weights.clone(),
                });
            }
            StepAction::HideWeights => {
                self.events.push(TurnEvent::WeightsHidden);
                self.state.round_index = self.state.round_index.saturating_add(1);
                self.state.phase = TurnPhase::AwaitingRoundStart;
                self.begin_round();
            }
        }
    }

    fn finish(&mut self) {
        self.state.phase = TurnPhase::GameOver;
        self.timeline.clear();
        self.elapsed = Duration::ZERO;
        let rounds_played = self.state.round_index.saturating_add(1);
        debug!(
            "game over after {rounds_played} rounds, score {}",
            self.state.score
        );
        self.events.push(TurnEvent::GameOver {
            final_score: self.state.score,
            rounds_played,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;

    const STEP: Duration = Duration::from_secs(1);

    fn engine_for(rounds: &[&[u32]]) -> TurnEngine<ScriptedRandom> {
        let mut rng = ScriptedRandom::default();
        for weights in rounds {
            rng.push_weights(weights);
        }
        TurnEngine::new(TurnConfig::default(), rng)
    }

    /// Start (or continue) and run the reveal until guesses are accepted.
    fn reveal<R: RandomSource>(engine: &mut TurnEngine<R>) {
        engine.start_round();
        for _ in 0..32 {
            if engine.phase() == TurnPhase::AwaitingGuess {
                return;
            }
            engine.tick(STEP);
        }
        panic!("reveal never finished");
    }

    #[test]
    fn round_uses_scripted_weights() {
        let mut engine = engine_for(&[&[3, 0, 6]]);
        assert!(engine.start_round());
        assert_eq!(engine.state().option_weights(), &[3, 0, 6]);
        assert_eq!(engine.phase(), TurnPhase::Revealing);
    }

    #[test]
    fn reveal_highlights_nonzero_options_one_at_a_time() {
        let mut engine = engine_for(&[&[3, 0, 6]]);
        engine.start_round();
        assert_eq!(
            engine.take_events(),
            vec![
                TurnEvent::RoundStarted { round: 0 },
                TurnEvent::Highlighted {
                    option: 0,
                    color: HighlightColor::Red
                },
            ]
        );

        engine.tick(STEP);
        assert_eq!(
            engine.take_events(),
            vec![
                TurnEvent::Restored { option: 0 },
                TurnEvent::Highlighted {
                    option: 2,
                    color: HighlightColor::Red
                },
            ]
        );

        engine.tick(STEP);
        assert_eq!(engine.take_events(), vec![TurnEvent::Restored { option: 2 }]);
        assert_eq!(engine.phase(), TurnPhase::Revealing);

        engine.tick(STEP);
        assert_eq!(engine.take_events(), vec![TurnEvent::AwaitingGuess]);
        assert_eq!(engine.phase(), TurnPhase::AwaitingGuess);
    }

    #[test]
    fn partial_ticks_accumulate() {
        let mut engine = engine_for(&[&[1, 0, 0]]);
        engine.start_round();
        engine.take_events();
        engine.tick(Duration::from_millis(600));
        assert!(engine.take_events().is_empty());
        engine.tick(Duration::from_millis(400));
        assert_eq!(engine.take_events(), vec![TurnEvent::Restored { option: 0 }]);
        assert_eq!(engine.next_deadline(), Some(STEP));
    }

    #[test]
    fn one_large_tick_runs_the_whole_reveal() {
        let mut engine = engine_for(&[&[2, 2, 2]]);
        engine.start_round();
        engine.tick(Duration::from_secs(60));
        assert_eq!(engine.phase(), TurnPhase::AwaitingGuess);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn start_round_is_not_reentrant() {
        let mut engine = engine_for(&[&[1, 1, 1], &[9, 0, 0]]);
        assert!(engine.start_round());
        assert!(!engine.start_round());
        assert_eq!(engine.state().option_weights(), &[1, 1, 1]);

        engine.tick(Duration::from_secs(60));
        assert!(!engine.start_round());
        assert_eq!(engine.state().round_index(), 0);
    }

    #[test]
    fn correct_guess_scores_and_keeps_lives() {
        let mut engine = engine_for(&[&[3, 0, 6], &[1, 0, 0]]);
        reveal(&mut engine);
        let outcome = engine.guess(2).unwrap();
        assert_eq!(outcome, GuessOutcome::Correct { score: 10 });
        assert_eq!(engine.state().score(), 10);
        assert_eq!(engine.state().lives_remaining(), 3);
    }

    #[test]
    fn wrong_guess_costs_a_life_and_keeps_score() {
        let mut engine = engine_for(&[&[3, 0, 6]]);
        reveal(&mut engine);
        let outcome = engine.guess(0).unwrap();
        assert_eq!(outcome, GuessOutcome::Incorrect { lives_remaining: 2 });
        assert_eq!(engine.state().score(), 0);
        assert_eq!(engine.state().lives_remaining(), 2);
    }

    #[test]
    fn every_option_sharing_the_max_is_correct() {
        let mut engine = engine_for(&[&[4, 4, 1], &[4, 4, 1]]);
        reveal(&mut engine);
        assert!(matches!(engine.guess(1).unwrap(), GuessOutcome::Correct { .. }));
        engine.tick(STEP);
        reveal(&mut engine);
        assert!(matches!(engine.guess(0).unwrap(), GuessOutcome::Correct { .. }));
        assert_eq!(engine.state().score(), 20);
    }

    #[test]
    fn guesses_outside_awaiting_guess_are_ignored() {
        let mut engine = engine_for(&[&[3, 0, 6]]);
        assert_eq!(engine.guess(2).unwrap(), GuessOutcome::Ignored);

        engine.start_round();
        let before = engine.state().clone();
        assert_eq!(engine.guess(2).unwrap(), GuessOutcome::Ignored);
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn out_of_range_guess_is_rejected_without_mutation() {
        let mut engine = engine_for(&[&[3, 0, 6]]);
        reveal(&mut engine);
        let before = engine.state().clone();
        let err = engine.guess(3).unwrap_err();
        assert_eq!(err, TurnError::InvalidOption { option: 3, count: 3 });
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn resolved_round_shows_weights_then_starts_next_round() {
        let mut engine = engine_for(&[&[3, 0, 6], &[0, 5, 0]]);
        reveal(&mut engine);
        engine.take_events();
        engine.guess(2).unwrap();
        assert_eq!(engine.phase(), TurnPhase::Resolved);
        assert!(!engine.start_round());
        assert_eq!(
            engine.take_events(),
            vec![
                TurnEvent::GuessResolved {
                    option: 2,
                    correct: true,
                    score: 10,
                    lives_remaining: 3
                },
                TurnEvent::WeightsShown {
                    weights: vec![3, 0, 6]
                },
            ]
        );

        engine.tick(STEP);
        let events = engine.take_events();
        assert_eq!(events[0], TurnEvent::WeightsHidden);
        assert_eq!(events[1], TurnEvent::RoundStarted { round: 1 });
        assert_eq!(engine.state().round_index(), 1);
        assert_eq!(engine.state().option_weights(), &[0, 5, 0]);
        assert_eq!(engine.phase(), TurnPhase::Revealing);
    }

    #[test]
    fn three_misses_end_the_game() {
        let mut engine = engine_for(&[&[3, 0, 6], &[3, 0, 6], &[3, 0, 6]]);
        let mut lives = Vec::new();
        for _ in 0..3 {
            reveal(&mut engine);
            engine.guess(0).unwrap();
            lives.push(engine.state().lives_remaining());
            engine.tick(STEP);
        }
        assert_eq!(lives, vec![2, 1, 0]);
        assert_eq!(engine.phase(), TurnPhase::GameOver);
        assert_eq!(engine.final_score(), Some(0));
        assert!(engine.is_terminated());

        assert!(!engine.start_round());
        engine.tick(Duration::from_secs(60));
        assert_eq!(engine.phase(), TurnPhase::GameOver);
        assert_eq!(engine.state().round_index(), 2);
    }

    #[test]
    fn game_over_reports_score_and_rounds() {
        let mut engine = engine_for(&[&[1, 0, 0], &[1, 0, 0], &[1, 0, 0], &[1, 0, 0]]);
        reveal(&mut engine);
        engine.guess(0).unwrap();
        engine.tick(STEP);
        for _ in 0..2 {
            reveal(&mut engine);
            engine.guess(1).unwrap();
            engine.tick(STEP);
        }
        reveal(&mut engine);
        engine.take_events();
        let outcome = engine.guess(2).unwrap();
        assert_eq!(outcome, GuessOutcome::GameOver { final_score: 10 });
        assert!(engine.take_events().contains(&TurnEvent::GameOver {
            final_score: 10,
            rounds_played: 4
        }));
    }

    #[test]
    fn pause_freezes_timeline_and_guesses() {
        let mut engine = engine_for(&[&[1, 0, 0]]);
        engine.start_round();
        assert!(engine.pause());
        assert!(!engine.pause());
        engine.tick(Duration::from_secs(60));
        assert_eq!(engine.phase(), TurnPhase::Revealing);

        assert!(engine.resume());
        engine.tick(Duration::from_secs(60));
        assert_eq!(engine.phase(), TurnPhase::AwaitingGuess);

        engine.pause();
        assert_eq!(engine.guess(0).unwrap(), GuessOutcome::Ignored);
        engine.resume();
        assert!(matches!(engine.guess(0).unwrap(), GuessOutcome::Correct { .. }));
    }

    #[test]
    fn cancel_drops_pending_steps_and_score() {
        let mut engine = engine_for(&[&[1, 0, 0], &[1, 0, 0]]);
        reveal(&mut engine);
        engine.guess(0).unwrap();
        engine.cancel();
        engine.tick(Duration::from_secs(60));
        assert_eq!(engine.state().round_index(), 0);
        assert_eq!(engine.final_score(), None);
        assert_eq!(engine.guess(0).unwrap(), GuessOutcome::Ignored);
        assert!(engine.is_terminated());
    }

    /// Deterministic LCG so the distribution check covers many draws.
    struct Lcg(u64);

    impl RandomSource for Lcg {
        fn in_range(&mut self, low: u32, high: u32) -> u32 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let span = u64::from(high - low) + 1;
            low + ((self.0 >> 33) % span) as u32
        }
    }

    #[test]
    fn weights_always_sum_to_a_total_in_range() {
        let mut engine = TurnEngine::new(TurnConfig::default(), Lcg(7));
        for _ in 0..200 {
            reveal(&mut engine);
            let sum: u32 = engine.state().option_weights().iter().sum();
            assert!((1..=9).contains(&sum), "sum {sum} out of range");
            let heaviest = engine
                .state()
                .option_weights()
                .iter()
                .position(|w| *w == engine.state().max_weight())
                .unwrap();
            engine.guess(heaviest).unwrap();
            engine.tick(STEP);
        }
        assert_eq!(engine.state().lives_remaining(), 3);
        assert_eq!(engine.state().score(), 2_000);
    }
}
