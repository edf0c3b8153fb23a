use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use hub_core::model::{SessionReport, StageIndex};
use hub_core::turn::{GuessOutcome, TurnEngine, TurnEvent};
use hub_core::unlock::{self, SelectOutcome};
use hub_core::{Clock, HubConfig, RandomSource};

use crate::error::SessionError;
use crate::presenter::{HubEvent, HubPresenter};
use crate::progression_service::ProgressionService;
use crate::random::SharedRandom;

/// The mini-game currently on screen.
struct ActiveSession<R> {
    stage: StageIndex,
    engine: TurnEngine<SharedRandom<R>>,
    started_at: DateTime<Utc>,
}

/// Runs at most one mini-game at a time on top of the hub.
///
/// While a session is active the hub is suspended. A session that reaches
/// game over feeds its score into the progression exactly once; an exited
/// session records nothing.
pub struct SessionController<R> {
    progression: ProgressionService,
    config: HubConfig,
    clock: Clock,
    rng: SharedRandom<R>,
    presenter: Arc<dyn HubPresenter>,
    active: Option<ActiveSession<R>>,
    finished: Option<SessionReport>,
}

impl<R: RandomSource> SessionController<R> {
    #[must_use]
    pub fn new(
        progression: ProgressionService,
        config: HubConfig,
        clock: Clock,
        rng: R,
        presenter: Arc<dyn HubPresenter>,
    ) -> Self {
        Self {
            progression,
            config,
            clock,
            rng: SharedRandom::new(rng),
            presenter,
            active: None,
            finished: None,
        }
    }

    #[must_use]
    pub fn progression(&self) -> &ProgressionService {
        &self.progression
    }

    /// Hub-side actions: unlock, select, reward, save, reload.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` while a session runs; the hub
    /// stays suspended until it ends.
    pub fn progression_mut(&mut self) -> Result<&mut ProgressionService, SessionError> {
        if self.active.is_some() {
            return Err(SessionError::AlreadyActive);
        }
        Ok(&mut self.progression)
    }

    #[must_use]
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    #[must_use]
    pub fn is_hub_suspended(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn active_stage(&self) -> Option<StageIndex> {
        self.active.as_ref().map(|session| session.stage)
    }

    /// Engine of the running session, if any.
    #[must_use]
    pub fn engine(&self) -> Option<&TurnEngine<SharedRandom<R>>> {
        self.active.as_ref().map(|session| &session.engine)
    }

    /// Launch the selected stage's mini-game and begin its first round.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` while a session runs,
    /// `NoStageSelected`, `StageLocked` or `InvalidStage` when the selection
    /// cannot be played.
    pub fn play_selected(&mut self) -> Result<StageIndex, SessionError> {
        if self.active.is_some() {
            return Err(SessionError::AlreadyActive);
        }
        let stage = self
            .progression
            .selected_stage()
            .ok_or(SessionError::NoStageSelected)?;
        match unlock::select_stage(self.progression.state(), stage) {
            SelectOutcome::Selected(_) => {}
            SelectOutcome::Locked => return Err(SessionError::StageLocked(stage)),
            SelectOutcome::InvalidIndex => return Err(SessionError::InvalidStage(stage)),
        }

        self.finished = None;
        let mut engine = TurnEngine::new(self.config.turn().clone(), self.rng.clone());
        info!("starting session on stage {}", stage.ordinal());
        self.presenter.notify(&HubEvent::HubSuspended { stage });
        engine.start_round();
        self.active = Some(ActiveSession {
            stage,
            engine,
            started_at: self.clock.now(),
        });
        self.settle()?;
        Ok(stage)
    }

    /// Advance the running session by `delta` of real time.
    ///
    /// # Errors
    ///
    /// Propagates failures from recording a finished session.
    pub fn tick(&mut self, delta: Duration) -> Result<(), SessionError> {
        let Some(session) = self.active.as_mut() else {
            return Ok(());
        };
        session.engine.tick(delta);
        self.settle()
    }

    /// Forward the player's pick to the running session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without a session, or
    /// `SessionError::Turn` for an out-of-range option.
    pub fn guess(&mut self, option: usize) -> Result<GuessOutcome, SessionError> {
        let session = self.active.as_mut().ok_or(SessionError::NotActive)?;
        let outcome = session.engine.guess(option)?;
        self.settle()?;
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without a session.
    pub fn pause(&mut self) -> Result<bool, SessionError> {
        let session = self.active.as_mut().ok_or(SessionError::NotActive)?;
        let changed = session.engine.pause();
        self.settle()?;
        Ok(changed)
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotActive` without a session.
    pub fn resume(&mut self) -> Result<bool, SessionError> {
        let session = self.active.as_mut().ok_or(SessionError::NotActive)?;
        let changed = session.engine.resume();
        self.settle()?;
        Ok(changed)
    }

    /// Leave the running session, discarding its progress.
    ///
    /// Returns `false` if nothing was running.
    pub fn exit_session(&mut self) -> bool {
        let Some(mut session) = self.active.take() else {
            return false;
        };
        session.engine.cancel();
        self.forward(session.engine.take_events());
        info!(
            "left stage {} mid-session, score {} discarded",
            session.stage.ordinal(),
            session.engine.state().score()
        );
        self.presenter.notify(&HubEvent::HubResumed);
        true
    }

    /// Report of the last session that reached game over, handed out once.
    pub fn take_report(&mut self) -> Option<SessionReport> {
        self.finished.take()
    }

    /// Flush engine events and close out a session that hit game over.
    fn settle(&mut self) -> Result<(), SessionError> {
        let Some(session) = self.active.as_mut() else {
            return Ok(());
        };
        let events = session.engine.take_events();
        let final_score = session.engine.final_score();
        self.forward(events);

        let Some(final_score) = final_score else {
            return Ok(());
        };
        let Some(session) = self.active.take() else {
            return Ok(());
        };
        let closed = self.close_out(&session, final_score);
        self.presenter.notify(&HubEvent::HubResumed);
        self.finished = Some(closed?);
        Ok(())
    }

    /// Record the score of a finished session and build its report.
    ///
    /// The hub is resumed by the caller whether or not this succeeds.
    fn close_out(
        &mut self,
        session: &ActiveSession<R>,
        final_score: u32,
    ) -> Result<SessionReport, SessionError> {
        let keys_awarded = self
            .progression
            .record_score(session.stage, final_score)
            .inspect_err(|err| {
                warn!(
                    "stage {} score {final_score} not recorded: {err}",
                    session.stage.ordinal()
                );
            })?;
        let report = SessionReport::new(
            session.stage,
            final_score,
            keys_awarded,
            session.engine.state().round_index().saturating_add(1),
            session.started_at,
            self.clock.now(),
        )?;
        info!(
            "stage {} finished: score {final_score}, {keys_awarded} keys awarded",
            session.stage.ordinal()
        );
        self.presenter
            .notify(&HubEvent::SessionFinished(report.clone()));
        Ok(report)
    }

    fn forward(&self, events: Vec<TurnEvent>) {
        for event in events {
            debug!("turn event {event:?}");
            self.presenter.notify(&HubEvent::Turn(event));
        }
    }
}
