use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use hub_core::RandomSource;
use hub_core::model::SessionReport;

use super::controller::SessionController;
use crate::error::SessionError;

/// Default pacing of the driver loop.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Player input while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Guess(usize),
    Pause,
    Resume,
    Exit,
}

/// How a driven session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Finished(SessionReport),
    Exited,
}

/// Real-time loop around a `SessionController`.
///
/// Ticks the running engine with measured elapsed time and applies commands
/// as they arrive. A closed command channel counts as an exit.
#[derive(Debug, Clone, Copy)]
pub struct SessionDriver {
    tick_interval: Duration,
}

impl Default for SessionDriver {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl SessionDriver {
    /// Driver ticking every `tick_interval`, never faster than once a millisecond.
    #[must_use]
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval: tick_interval.max(Duration::from_millis(1)),
        }
    }

    /// Drive the controller's active session until game over or exit.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` if no session is running, or any
    /// error raised while recording the finished session.
    pub async fn run<R: RandomSource>(
        &self,
        controller: &mut SessionController<R>,
        commands: &mut mpsc::Receiver<SessionCommand>,
    ) -> Result<SessionOutcome, SessionError> {
        if !controller.is_hub_suspended() {
            return Err(SessionError::NotActive);
        }

        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(SessionCommand::Guess(option)) => match controller.guess(option) {
                        Ok(outcome) => debug!("guess {option}: {outcome:?}"),
                        Err(SessionError::Turn(err)) => warn!("guess rejected: {err}"),
                        Err(err) => return Err(err),
                    },
                    Some(SessionCommand::Pause) => {
                        controller.pause()?;
                    }
                    Some(SessionCommand::Resume) => {
                        controller.resume()?;
                    }
                    Some(SessionCommand::Exit) | None => {
                        controller.exit_session();
                        return Ok(SessionOutcome::Exited);
                    }
                },

                _ = interval.tick() => {
                    let now = Instant::now();
                    controller.tick(now - last)?;
                    last = now;
                }
            }

            if let Some(report) = controller.take_report() {
                return Ok(SessionOutcome::Finished(report));
            }
        }
    }
}
