use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::StageIndex;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionReportError {
    #[error("finished_at is before started_at")]
    InvalidTimeRange,
}

/// Outcome of a mini-game session that ran to game over.
///
/// Exited sessions never produce a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    stage: StageIndex,
    final_score: u32,
    keys_awarded: u32,
    rounds_played: u32,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl SessionReport {
    /// # Errors
    ///
    /// Returns `SessionReportError::InvalidTimeRange` if `finished_at` is before `started_at`.
    pub fn new(
        stage: StageIndex,
        final_score: u32,
        keys_awarded: u32,
        rounds_played: u32,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Result<Self, SessionReportError> {
        if finished_at < started_at {
            return Err(SessionReportError::InvalidTimeRange);
        }
        Ok(Self {
            stage,
            final_score,
            keys_awarded,
            rounds_played,
            started_at,
            finished_at,
        })
    }

    #[must_use]
    pub fn stage(&self) -> StageIndex {
        self.stage
    }

    #[must_use]
    pub fn final_score(&self) -> u32 {
        self.final_score
    }

    #[must_use]
    pub fn keys_awarded(&self) -> u32 {
        self.keys_awarded
    }

    #[must_use]
    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::report_epoch;

    #[test]
    fn rejects_backwards_time_range() {
        let now = report_epoch();
        let err = SessionReport::new(
            StageIndex::new(0),
            10,
            1,
            2,
            now,
            now - chrono::Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err, SessionReportError::InvalidTimeRange);
    }
}
