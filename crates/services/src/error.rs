//! Shared error types for the services crate.

use thiserror::Error;

use hub_core::model::{ProgressionError, SessionReportError, StageIndex};
use hub_core::turn::TurnError;
use storage::StorageError;

/// Errors emitted by `ProgressionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressionServiceError {
    /// Load or save failed; the in-memory state is unchanged.
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StorageError),
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no stage selected")]
    NoStageSelected,
    #[error("stage {0} is locked")]
    StageLocked(StageIndex),
    #[error("stage {0} does not exist")]
    InvalidStage(StageIndex),
    #[error("a session is already running")]
    AlreadyActive,
    #[error("no session is running")]
    NotActive,
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error(transparent)]
    Progression(#[from] ProgressionError),
    #[error(transparent)]
    Report(#[from] SessionReportError),
}
