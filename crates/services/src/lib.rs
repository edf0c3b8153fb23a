#![forbid(unsafe_code)]

pub mod error;
pub mod presenter;
pub mod progression_service;
pub mod random;
pub mod sessions;

pub use hub_core::Clock;

pub use error::{ProgressionServiceError, SessionError};
pub use presenter::{HubEvent, HubPresenter, NullPresenter, RecordingPresenter};
pub use progression_service::ProgressionService;
pub use random::{SeededRandom, SharedRandom};
pub use sessions::{
    DEFAULT_TICK_INTERVAL, SessionCommand, SessionController, SessionDriver, SessionOutcome,
};
