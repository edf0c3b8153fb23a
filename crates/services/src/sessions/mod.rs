mod controller;
mod driver;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::SessionController;
pub use driver::{DEFAULT_TICK_INTERVAL, SessionCommand, SessionDriver, SessionOutcome};
