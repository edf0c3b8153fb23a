mod ids;
mod progression;
mod session;

pub use ids::StageIndex;
pub use progression::{POINTS_PER_KEY, ProgressionError, ProgressionState};
pub use session::{SessionReport, SessionReportError};
