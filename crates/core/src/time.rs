use chrono::{DateTime, Utc};

/// Source of the start and finish stamps on a `SessionReport`.
///
/// Rounds are paced by engine ticks and never read this.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// `Utc::now` on every read.
    #[default]
    System,
    /// Every report is stamped with the same instant.
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// Unix seconds that frozen clocks report (2023-11-14T22:13:20Z).
pub const REPORT_EPOCH_SECS: i64 = 1_700_000_000;

/// Instant a `frozen_clock` stamps reports with.
#[must_use]
pub fn report_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(REPORT_EPOCH_SECS, 0).unwrap_or_default()
}

/// Clock for tests that compare report timestamps.
#[must_use]
pub fn frozen_clock() -> Clock {
    Clock::fixed(report_epoch())
}
