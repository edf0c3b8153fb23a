use std::sync::{Arc, Mutex};

use hub_core::model::{SessionReport, StageIndex};
use hub_core::turn::TurnEvent;

/// Change notifications pushed to whatever renders the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    ProgressionLoaded { keys: u32, coins: u32 },
    ProgressionSaved,
    KeysChanged { keys: u32 },
    CoinsChanged { coins: u32 },
    StageUnlocked(StageIndex),
    StageSelected(StageIndex),
    HubSuspended { stage: StageIndex },
    HubResumed,
    Turn(TurnEvent),
    SessionFinished(SessionReport),
}

/// Presentation layer collaborator. Rendering is entirely its concern.
pub trait HubPresenter: Send + Sync {
    fn notify(&self, event: &HubEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl HubPresenter for NullPresenter {
    fn notify(&self, _event: &HubEvent) {}
}

/// Keeps every event in order; used by tests and replays.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    events: Arc<Mutex<Vec<HubEvent>>>,
}

impl RecordingPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<HubEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.events.lock() {
            guard.clear();
        }
    }

    /// Number of recorded events matching `pred`.
    #[must_use]
    pub fn count(&self, pred: impl Fn(&HubEvent) -> bool) -> usize {
        self.events
            .lock()
            .map(|guard| guard.iter().filter(|e| pred(e)).count())
            .unwrap_or(0)
    }
}

impl HubPresenter for RecordingPresenter {
    fn notify(&self, event: &HubEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}
