use async_trait::async_trait;
use hub_core::model::ProgressionState;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl StorageError {
    /// True for `NotFound`, which callers answer with a default state.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound)
    }
}

/// Persisted shape of the progression snapshot.
///
/// Field names follow the shipped save file so existing snapshots keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    pub key: u32,
    pub coin: u32,
    pub games: Vec<bool>,
    #[serde(rename = "gameScores")]
    pub game_scores: Vec<u32>,
}

impl ProgressionRecord {
    #[must_use]
    pub fn from_state(state: &ProgressionState) -> Self {
        Self {
            key: state.keys(),
            coin: state.coins(),
            games: state.stage_unlocked().to_vec(),
            game_scores: state.stage_high_score().to_vec(),
        }
    }

    /// Convert the record back into a domain `ProgressionState`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSnapshot` if the per-stage lists disagree.
    pub fn into_state(self) -> Result<ProgressionState, StorageError> {
        ProgressionState::from_persisted(self.key, self.coin, self.games, self.game_scores)
            .map_err(|e| StorageError::InvalidSnapshot(e.to_string()))
    }
}

/// Repository contract for the progression snapshot.
#[async_trait]
pub trait ProgressionRepository: Send + Sync {
    /// Read the whole snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing was ever saved, or other storage errors.
    async fn load(&self) -> Result<ProgressionState, StorageError>;

    /// Replace the whole snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written; the previous
    /// snapshot stays in place.
    async fn save(&self, state: &ProgressionState) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshot: Arc<Mutex<Option<ProgressionRecord>>>,
    unavailable: Arc<Mutex<bool>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository seeded with an existing snapshot.
    #[must_use]
    pub fn with_state(state: &ProgressionState) -> Self {
        let repo = Self::new();
        if let Ok(mut guard) = repo.snapshot.lock() {
            *guard = Some(ProgressionRecord::from_state(state));
        }
        repo
    }

    /// Make every following call fail with `StorageError::Io`.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut guard) = self.unavailable.lock() {
            *guard = unavailable;
        }
    }

    /// Raw snapshot as last saved.
    #[must_use]
    pub fn record(&self) -> Option<ProgressionRecord> {
        self.snapshot.lock().ok().and_then(|guard| guard.clone())
    }

    fn check_available(&self) -> Result<(), StorageError> {
        let guard = self
            .unavailable
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        if *guard {
            return Err(StorageError::Io("repository unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressionRepository for InMemoryRepository {
    async fn load(&self) -> Result<ProgressionState, StorageError> {
        self.check_available()?;
        let guard = self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        guard
            .clone()
            .ok_or(StorageError::NotFound)?
            .into_state()
    }

    async fn save(&self, state: &ProgressionState) -> Result<(), StorageError> {
        self.check_available()?;
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = Some(ProgressionRecord::from_state(state));
        Ok(())
    }
}

/// Holds the progression repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progression: Arc<dyn ProgressionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            progression: Arc::new(InMemoryRepository::new()),
        }
    }
}
