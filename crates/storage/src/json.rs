//! Snapshot file backend.
//!
//! The whole `ProgressionState` is one pretty-printed JSON document. Saves go
//! through a sibling `.tmp` file and a rename, so readers only ever see a
//! complete snapshot.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use hub_core::model::ProgressionState;
use log::{debug, warn};

use crate::repository::{ProgressionRecord, ProgressionRepository, Storage, StorageError};

#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn io_error(err: &std::io::Error) -> StorageError {
    StorageError::Io(err.to_string())
}

#[async_trait]
impl ProgressionRepository for JsonFileRepository {
    async fn load(&self) -> Result<ProgressionState, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(StorageError::NotFound),
            Err(err) => return Err(io_error(&err)),
        };
        let record: ProgressionRecord = serde_json::from_str(&raw)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        debug!("loaded snapshot from {}", self.path.display());
        record.into_state()
    }

    async fn save(&self, state: &ProgressionState) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&ProgressionRecord::from_state(state))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(&e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json.as_bytes())
            .await
            .map_err(|e| io_error(&e))?;
        if let Err(err) = tokio::fs::rename(&temp, &self.path).await {
            warn!("snapshot rename failed, discarding {}: {err}", temp.display());
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(io_error(&err));
        }
        debug!("saved snapshot to {}", self.path.display());
        Ok(())
    }
}

impl Storage {
    /// Build a `Storage` backed by a JSON snapshot file.
    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            progression: Arc::new(JsonFileRepository::new(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_core::model::StageIndex;

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("GameData.json"));
        assert!(repo.load().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("saves").join("GameData.json"));

        let mut state = ProgressionState::new(3).with_keys(4);
        state.apply_score(StageIndex::new(2), 70).unwrap();
        repo.save(&state).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), state);
        assert!(!repo.temp_path().exists());
    }

    #[tokio::test]
    async fn reads_snapshot_written_by_hand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GameData.json");
        std::fs::write(
            &path,
            r#"{ "key": 25, "coin": 3, "games": [true, false, false], "gameScores": [40, 0, 0] }"#,
        )
        .unwrap();

        let state = JsonFileRepository::new(&path).load().await.unwrap();
        assert_eq!(state.keys(), 25);
        assert_eq!(state.coins(), 3);
        assert_eq!(state.is_unlocked(StageIndex::new(0)), Some(true));
        assert_eq!(state.score_for(StageIndex::new(0)), Some(40));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GameData.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileRepository::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn failed_save_leaves_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GameData.json");
        let repo = JsonFileRepository::new(&path);
        repo.save(&ProgressionState::new(1).with_keys(8)).await.unwrap();

        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(repo.temp_path()).unwrap();
        let err = repo
            .save(&ProgressionState::new(1).with_keys(99))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(repo.load().await.unwrap().keys(), 8);
    }
}
