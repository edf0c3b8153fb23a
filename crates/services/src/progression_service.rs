use std::sync::Arc;

use log::{info, warn};

use hub_core::HubConfig;
use hub_core::model::{ProgressionError, ProgressionState, StageIndex};
use hub_core::unlock::{self, SelectOutcome, UnlockOutcome};
use storage::ProgressionRepository;

use crate::error::ProgressionServiceError;
use crate::presenter::{HubEvent, HubPresenter};

/// Owns the player's progression and the hub-side actions on it.
///
/// Nothing is written to the repository until `save` is called.
pub struct ProgressionService {
    repo: Arc<dyn ProgressionRepository>,
    presenter: Arc<dyn HubPresenter>,
    state: ProgressionState,
    stage_cost: u32,
    selected: Option<StageIndex>,
}

impl ProgressionService {
    /// Service over an explicit starting state.
    #[must_use]
    pub fn new(
        repo: Arc<dyn ProgressionRepository>,
        presenter: Arc<dyn HubPresenter>,
        state: ProgressionState,
        stage_cost: u32,
    ) -> Self {
        Self {
            repo,
            presenter,
            state,
            stage_cost,
            selected: None,
        }
    }

    /// Load the snapshot, falling back to a fresh state when none exists.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError::PersistenceUnavailable` for any
    /// storage failure other than a missing snapshot.
    pub async fn open(
        repo: Arc<dyn ProgressionRepository>,
        presenter: Arc<dyn HubPresenter>,
        config: &HubConfig,
    ) -> Result<Self, ProgressionServiceError> {
        let state = match repo.load().await {
            Ok(state) => {
                if state.stage_count() != config.stage_count() {
                    warn!(
                        "snapshot has {} stages, config expects {}",
                        state.stage_count(),
                        config.stage_count()
                    );
                }
                state
            }
            Err(err) if err.is_not_found() => {
                info!("no snapshot found, starting fresh");
                ProgressionState::new(config.stage_count())
            }
            Err(err) => return Err(err.into()),
        };
        let service = Self::new(repo, presenter, state, config.stage_cost());
        service.notify_loaded();
        Ok(service)
    }

    #[must_use]
    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    #[must_use]
    pub fn selected_stage(&self) -> Option<StageIndex> {
        self.selected
    }

    #[must_use]
    pub fn stage_cost(&self) -> u32 {
        self.stage_cost
    }

    /// Write the whole state to the repository.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError::PersistenceUnavailable` if the write fails.
    pub async fn save(&self) -> Result<(), ProgressionServiceError> {
        if let Err(err) = self.repo.save(&self.state).await {
            warn!("save failed: {err}");
            return Err(err.into());
        }
        info!("progression saved (keys {})", self.state.keys());
        self.presenter.notify(&HubEvent::ProgressionSaved);
        Ok(())
    }

    /// Replace the in-memory state with the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionServiceError::PersistenceUnavailable` (including a
    /// missing snapshot); the current state is kept.
    pub async fn reload(&mut self) -> Result<(), ProgressionServiceError> {
        let state = self.repo.load().await.inspect_err(|err| {
            warn!("load failed: {err}");
        })?;
        self.state = state;
        if self.selected.is_some_and(|stage| self.state.is_unlocked(stage) != Some(true)) {
            self.selected = None;
        }
        self.notify_loaded();
        Ok(())
    }

    /// Spend keys on a locked stage.
    pub fn unlock_stage(&mut self, stage: StageIndex) -> UnlockOutcome {
        let outcome = unlock::try_unlock_with_cost(&self.state, stage, self.stage_cost);
        match &outcome {
            UnlockOutcome::Unlocked(next) => {
                self.state = next.clone();
                info!("stage {} unlocked, {} keys left", stage.ordinal(), self.state.keys());
                self.presenter.notify(&HubEvent::KeysChanged {
                    keys: self.state.keys(),
                });
                self.presenter.notify(&HubEvent::StageUnlocked(stage));
            }
            rejected => warn!("unlock of stage {stage} rejected: {rejected:?}"),
        }
        outcome
    }

    /// Choose the stage the next session will play.
    pub fn select_stage(&mut self, stage: StageIndex) -> SelectOutcome {
        let outcome = unlock::select_stage(&self.state, stage);
        match outcome {
            SelectOutcome::Selected(stage) => {
                self.selected = Some(stage);
                self.presenter.notify(&HubEvent::StageSelected(stage));
            }
            rejected => warn!("selection of stage {stage} rejected: {rejected:?}"),
        }
        outcome
    }

    pub fn claim_reward(&mut self, coins: u32) {
        self.state.claim_reward(coins);
        self.presenter.notify(&HubEvent::CoinsChanged {
            coins: self.state.coins(),
        });
    }

    /// Apply a finished session's score. Returns the keys awarded.
    pub(crate) fn record_score(
        &mut self,
        stage: StageIndex,
        score: u32,
    ) -> Result<u32, ProgressionError> {
        let awarded = self.state.apply_score(stage, score)?;
        self.presenter.notify(&HubEvent::KeysChanged {
            keys: self.state.keys(),
        });
        Ok(awarded)
    }

    fn notify_loaded(&self) {
        self.presenter.notify(&HubEvent::ProgressionLoaded {
            keys: self.state.keys(),
            coins: self.state.coins(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::RecordingPresenter;
    use storage::InMemoryRepository;

    fn service_with(
        repo: &InMemoryRepository,
        state: ProgressionState,
    ) -> (ProgressionService, RecordingPresenter) {
        let presenter = RecordingPresenter::new();
        let service = ProgressionService::new(
            Arc::new(repo.clone()),
            Arc::new(presenter.clone()),
            state,
            unlock::STAGE_COST,
        );
        (service, presenter)
    }

    #[tokio::test]
    async fn open_defaults_when_no_snapshot() {
        let repo = InMemoryRepository::new();
        let service = ProgressionService::open(
            Arc::new(repo),
            Arc::new(RecordingPresenter::new()),
            &HubConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(service.state(), &ProgressionState::new(3));
    }

    #[tokio::test]
    async fn open_surfaces_storage_failures() {
        let repo = InMemoryRepository::new();
        repo.set_unavailable(true);
        let result = ProgressionService::open(
            Arc::new(repo),
            Arc::new(RecordingPresenter::new()),
            &HubConfig::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(ProgressionServiceError::PersistenceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn changes_persist_only_on_save() {
        let repo = InMemoryRepository::new();
        let (mut service, _) = service_with(&repo, ProgressionState::new(2).with_keys(15));
        assert!(service.unlock_stage(StageIndex::new(0)).is_unlocked());
        assert!(repo.record().is_none());

        service.save().await.unwrap();
        let record = repo.record().unwrap();
        assert_eq!(record.key, 5);
        assert_eq!(record.games, vec![true, false]);
    }

    #[tokio::test]
    async fn failed_save_keeps_memory_state() {
        let repo = InMemoryRepository::new();
        let (mut service, _) = service_with(&repo, ProgressionState::new(1).with_keys(10));
        service.unlock_stage(StageIndex::new(0));
        repo.set_unavailable(true);

        assert!(service.save().await.is_err());
        assert_eq!(service.state().keys(), 0);
        assert_eq!(service.state().is_unlocked(StageIndex::new(0)), Some(true));
    }

    #[tokio::test]
    async fn reload_failure_keeps_memory_state() {
        let repo = InMemoryRepository::new();
        let (mut service, _) = service_with(&repo, ProgressionState::new(1).with_keys(7));
        assert!(service.reload().await.is_err());
        assert_eq!(service.state().keys(), 7);
    }

    #[tokio::test]
    async fn reload_drops_selection_of_now_locked_stage() {
        let repo = InMemoryRepository::with_state(&ProgressionState::new(2));
        let unlocked = ProgressionState::from_persisted(0, 0, vec![true, false], vec![0, 0]).unwrap();
        let (mut service, _) = service_with(&repo, unlocked);
        service.select_stage(StageIndex::new(0));
        service.reload().await.unwrap();
        assert_eq!(service.selected_stage(), None);
    }

    #[test]
    fn unlock_scenario_from_fifteen_keys() {
        let repo = InMemoryRepository::new();
        let (mut service, presenter) = service_with(&repo, ProgressionState::new(3).with_keys(15));

        assert!(service.unlock_stage(StageIndex::new(0)).is_unlocked());
        assert_eq!(service.state().keys(), 5);

        let before = service.state().clone();
        let outcome = service.unlock_stage(StageIndex::new(1));
        assert_eq!(outcome, UnlockOutcome::InsufficientFunds { keys: 5, cost: 10 });
        assert_eq!(service.state(), &before);

        assert_eq!(
            presenter.events(),
            vec![
                HubEvent::KeysChanged { keys: 5 },
                HubEvent::StageUnlocked(StageIndex::new(0)),
            ]
        );
    }

    #[test]
    fn select_only_records_unlocked_stage() {
        let repo = InMemoryRepository::new();
        let state = ProgressionState::from_persisted(0, 0, vec![false, true], vec![0, 0]).unwrap();
        let (mut service, _) = service_with(&repo, state);

        assert_eq!(service.select_stage(StageIndex::new(0)), SelectOutcome::Locked);
        assert_eq!(service.selected_stage(), None);
        assert_eq!(
            service.select_stage(StageIndex::new(1)),
            SelectOutcome::Selected(StageIndex::new(1))
        );
        assert_eq!(service.selected_stage(), Some(StageIndex::new(1)));
        assert_eq!(service.state().keys(), 0);
    }

    #[test]
    fn claim_reward_notifies_coin_total() {
        let repo = InMemoryRepository::new();
        let (mut service, presenter) = service_with(&repo, ProgressionState::new(1));
        service.claim_reward(12);
        assert_eq!(presenter.events(), vec![HubEvent::CoinsChanged { coins: 12 }]);
    }
}
