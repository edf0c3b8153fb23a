//! Stage purchase and selection rules.
//!
//! Both decisions are pure: they read a `ProgressionState` and report an
//! outcome value. Only a successful unlock carries a new state.

use crate::model::{ProgressionState, StageIndex};

/// Keys charged to unlock one stage.
pub const STAGE_COST: u32 = 10;

/// Result of an unlock attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked(ProgressionState),
    AlreadyUnlocked,
    InsufficientFunds { keys: u32, cost: u32 },
    InvalidIndex,
}

impl UnlockOutcome {
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        matches!(self, UnlockOutcome::Unlocked(_))
    }
}

/// Result of choosing a stage to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected(StageIndex),
    Locked,
    InvalidIndex,
}

/// Unlock `stage` at the standard `STAGE_COST`.
#[must_use]
pub fn try_unlock(state: &ProgressionState, stage: StageIndex) -> UnlockOutcome {
    try_unlock_with_cost(state, stage, STAGE_COST)
}

/// Unlock `stage`, charging `cost` keys.
///
/// Checks run in order: range, already unlocked, funds.
#[must_use]
pub fn try_unlock_with_cost(
    state: &ProgressionState,
    stage: StageIndex,
    cost: u32,
) -> UnlockOutcome {
    match state.is_unlocked(stage) {
        None => UnlockOutcome::InvalidIndex,
        Some(true) => UnlockOutcome::AlreadyUnlocked,
        Some(false) if state.keys() < cost => UnlockOutcome::InsufficientFunds {
            keys: state.keys(),
            cost,
        },
        Some(false) => {
            let mut next = state.clone();
            next.spend_and_unlock(stage, cost);
            UnlockOutcome::Unlocked(next)
        }
    }
}

/// Pick an unlocked stage for play. Never spends currency.
#[must_use]
pub fn select_stage(state: &ProgressionState, stage: StageIndex) -> SelectOutcome {
    match state.is_unlocked(stage) {
        None => SelectOutcome::InvalidIndex,
        Some(false) => SelectOutcome::Locked,
        Some(true) => SelectOutcome::Selected(stage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(i: usize) -> StageIndex {
        StageIndex::new(i)
    }

    #[test]
    fn unlock_charges_cost_once() {
        let state = ProgressionState::new(3).with_keys(15);

        let UnlockOutcome::Unlocked(state) = try_unlock(&state, stage(0)) else {
            panic!("expected unlock");
        };
        assert_eq!(state.keys(), 5);
        assert_eq!(state.is_unlocked(stage(0)), Some(true));

        let outcome = try_unlock(&state, stage(1));
        assert_eq!(outcome, UnlockOutcome::InsufficientFunds { keys: 5, cost: 10 });
        assert_eq!(state.keys(), 5);
        assert_eq!(state.is_unlocked(stage(1)), Some(false));
    }

    #[test]
    fn second_unlock_of_same_stage_is_free_noop() {
        let state = ProgressionState::new(2).with_keys(30);
        let UnlockOutcome::Unlocked(state) = try_unlock(&state, stage(1)) else {
            panic!("expected unlock");
        };
        assert_eq!(try_unlock(&state, stage(1)), UnlockOutcome::AlreadyUnlocked);
        assert_eq!(state.keys(), 20);
    }

    #[test]
    fn range_check_comes_first() {
        let state = ProgressionState::new(2);
        assert_eq!(try_unlock(&state, stage(2)), UnlockOutcome::InvalidIndex);
    }

    #[test]
    fn already_unlocked_wins_over_insufficient_funds() {
        let state = ProgressionState::from_persisted(0, 0, vec![true], vec![0]).unwrap();
        assert_eq!(try_unlock(&state, stage(0)), UnlockOutcome::AlreadyUnlocked);
    }

    #[test]
    fn exact_funds_are_enough() {
        let state = ProgressionState::new(1).with_keys(10);
        let UnlockOutcome::Unlocked(state) = try_unlock(&state, stage(0)) else {
            panic!("expected unlock");
        };
        assert_eq!(state.keys(), 0);
    }

    #[test]
    fn custom_cost_is_respected() {
        let state = ProgressionState::new(1).with_keys(4);
        assert!(try_unlock_with_cost(&state, stage(0), 4).is_unlocked());
        assert!(!try_unlock_with_cost(&state, stage(0), 5).is_unlocked());
    }

    #[test]
    fn unlock_never_drives_keys_negative() {
        for keys in 0..40 {
            let mut state = ProgressionState::new(4).with_keys(keys);
            for i in 0..4 {
                if let UnlockOutcome::Unlocked(next) = try_unlock(&state, stage(i)) {
                    assert_eq!(next.keys() + STAGE_COST, state.keys());
                    state = next;
                }
            }
            let unlocked = state.stage_unlocked().iter().filter(|u| **u).count() as u32;
            assert_eq!(state.keys(), keys - unlocked * STAGE_COST);
        }
    }

    #[test]
    fn select_requires_unlock() {
        let state = ProgressionState::from_persisted(0, 0, vec![false, true], vec![0, 0]).unwrap();
        assert_eq!(select_stage(&state, stage(0)), SelectOutcome::Locked);
        assert_eq!(select_stage(&state, stage(1)), SelectOutcome::Selected(stage(1)));
        assert_eq!(select_stage(&state, stage(5)), SelectOutcome::InvalidIndex);
    }
}
