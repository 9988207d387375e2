//! Mastery Ledger
//!
//! Owns the persisted [`MasteryState`]. Every mutation is one
//! read-modify-write against the injected [`ProgressStore`]:
//! - read and repair the stored record
//! - apply a pure reducer from [`reduce`](self::reduce)
//! - serialize and write back
//!
//! The ledger never returns an error. Bad letters make a call a no-op,
//! malformed records are repaired, and storage failures are logged while an
//! in-memory copy keeps the session going.

mod reduce;
mod repair;

pub use reduce::{apply_correct, apply_wrong, reduce, StateUpdate};
pub use repair::repair_state;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AlgoConfig;
use crate::letter::{normalise_letter, normalise_list, Letter};
use crate::store::{ProgressStore, PROGRESS_KEY};
use crate::types::MasteryState;

pub struct MasteryLedger<S: ProgressStore> {
    store: S,
    config: AlgoConfig,
    /// Last state seen or written, served when the store is unreadable
    fallback: Mutex<Option<MasteryState>>,
}

impl<S: ProgressStore> MasteryLedger<S> {
    pub fn new(store: S, config: AlgoConfig) -> Self {
        Self {
            store,
            config,
            fallback: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AlgoConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ==================== Read / Write ====================

    fn defaults(&self) -> MasteryState {
        repair_state(&Value::Null, &self.config)
    }

    fn read_state(&self) -> MasteryState {
        let state = match self.store.get(PROGRESS_KEY) {
            Ok(Some(text)) => match serde_json::from_str::<Value>(&text) {
                Ok(raw) => repair_state(&raw, &self.config),
                Err(e) => {
                    warn!(error = %e, "stored progress is not valid JSON, using defaults");
                    self.defaults()
                }
            },
            Ok(None) => self.defaults(),
            Err(e) => {
                warn!(error = %e, "failed to read progress, using in-memory copy");
                return self.fallback.lock().clone().unwrap_or_else(|| self.defaults());
            }
        };
        *self.fallback.lock() = Some(state.clone());
        state
    }

    fn write_state(&self, state: MasteryState) -> MasteryState {
        match serde_json::to_string(&state) {
            Ok(payload) => {
                if let Err(e) = self.store.set(PROGRESS_KEY, &payload) {
                    warn!(error = %e, "failed to persist progress, keeping in-memory copy");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize progress"),
        }
        *self.fallback.lock() = Some(state.clone());
        state
    }

    // ==================== Operations ====================

    /// Current state, repaired against defaults
    pub fn get_progress(&self) -> MasteryState {
        self.read_state()
    }

    /// Merge a partial update and persist the result
    pub fn save_progress(&self, update: &StateUpdate) -> MasteryState {
        self.update(|state, _, config| reduce(state, update, config))
    }

    /// Replace the stored record with defaults
    pub fn reset_progress(&self) -> MasteryState {
        debug!("progress reset to defaults");
        self.write_state(self.defaults())
    }

    /// Record a correct answer, see [`apply_correct`]
    ///
    /// Unreadable letters leave the state untouched.
    pub fn mark_correct(&self, target: &str, chosen: &str) -> MasteryState {
        match (normalise_letter(target), normalise_letter(chosen)) {
            (Some(target), Some(chosen)) => self.update(|state, at, config| {
                apply_correct(state, target, Some(chosen), at, config)
            }),
            _ => {
                debug!(raw_target = target, raw_chosen = chosen, "ignoring answer with unreadable letter");
                self.read_state()
            }
        }
    }

    /// Record a wrong answer, see [`apply_wrong`]
    pub fn mark_wrong(&self, target: &str, chosen: &str) -> MasteryState {
        match (normalise_letter(target), normalise_letter(chosen)) {
            (Some(target), Some(chosen)) => self.update(|state, at, config| {
                apply_wrong(state, target, Some(chosen), at, config)
            }),
            _ => {
                debug!(raw_target = target, raw_chosen = chosen, "ignoring answer with unreadable letter");
                self.read_state()
            }
        }
    }

    /// Mark several letters wrong in one write
    ///
    /// Unreadable entries are skipped; the attempts carry no chosen letter.
    pub fn mark_wrong_many<T: AsRef<str>>(&self, targets: &[T]) -> MasteryState {
        let targets = normalise_list(targets);
        if targets.is_empty() {
            return self.read_state();
        }

        self.update(|state, at, config| {
            targets
                .iter()
                .fold(state.clone(), |acc, &target| apply_wrong(&acc, target, None, at, config))
        })
    }

    /// Record an already-normalized answer; correct when `chosen == target`
    pub fn record_answer(&self, target: Letter, chosen: Letter) -> MasteryState {
        self.update(|state, at, config| {
            if target == chosen {
                apply_correct(state, target, Some(chosen), at, config)
            } else {
                apply_wrong(state, target, Some(chosen), at, config)
            }
        })
    }

    fn update<F>(&self, f: F) -> MasteryState
    where
        F: FnOnce(&MasteryState, DateTime<Utc>, &AlgoConfig) -> MasteryState,
    {
        let current = self.read_state();
        self.write_state(f(&current, Utc::now(), &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letter::letters;
    use crate::store::{MemoryStore, StorageError, StorageResult};
    use crate::types::{CurriculumSet, Mode};

    fn ledger() -> MasteryLedger<MemoryStore> {
        MasteryLedger::new(MemoryStore::new(), AlgoConfig::default())
    }

    struct BrokenStore;

    impl ProgressStore for BrokenStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Io(std::io::Error::other("disk gone")))
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Io(std::io::Error::other("disk gone")))
        }

        fn clear(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fresh_ledger_returns_defaults() {
        let ledger = ledger();
        assert_eq!(ledger.get_progress(), MasteryState::default());
        assert!(ledger.store().is_empty());
    }

    #[test]
    fn test_mark_correct_twice_decays() {
        let ledger = ledger();
        ledger.mark_wrong("b", "c");
        let state = ledger.mark_correct("B", "B");
        let b = letters("B")[0];
        assert_eq!(state.wrong_count(b), 1);
        assert_eq!(state.correct_streak(b), 1);

        let state = ledger.mark_correct(" b ", "b");
        assert_eq!(state.wrong_count(b), 0);
        assert_eq!(state.correct_streak(b), 0);
        assert_eq!(ledger.get_progress().attempt_log.len(), 3);
    }

    #[test]
    fn test_mark_wrong_caps_at_three() {
        let ledger = ledger();
        for _ in 0..5 {
            ledger.mark_wrong("Q", "O");
        }
        let q = letters("Q")[0];
        assert_eq!(ledger.get_progress().wrong_count(q), 3);
    }

    #[test]
    fn test_bad_letters_are_noops() {
        let ledger = ledger();
        ledger.mark_wrong("A", "B");
        let before = ledger.get_progress();

        assert_eq!(ledger.mark_correct("", "A"), before);
        assert_eq!(ledger.mark_wrong("7", "A"), before);
        assert_eq!(ledger.mark_wrong("A", "??"), before);
        assert_eq!(ledger.mark_wrong_many(&["", "%"]), before);
        assert_eq!(ledger.get_progress(), before);
    }

    #[test]
    fn test_mark_wrong_many_skips_invalid() {
        let ledger = ledger();
        let state = ledger.mark_wrong_many(&["a", "", "c", "A"]);
        let l = letters("A C");
        assert_eq!(state.wrong_count(l[0]), 1);
        assert_eq!(state.wrong_count(l[1]), 1);
        assert_eq!(state.attempt_log.len(), 2);
        assert!(state.attempt_log.iter().all(|a| a.chosen.is_none()));
    }

    #[test]
    fn test_save_progress_merges() {
        let ledger = ledger();
        ledger.mark_wrong("A", "B");
        let state = ledger.save_progress(&StateUpdate {
            mode: Some(Mode::Path),
            unlocked: Some(12),
            ..StateUpdate::default()
        });
        assert_eq!(state.mode, Mode::Path);
        assert_eq!(state.unlocked, 12);
        assert_eq!(state.wrong_count(letters("A")[0]), 1);
        assert_eq!(state.attempt_log.len(), 1);
        assert_eq!(ledger.get_progress(), state);
    }

    #[test]
    fn test_reset_progress() {
        let ledger = ledger();
        ledger.save_progress(&StateUpdate {
            curriculum_set: Some(CurriculumSet::Secondary),
            ..StateUpdate::default()
        });
        let state = ledger.reset_progress();
        assert_eq!(state, MasteryState::default());
        assert_eq!(ledger.get_progress(), MasteryState::default());
    }

    #[test]
    fn test_corrupt_record_is_repaired() {
        let ledger = ledger();
        ledger.store().set(PROGRESS_KEY, "{not json").unwrap();
        assert_eq!(ledger.get_progress(), MasteryState::default());

        ledger
            .store()
            .set(PROGRESS_KEY, r#"{"unlocked": 7, "audioSet": "OHNE_ANLAUT"}"#)
            .unwrap();
        let state = ledger.get_progress();
        assert_eq!(state.unlocked, 8);
        assert_eq!(state.curriculum_set, CurriculumSet::Secondary);
    }

    #[test]
    fn test_broken_store_keeps_in_memory_copy() {
        let ledger = MasteryLedger::new(BrokenStore, AlgoConfig::default());
        let state = ledger.mark_wrong("A", "B");
        assert_eq!(state.wrong_count(letters("A")[0]), 1);

        let state = ledger.mark_wrong("A", "C");
        assert_eq!(state.wrong_count(letters("A")[0]), 2);
        assert_eq!(ledger.get_progress().attempt_log.len(), 2);
    }

    #[test]
    fn test_unvalidated_config_never_panics() {
        let config = AlgoConfig { unlock_step: 30, max_letters: 0, ..AlgoConfig::default() };
        let ledger = MasteryLedger::new(MemoryStore::new(), config);
        let state = ledger.save_progress(&StateUpdate {
            unlocked: Some(10),
            free_letter_count: Some(40),
            ..StateUpdate::default()
        });
        assert_eq!(state.unlocked, 1);
        assert_eq!(state.free_letter_count, 1);
        assert_eq!(ledger.mark_wrong("A", "B").wrong_count(letters("A")[0]), 1);
    }
}
