//! Progression Tracker
//!
//! Ratchets the guided path forward after each run:
//! - A failed run resets the flawless streak and changes nothing else
//! - Two flawless runs in a row unlock one more tier of letters
//! - Two flawless runs with the full alphabet unlocked move on to the next
//!   curriculum and restart the letter ramp at the first tier
//!
//! The tracker works on copies. It returns the proposed state and leaves
//! persisting it to the mastery ledger.

mod result;

pub use result::RunResult;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::AlgoConfig;
use crate::error::AlgoResult;
use crate::ledger::repair_state;
use crate::types::MasteryState;

/// Where a state sits on the guided path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathProgress {
    /// Unlocked letters snapped to a tier
    pub unlocked: u32,
    /// One-based tier index
    pub step: usize,
    pub step_total: usize,
    pub percent: u32,
    /// Flawless runs still needed before the next unlock
    pub rounds_remaining: u32,
    pub at_final_stage: bool,
    pub next_tier: u32,
    pub flawless: u32,
}

/// Snap an unlock count to a tier boundary within [step, max]
///
/// Values between boundaries round up to the next boundary, never past the
/// maximum.
pub fn snap_unlocked(value: i64, config: &AlgoConfig) -> u32 {
    let step = config.tier_step() as i64;
    let max = config.letter_limit() as i64;

    if value <= 0 {
        return step as u32;
    }
    if value >= max {
        return max as u32;
    }

    let remainder = value % step;
    let snapped = if remainder == 0 { value } else { value - remainder + step };
    snapped.clamp(step, max) as u32
}

#[derive(Debug, Clone, Default)]
pub struct ProgressionTracker {
    config: AlgoConfig,
}

impl ProgressionTracker {
    pub fn new(config: AlgoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlgoConfig {
        &self.config
    }

    /// Snap an unlock count to a tier boundary, see [`snap_unlocked`]
    pub fn clamp_unlocked(&self, value: i64) -> u32 {
        snap_unlocked(value, &self.config)
    }

    /// Apply the tier clamp to a state copy
    pub fn normalise_state(&self, state: &MasteryState) -> MasteryState {
        let mut next = state.clone();
        next.unlocked = self.clamp_unlocked(state.unlocked as i64);
        next
    }

    /// Fold one run's outcome into the mastery state
    ///
    /// Fails when the result carries no success signal.
    pub fn advance_after_run(
        &self,
        result: &RunResult,
        state: &MasteryState,
    ) -> AlgoResult<MasteryState> {
        let success = result.is_success()?;
        let mut next = self.normalise_state(state);

        if !success {
            if next.flawless_streak > 0 {
                debug!(streak = next.flawless_streak, "run failed, flawless streak reset");
            }
            next.flawless_streak = 0;
            return Ok(next);
        }

        next.flawless_streak += 1;
        let required = self.config.flawless_runs_to_unlock;
        let step = self.config.tier_step();
        let max = self.config.letter_limit();
        let at_max = next.unlocked >= max;

        if next.flawless_streak < required {
            return Ok(next);
        }

        match next.curriculum_set.next() {
            Some(harder) if at_max => {
                info!(
                    from = next.curriculum_set.as_str(),
                    to = harder.as_str(),
                    "curriculum mastered, restarting letter ramp"
                );
                next.curriculum_set = harder;
                next.unlocked = step;
            }
            _ => {
                let unlocked = (next.unlocked + step).min(max);
                if unlocked != next.unlocked {
                    info!(from = next.unlocked, to = unlocked, "unlocked more letters");
                }
                next.unlocked = unlocked;
            }
        }
        next.flawless_streak = 0;

        Ok(next)
    }

    /// [`advance_after_run`](Self::advance_after_run) over loosely typed JSON
    ///
    /// The result must be an object; the state is repaired against defaults.
    pub fn advance_after_run_json(&self, result: &Value, state: &Value) -> AlgoResult<MasteryState> {
        let result = RunResult::from_value(result)?;
        let state = repair_state(state, &self.config);
        self.advance_after_run(&result, &state)
    }

    /// Position on the guided path for progress displays
    pub fn path_progress(&self, state: &MasteryState) -> PathProgress {
        let tiers = self.config.unlock_tiers();
        let raw = state.unlocked;

        let unlocked = if tiers.contains(&raw) {
            raw
        } else {
            tiers.iter().copied().find(|&t| t > raw).unwrap_or(tiers[0])
        };

        let index = tiers.iter().position(|&t| t == unlocked).unwrap_or(0);
        let step = index + 1;
        let step_total = tiers.len();
        let percent = ((step as f64 / step_total as f64) * 100.0).round().min(100.0) as u32;
        let next_tier = tiers.get(index + 1).copied().unwrap_or(tiers[index]);

        PathProgress {
            unlocked,
            step,
            step_total,
            percent,
            rounds_remaining: self
                .config
                .flawless_runs_to_unlock
                .saturating_sub(state.flawless_streak),
            at_final_stage: step >= step_total,
            next_tier,
            flawless: state.flawless_streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CurriculumSet;
    use serde_json::json;

    fn state(unlocked: u32, flawless: u32, set: CurriculumSet) -> MasteryState {
        MasteryState {
            unlocked,
            flawless_streak: flawless,
            curriculum_set: set,
            ..MasteryState::default()
        }
    }

    #[test]
    fn test_failure_resets_streak_keeps_unlocked() {
        let tracker = ProgressionTracker::default();
        let next = tracker
            .advance_after_run(&RunResult::failed(), &state(12, 1, CurriculumSet::Primary))
            .unwrap();
        assert_eq!(next.unlocked, 12);
        assert_eq!(next.flawless_streak, 0);
        assert_eq!(next.curriculum_set, CurriculumSet::Primary);
    }

    #[test]
    fn test_second_success_unlocks_step() {
        let tracker = ProgressionTracker::default();
        let next = tracker
            .advance_after_run(&RunResult::passed(), &state(8, 1, CurriculumSet::Primary))
            .unwrap();
        assert_eq!(next.unlocked, 12);
        assert_eq!(next.flawless_streak, 0);
    }

    #[test]
    fn test_first_success_only_increments_streak() {
        let tracker = ProgressionTracker::default();
        let next = tracker
            .advance_after_run(&RunResult::with_mistakes(0), &state(8, 0, CurriculumSet::Primary))
            .unwrap();
        assert_eq!(next.unlocked, 8);
        assert_eq!(next.flawless_streak, 1);
    }

    #[test]
    fn test_full_alphabet_switches_curriculum() {
        let tracker = ProgressionTracker::default();
        let next = tracker
            .advance_after_run(&RunResult::passed(), &state(26, 1, CurriculumSet::Primary))
            .unwrap();
        assert_eq!(next.curriculum_set, CurriculumSet::Secondary);
        assert_eq!(next.unlocked, 4);
        assert_eq!(next.flawless_streak, 0);
    }

    #[test]
    fn test_progression_continues_in_secondary() {
        let tracker = ProgressionTracker::default();
        let next = tracker
            .advance_after_run(&RunResult::passed(), &state(4, 1, CurriculumSet::Secondary))
            .unwrap();
        assert_eq!(next.unlocked, 8);
        assert_eq!(next.curriculum_set, CurriculumSet::Secondary);
    }

    #[test]
    fn test_last_curriculum_at_max_stays_put() {
        let tracker = ProgressionTracker::default();
        let next = tracker
            .advance_after_run(&RunResult::passed(), &state(26, 1, CurriculumSet::Secondary))
            .unwrap();
        assert_eq!(next.unlocked, 26);
        assert_eq!(next.flawless_streak, 0);
        assert_eq!(next.curriculum_set, CurriculumSet::Secondary);
    }

    #[test]
    fn test_step_before_max_caps_at_max() {
        let tracker = ProgressionTracker::default();
        let next = tracker
            .advance_after_run(&RunResult::passed(), &state(24, 1, CurriculumSet::Primary))
            .unwrap();
        assert_eq!(next.unlocked, 26);
        assert_eq!(next.curriculum_set, CurriculumSet::Primary);
    }

    #[test]
    fn test_non_multiple_rounds_up() {
        let tracker = ProgressionTracker::default();
        let next = tracker
            .advance_after_run(&RunResult::failed(), &state(5, 0, CurriculumSet::Primary))
            .unwrap();
        assert_eq!(next.unlocked, 8);

        let passed = tracker
            .advance_after_run(&RunResult::with_mistakes(0), &state(5, 0, CurriculumSet::Primary))
            .unwrap();
        assert_eq!(passed.unlocked, 8);
        assert_eq!(passed.flawless_streak, 1);
    }

    #[test]
    fn test_clamp_unlocked_bounds() {
        let tracker = ProgressionTracker::default();
        assert_eq!(tracker.clamp_unlocked(-3), 4);
        assert_eq!(tracker.clamp_unlocked(0), 4);
        assert_eq!(tracker.clamp_unlocked(1), 4);
        assert_eq!(tracker.clamp_unlocked(4), 4);
        assert_eq!(tracker.clamp_unlocked(9), 12);
        assert_eq!(tracker.clamp_unlocked(25), 26);
        assert_eq!(tracker.clamp_unlocked(26), 26);
        assert_eq!(tracker.clamp_unlocked(400), 26);
    }

    #[test]
    fn test_missing_signal_errors() {
        let tracker = ProgressionTracker::default();
        assert!(tracker
            .advance_after_run(&RunResult::default(), &MasteryState::default())
            .is_err());
        assert!(tracker.advance_after_run_json(&json!({}), &json!({})).is_err());
        assert!(tracker.advance_after_run_json(&json!(3), &json!({})).is_err());
    }

    #[test]
    fn test_json_entry_point_repairs_state() {
        let tracker = ProgressionTracker::default();
        let next = tracker
            .advance_after_run_json(
                &json!({"mistakes": 0}),
                &json!({"unlocked": 5, "flawlessStreak": 0}),
            )
            .unwrap();
        assert_eq!(next.unlocked, 8);
        assert_eq!(next.flawless_streak, 1);

        let legacy = tracker
            .advance_after_run_json(
                &json!({"success": true}),
                &json!({"unlocked": 26, "flawlessStreak": 1, "audioSet": "ANLAUT"}),
            )
            .unwrap();
        assert_eq!(legacy.curriculum_set, CurriculumSet::Secondary);
        assert_eq!(legacy.unlocked, 4);
    }

    #[test]
    fn test_custom_step() {
        let config = AlgoConfig { unlock_step: 5, max_letters: 20, ..AlgoConfig::default() };
        let tracker = ProgressionTracker::new(config);
        assert_eq!(tracker.clamp_unlocked(7), 10);
        let next = tracker
            .advance_after_run(&RunResult::passed(), &state(15, 1, CurriculumSet::Primary))
            .unwrap();
        assert_eq!(next.unlocked, 20);
    }

    #[test]
    fn test_step_past_max_stays_on_full_tier() {
        let config = AlgoConfig { unlock_step: 30, ..AlgoConfig::default() };
        let tracker = ProgressionTracker::new(config);
        assert_eq!(tracker.clamp_unlocked(10), 26);

        let once = tracker
            .advance_after_run(&RunResult::passed(), &state(10, 0, CurriculumSet::Primary))
            .unwrap();
        assert_eq!(once.unlocked, 26);
        let twice = tracker.advance_after_run(&RunResult::passed(), &once).unwrap();
        assert_eq!(twice.unlocked, 26);
        assert_eq!(twice.curriculum_set, CurriculumSet::Secondary);
    }

    #[test]
    fn test_zero_max_letters_does_not_panic() {
        let config = AlgoConfig { max_letters: 0, ..AlgoConfig::default() };
        let tracker = ProgressionTracker::new(config);
        assert_eq!(tracker.clamp_unlocked(9), 1);
        let next = tracker
            .advance_after_run(&RunResult::passed(), &state(4, 1, CurriculumSet::Primary))
            .unwrap();
        assert_eq!(next.unlocked, 1);
    }

    #[test]
    fn test_path_progress() {
        let tracker = ProgressionTracker::default();
        let meta = tracker.path_progress(&state(8, 1, CurriculumSet::Primary));
        assert_eq!(meta.step, 2);
        assert_eq!(meta.step_total, 7);
        assert_eq!(meta.percent, 29);
        assert_eq!(meta.rounds_remaining, 1);
        assert_eq!(meta.next_tier, 12);
        assert!(!meta.at_final_stage);

        let snapped = tracker.path_progress(&state(9, 0, CurriculumSet::Primary));
        assert_eq!(snapped.unlocked, 12);
        assert_eq!(snapped.rounds_remaining, 2);

        let done = tracker.path_progress(&state(26, 0, CurriculumSet::Primary));
        assert!(done.at_final_stage);
        assert_eq!(done.percent, 100);
        assert_eq!(done.next_tier, 26);
    }
}
