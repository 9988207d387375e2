//! Pure state transitions
//!
//! The ledger's read-modify-write cycle delegates every change to these
//! functions, so they can be tested without storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AlgoConfig;
use crate::letter::Letter;
use crate::types::{
    AttemptRecord, CorrectStreaks, CurriculumSet, Difficulty, MasteryState, Mode, WrongCounts,
    STATE_VERSION,
};

/// Partial update merged into the current state
///
/// Scalars replace, `wrongCounts` and `correctStreaks` merge per letter, and
/// `attemptLog` replaces the log only when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flawless_streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrong_counts: Option<WrongCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_streaks: Option<CorrectStreaks>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "audioSet")]
    pub curriculum_set: Option<CurriculumSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_letter_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_log: Option<Vec<AttemptRecord>>,
}

impl From<&MasteryState> for StateUpdate {
    fn from(state: &MasteryState) -> Self {
        Self {
            mode: Some(state.mode),
            unlocked: Some(state.unlocked),
            flawless_streak: Some(state.flawless_streak),
            wrong_counts: Some(state.wrong_counts.clone()),
            correct_streaks: Some(state.correct_streaks.clone()),
            curriculum_set: Some(state.curriculum_set),
            difficulty: Some(state.difficulty),
            free_letter_count: Some(state.free_letter_count),
            attempt_log: Some(state.attempt_log.clone()),
        }
    }
}

/// Merge `update` into a copy of `state`
pub fn reduce(state: &MasteryState, update: &StateUpdate, config: &AlgoConfig) -> MasteryState {
    let mut next = state.clone();
    next.version = STATE_VERSION;

    if let Some(mode) = update.mode {
        next.mode = mode;
    }
    if let Some(unlocked) = update.unlocked {
        next.unlocked = crate::progression::snap_unlocked(unlocked as i64, config);
    }
    if let Some(streak) = update.flawless_streak {
        next.flawless_streak = streak;
    }
    if let Some(counts) = &update.wrong_counts {
        for (&letter, &count) in counts {
            next.wrong_counts.insert(letter, count.min(config.wrong_count_cap));
        }
    }
    if let Some(streaks) = &update.correct_streaks {
        next.correct_streaks.extend(streaks.iter().map(|(&l, &c)| (l, c)));
    }
    if let Some(set) = update.curriculum_set {
        next.curriculum_set = set;
    }
    if let Some(difficulty) = update.difficulty {
        next.difficulty = difficulty;
    }
    if let Some(count) = update.free_letter_count {
        next.free_letter_count = count.clamp(1, config.letter_limit());
    }
    if let Some(log) = &update.attempt_log {
        next.attempt_log = log.clone();
        truncate_log(&mut next.attempt_log, config.attempt_log_limit);
    }

    next
}

fn truncate_log(log: &mut Vec<AttemptRecord>, limit: usize) {
    if log.len() > limit {
        log.drain(..log.len() - limit);
    }
}

fn append_attempt(
    state: &mut MasteryState,
    target: Letter,
    chosen: Option<Letter>,
    correct: bool,
    at: DateTime<Utc>,
    config: &AlgoConfig,
) {
    state.attempt_log.push(AttemptRecord {
        target,
        chosen,
        correct,
        at,
    });
    truncate_log(&mut state.attempt_log, config.attempt_log_limit);
}

/// A correct answer for `target`
///
/// Two correct answers in a row decay a non-zero wrong count by one and
/// restart the streak.
pub fn apply_correct(
    state: &MasteryState,
    target: Letter,
    chosen: Option<Letter>,
    at: DateTime<Utc>,
    config: &AlgoConfig,
) -> MasteryState {
    let mut next = state.clone();
    append_attempt(&mut next, target, chosen, true, at, config);

    let streak = next.correct_streak(target) + 1;
    next.correct_streaks.insert(target, streak);

    let wrong = next.wrong_count(target);
    if wrong > 0 && streak >= config.decay_streak {
        next.wrong_counts.insert(target, wrong - 1);
        next.correct_streaks.insert(target, 0);
    }

    next
}

/// A wrong answer for `target`: streak reset, wrong count up to the cap
pub fn apply_wrong(
    state: &MasteryState,
    target: Letter,
    chosen: Option<Letter>,
    at: DateTime<Utc>,
    config: &AlgoConfig,
) -> MasteryState {
    let mut next = state.clone();
    append_attempt(&mut next, target, chosen, false, at, config);

    next.correct_streaks.insert(target, 0);
    let wrong = (next.wrong_count(target) + 1).min(config.wrong_count_cap);
    next.wrong_counts.insert(target, wrong);

    next
}
