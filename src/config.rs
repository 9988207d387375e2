//! Tunable Constants
//!
//! Content designers retune difficulty through these values; the defaults
//! match the shipped curriculum.

use serde::{Deserialize, Serialize};

use crate::error::{AlgoError, AlgoResult};
use crate::letter::ALPHABET;
use crate::types::{
    ATTEMPT_LOG_LIMIT, DEFAULT_OPTION_COUNT, MAX_LETTERS, MAX_WEIGHT, RECENT_DEPTH, UNLOCK_STEP,
    WRONG_COUNT_CAP,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlgoConfig {
    /// Letters unlocked per tier
    pub unlock_step: u32,
    /// Size of the full alphabet tier
    pub max_letters: u32,
    /// Upper bound of a candidate's selection weight
    pub max_weight: u32,
    /// Upper bound of a letter's wrong count
    pub wrong_count_cap: u32,
    /// Consecutive correct answers that decay a wrong count by one
    pub decay_streak: u32,
    /// Entries kept in the recent-pick history
    pub recent_depth: usize,
    /// A flagged pick at an index below this still counts as recent remediation
    pub remediation_gap: usize,
    /// Attempt log entries kept, oldest dropped first
    pub attempt_log_limit: usize,
    /// Answer buttons offered per prompt
    pub option_count: usize,
    /// Flawless runs needed to unlock the next tier
    pub flawless_runs_to_unlock: u32,
    pub default_rounds: u32,
    pub default_free_letters: u32,
}

impl Default for AlgoConfig {
    fn default() -> Self {
        Self {
            unlock_step: UNLOCK_STEP,
            max_letters: MAX_LETTERS,
            max_weight: MAX_WEIGHT,
            wrong_count_cap: WRONG_COUNT_CAP,
            decay_streak: 2,
            recent_depth: RECENT_DEPTH,
            remediation_gap: 2,
            attempt_log_limit: ATTEMPT_LOG_LIMIT,
            option_count: DEFAULT_OPTION_COUNT,
            flawless_runs_to_unlock: 2,
            default_rounds: 10,
            default_free_letters: 4,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.trim().parse::<T>().ok())
}

impl AlgoConfig {
    /// Defaults overridden by `ABC_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            unlock_step: env_parse("ABC_UNLOCK_STEP").unwrap_or(defaults.unlock_step),
            max_letters: env_parse("ABC_MAX_LETTERS").unwrap_or(defaults.max_letters),
            max_weight: env_parse("ABC_MAX_WEIGHT").unwrap_or(defaults.max_weight),
            attempt_log_limit: env_parse("ABC_ATTEMPT_LOG_LIMIT")
                .unwrap_or(defaults.attempt_log_limit),
            option_count: env_parse("ABC_OPTION_COUNT").unwrap_or(defaults.option_count),
            default_rounds: env_parse("ABC_DEFAULT_ROUNDS").unwrap_or(defaults.default_rounds),
            ..defaults
        }
    }

    pub fn validate(&self) -> AlgoResult<()> {
        if self.unlock_step == 0 {
            return Err(AlgoError::InvalidConfig("unlock_step must be positive".into()));
        }
        if self.max_letters as usize > ALPHABET.len() {
            return Err(AlgoError::InvalidConfig(format!(
                "max_letters {} exceeds alphabet size {}",
                self.max_letters,
                ALPHABET.len()
            )));
        }
        if self.unlock_step > self.max_letters {
            return Err(AlgoError::InvalidConfig(format!(
                "unlock_step {} exceeds max_letters {}",
                self.unlock_step, self.max_letters
            )));
        }
        if self.max_weight == 0 {
            return Err(AlgoError::InvalidConfig("max_weight must be positive".into()));
        }
        if self.option_count == 0 || self.option_count > ALPHABET.len() {
            return Err(AlgoError::InvalidConfig(format!(
                "option_count must be within [1, {}], got {}",
                ALPHABET.len(),
                self.option_count
            )));
        }
        if self.flawless_runs_to_unlock == 0 {
            return Err(AlgoError::InvalidConfig(
                "flawless_runs_to_unlock must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Size of the full alphabet tier, at least one letter
    pub fn letter_limit(&self) -> u32 {
        self.max_letters.max(1)
    }

    /// Letters per tier, within [1, letter_limit]
    ///
    /// Unvalidated configs with a step past the maximum collapse to a single
    /// full-alphabet tier.
    pub fn tier_step(&self) -> u32 {
        self.unlock_step.clamp(1, self.letter_limit())
    }

    /// Unlock tiers of the guided path: step, 2*step, ..., max
    pub fn unlock_tiers(&self) -> Vec<u32> {
        let step = self.tier_step();
        let max = self.letter_limit();
        let mut tiers: Vec<u32> = (1..).map(|i| i * step).take_while(|&t| t < max).collect();
        tiers.push(max);
        tiers
    }
}
