//! Common Types and Constants
//!
//! Shared data structures used across the selector, the progression tracker
//! and the mastery ledger. Field names follow the persisted JSON shape.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AlgoError;
use crate::letter::Letter;

// ==================== Constants ====================

/// Letters unlocked per guided-path tier
pub const UNLOCK_STEP: u32 = 4;

/// Letters in the complete alphabet tier
pub const MAX_LETTERS: u32 = 26;

/// Selection weight ceiling
pub const MAX_WEIGHT: u32 = 7;

/// Wrong count ceiling
pub const WRONG_COUNT_CAP: u32 = 3;

/// Depth of the anti-repetition history
pub const RECENT_DEPTH: usize = 3;

/// Attempt log retention
pub const ATTEMPT_LOG_LIMIT: usize = 500;

/// Default answer buttons per prompt
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// Current persisted state version
pub const STATE_VERSION: u32 = 1;

pub type WrongCounts = BTreeMap<Letter, u32>;
pub type CorrectStreaks = BTreeMap<Letter, u32>;

// ==================== Enums ====================

/// Prompt style curriculum, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurriculumSet {
    /// Letter plus its initial sound
    #[default]
    #[serde(alias = "ANLAUT", alias = "PRIMARY")]
    Primary,
    /// Letter name only
    #[serde(alias = "OHNE_ANLAUT", alias = "SECONDARY")]
    Secondary,
}

impl CurriculumSet {
    pub const ORDER: [CurriculumSet; 2] = [CurriculumSet::Primary, CurriculumSet::Secondary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }

    /// Curriculum entered after mastering this one, if any
    pub fn next(&self) -> Option<Self> {
        let pos = Self::ORDER.iter().position(|c| c == self)?;
        Self::ORDER.get(pos + 1).copied()
    }
}

impl FromStr for CurriculumSet {
    type Err = AlgoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PRIMARY" | "ANLAUT" => Ok(Self::Primary),
            "SECONDARY" | "OHNE_ANLAUT" => Ok(Self::Secondary),
            _ => Err(AlgoError::UnknownVariant(s.to_string())),
        }
    }
}

/// How the run's letter pool is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Free practice over a chosen number of letters
    #[default]
    #[serde(alias = "FREI", alias = "FREE")]
    Free,
    /// Guided path, unlocked tier by tier
    #[serde(alias = "LERNWEG", alias = "PATH")]
    Path,
}

impl FromStr for Mode {
    type Err = AlgoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FREE" | "FREI" => Ok(Self::Free),
            "PATH" | "LERNWEG" => Ok(Self::Path),
            _ => Err(AlgoError::UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    #[serde(alias = "LEICHT", alias = "EASY")]
    Easy,
    #[serde(alias = "MITTEL", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "SCHWER", alias = "HARD")]
    Hard,
    #[serde(alias = "AFFIG", alias = "EXTRA")]
    Extra,
}

impl FromStr for Difficulty {
    type Err = AlgoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EASY" | "LEICHT" => Ok(Self::Easy),
            "MEDIUM" | "MITTEL" => Ok(Self::Medium),
            "HARD" | "SCHWER" => Ok(Self::Hard),
            "EXTRA" | "AFFIG" => Ok(Self::Extra),
            _ => Err(AlgoError::UnknownVariant(s.to_string())),
        }
    }
}

// ==================== Records ====================

/// One answered prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub target: Letter,
    /// What the child picked; absent when the input could not be read
    pub chosen: Option<Letter>,
    pub correct: bool,
    pub at: DateTime<Utc>,
}

/// Persisted mastery record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MasteryState {
    pub version: u32,
    pub mode: Mode,
    /// Letters unlocked on the guided path
    pub unlocked: u32,
    /// Consecutive mistake-free runs since the last unlock
    pub flawless_streak: u32,
    pub wrong_counts: WrongCounts,
    pub correct_streaks: CorrectStreaks,
    #[serde(alias = "audioSet")]
    pub curriculum_set: CurriculumSet,
    pub difficulty: Difficulty,
    /// Letters in the free practice pool
    pub free_letter_count: u32,
    pub attempt_log: Vec<AttemptRecord>,
}

impl Default for MasteryState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            mode: Mode::Free,
            unlocked: UNLOCK_STEP,
            flawless_streak: 0,
            wrong_counts: WrongCounts::new(),
            correct_streaks: CorrectStreaks::new(),
            curriculum_set: CurriculumSet::Primary,
            difficulty: Difficulty::Easy,
            free_letter_count: 4,
            attempt_log: Vec::new(),
        }
    }
}

impl MasteryState {
    pub fn wrong_count(&self, letter: Letter) -> u32 {
        self.wrong_counts.get(&letter).copied().unwrap_or(0)
    }

    pub fn correct_streak(&self, letter: Letter) -> u32 {
        self.correct_streaks.get(&letter).copied().unwrap_or(0)
    }

    /// Up to `limit` letters with a positive wrong count, most missed first
    ///
    /// Ties keep alphabet order.
    pub fn trouble_letters(&self, limit: usize) -> Vec<(Letter, u32)> {
        let mut trouble: Vec<(Letter, u32)> = self
            .wrong_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(&letter, &count)| (letter, count))
            .collect();
        trouble.sort_by(|a, b| b.1.cmp(&a.1));
        trouble.truncate(limit);
        trouble
    }
}
