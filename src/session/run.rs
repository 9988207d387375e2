use serde::{Deserialize, Serialize};

use crate::letter::Letter;
use crate::selector::RecentHistory;
use crate::types::{CurriculumSet, Mode};

/// A quiz prompt waiting for an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    /// One-based round number
    pub round: u32,
    pub target: Letter,
    /// Shuffled answer buttons, `target` among them
    pub options: Vec<Letter>,
}

/// One answered round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    pub round: u32,
    pub target: Letter,
    pub chosen: Letter,
    pub correct: bool,
    /// Wrong count of the target after the answer was recorded
    pub wrong_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// Gold for a mistake-free run, silver from 50 percent correct
    pub fn award(bad: u32, percent: u32) -> Self {
        if bad == 0 {
            Medal::Gold
        } else if percent >= 50 {
            Medal::Silver
        } else {
            Medal::Bronze
        }
    }
}

/// End-of-run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub mode: Mode,
    pub ok: u32,
    pub bad: u32,
    /// Rounds planned for the run
    pub rounds: u32,
    /// Rounds actually answered
    pub answered: u32,
    /// Correct answers as a share of the planned rounds
    pub percent: u32,
    pub medal: Medal,
    /// Most missed letters after the run with their wrong counts
    pub trouble_letters: Vec<(Letter, u32)>,
    pub unlocked_before: u32,
    pub unlocked_after: u32,
    pub curriculum_before: CurriculumSet,
    pub curriculum_after: CurriculumSet,
}

impl RunSummary {
    pub fn unlocked_more(&self) -> bool {
        self.unlocked_after > self.unlocked_before && self.curriculum_before == self.curriculum_after
    }

    pub fn curriculum_changed(&self) -> bool {
        self.curriculum_before != self.curriculum_after
    }
}

/// Mutable bookkeeping of a single run
#[derive(Debug, Clone, Default)]
pub struct Run {
    pub rounds: u32,
    pub ok: u32,
    pub bad: u32,
    /// Rounds used up by prompts that could not be played
    pub skipped: u32,
    pub last: Option<Letter>,
    pub recent: RecentHistory,
    pub outcomes: Vec<RoundOutcome>,
    pub pool: Vec<Letter>,
    pub(crate) active: Option<Prompt>,
    pub(crate) finished: bool,
}

impl Run {
    pub fn new(pool: Vec<Letter>, rounds: u32) -> Self {
        Self {
            rounds: rounds.max(1),
            pool,
            ..Self::default()
        }
    }

    /// Rounds answered so far
    pub fn answered(&self) -> u32 {
        self.ok + self.bad
    }

    /// Rounds used up, answered or skipped
    pub fn played(&self) -> u32 {
        self.answered() + self.skipped
    }

    /// No further prompt can be asked
    pub fn is_exhausted(&self) -> bool {
        self.finished || self.pool.is_empty() || self.played() >= self.rounds
    }

    /// Correct answers over the planned rounds
    ///
    /// A run cut short by unplayable letters scores its missing rounds as
    /// not correct.
    pub fn percent(&self) -> u32 {
        ((self.ok as f64 / self.rounds.max(1) as f64) * 100.0).round() as u32
    }

    pub fn active(&self) -> Option<&Prompt> {
        self.active.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
