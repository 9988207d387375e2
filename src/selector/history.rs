use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::letter::Letter;
use crate::types::RECENT_DEPTH;

/// A previously asked letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPick {
    pub letter: Letter,
    /// The letter had a non-zero wrong count when it was asked
    pub flagged: bool,
}

/// Most-recent-first pick history, bounded in depth
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentHistory {
    picks: VecDeque<RecentPick>,
}

impl RecentHistory {
    /// Unflagged history from plain letters, most recent first
    pub fn from_letters(letters: &[Letter]) -> Self {
        Self {
            picks: letters
                .iter()
                .take(RECENT_DEPTH)
                .map(|&letter| RecentPick { letter, flagged: false })
                .collect(),
        }
    }

    /// Record a new pick at the front, dropping the oldest beyond `depth`
    pub fn push(&mut self, letter: Letter, flagged: bool, depth: usize) {
        self.picks.push_front(RecentPick { letter, flagged });
        self.picks.truncate(depth);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecentPick> {
        self.picks.iter()
    }

    pub fn letters(&self) -> Vec<Letter> {
        self.picks.iter().map(|p| p.letter).collect()
    }

    /// Picks with later repeats of a letter removed
    pub fn unique(&self) -> Vec<RecentPick> {
        let mut result: Vec<RecentPick> = Vec::with_capacity(self.picks.len());
        for pick in &self.picks {
            if !result.iter().any(|p| p.letter == pick.letter) {
                result.push(*pick);
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn clear(&mut self) {
        self.picks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::letter::letters;

    #[test]
    fn test_push_bounds_depth() {
        let mut history = RecentHistory::default();
        for l in letters("A B C D") {
            history.push(l, false, 3);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.letters(), letters("D C B"));
    }

    #[test]
    fn test_unique_keeps_first_occurrence() {
        let mut history = RecentHistory::default();
        let abc = letters("A B");
        history.push(abc[0], true, 3);
        history.push(abc[1], false, 3);
        history.push(abc[0], false, 3);
        let unique = history.unique();
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0], RecentPick { letter: abc[0], flagged: false });
        assert_eq!(unique[1].letter, abc[1]);
    }

    #[test]
    fn test_from_letters_truncates() {
        let history = RecentHistory::from_letters(&letters("A B C D E"));
        assert_eq!(history.letters(), letters("A B C"));
        assert!(history.iter().all(|p| !p.flagged));
    }
}
