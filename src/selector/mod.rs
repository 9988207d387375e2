//! Letter Selector
//!
//! Picks the next letter to quiz and builds the answer buttons for it.
//!
//! Core principles:
//! - A letter with a non-zero wrong count must resurface within two picks
//!   (forced remediation)
//! - The last letter and the recent history are avoided when alternatives exist
//! - Struggling letters are oversampled: weight = min(max_weight, 1 + 2 * wrong)
//!
//! The selector is stateless. It reads the caller's state and draws from an
//! injected [`UnitRng`]; it never mutates its inputs.

mod history;

pub use history::{RecentHistory, RecentPick};

use tracing::{debug, trace};

use crate::config::AlgoConfig;
use crate::error::{AlgoError, AlgoResult};
use crate::letter::{normalise_letter, normalise_list, Letter};
use crate::rng::{clamp_unit, UnitRng};
use crate::types::WrongCounts;

/// Inputs to [`LetterSelector::pick_next`]
#[derive(Debug, Clone, Copy)]
pub struct PickRequest<'a, S: AsRef<str>> {
    /// Candidate letters, normalized and deduplicated on entry
    pub pool: &'a [S],
    /// Previously asked letter
    pub last: Option<Letter>,
    pub wrong_counts: &'a WrongCounts,
    /// Recent picks, most recent first
    pub recent: &'a RecentHistory,
}

/// Candidate with its selection weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedLetter {
    pub letter: Letter,
    pub weight: u32,
}

#[derive(Debug, Clone, Default)]
pub struct LetterSelector {
    config: AlgoConfig,
}

impl LetterSelector {
    pub fn new(config: AlgoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlgoConfig {
        &self.config
    }

    /// Weight of a candidate: 1 for a never-missed letter, +2 per wrong count
    pub fn compute_weight(&self, letter: Letter, wrong_counts: &WrongCounts) -> u32 {
        let count = wrong_counts.get(&letter).copied().unwrap_or(0);
        (1 + 2 * count).min(self.config.max_weight)
    }

    /// Index of the most recent remediation pick, if any
    fn last_error_index(&self, recent: &RecentHistory, wrong_counts: &WrongCounts) -> Option<usize> {
        recent
            .unique()
            .into_iter()
            .take(self.config.recent_depth)
            .position(|pick| {
                pick.flagged || wrong_counts.get(&pick.letter).copied().unwrap_or(0) > 0
            })
    }

    /// Choose the next letter to quiz
    ///
    /// Fails only when the pool holds no valid letter.
    pub fn pick_next<S, R>(&self, request: &PickRequest<'_, S>, rng: &mut R) -> AlgoResult<Letter>
    where
        S: AsRef<str>,
        R: UnitRng + ?Sized,
    {
        let candidates = normalise_list(request.pool);
        if candidates.is_empty() {
            return Err(AlgoError::EmptyPool);
        }

        let counts = request.wrong_counts;
        let wrong_letters: Vec<Letter> = candidates
            .iter()
            .copied()
            .filter(|l| counts.get(l).copied().unwrap_or(0) > 0)
            .collect();

        let last_error = self.last_error_index(request.recent, counts);
        let force_wrong = !wrong_letters.is_empty()
            && last_error.map_or(true, |index| index >= self.config.remediation_gap);

        let source = if force_wrong {
            debug!(
                wrong = wrong_letters.len(),
                last_error = ?last_error,
                "forcing remediation pick"
            );
            wrong_letters
        } else {
            candidates
        };

        let mut avoid: Vec<Letter> = request.last.into_iter().collect();
        for pick in request.recent.iter().take(self.config.recent_depth) {
            if !avoid.contains(&pick.letter) {
                avoid.push(pick.letter);
            }
        }

        let mut filtered: Vec<Letter> =
            source.iter().copied().filter(|l| !avoid.contains(l)).collect();

        if filtered.is_empty() {
            if let Some(last) = request.last {
                trace!(%last, "avoidance emptied candidates, avoiding last only");
                filtered = source.iter().copied().filter(|&l| l != last).collect();
            }
        }

        if filtered.is_empty() {
            trace!("avoidance exhausted, using unfiltered source");
            filtered = source;
        }

        let entries: Vec<WeightedLetter> = filtered
            .iter()
            .map(|&letter| WeightedLetter {
                letter,
                weight: self.compute_weight(letter, counts),
            })
            .collect();

        Ok(weighted_select(&entries, rng).unwrap_or(filtered[0]))
    }

    /// Build the shuffled answer buttons for `correct`
    ///
    /// `size` defaults to the configured option count. The result holds the
    /// correct letter exactly once and may be shorter than `size` when the
    /// pool lacks distinct decoys.
    pub fn make_options<S, R>(
        &self,
        correct: &str,
        pool: &[S],
        size: Option<usize>,
        rng: &mut R,
    ) -> AlgoResult<Vec<Letter>>
    where
        S: AsRef<str>,
        R: UnitRng + ?Sized,
    {
        let correct_letter =
            normalise_letter(correct).ok_or_else(|| AlgoError::InvalidLetter(correct.to_string()))?;

        let mut others: Vec<Letter> = normalise_list(pool)
            .into_iter()
            .filter(|&l| l != correct_letter)
            .collect();

        let desired = size.unwrap_or(self.config.option_count).max(1);
        let mut selections = Vec::with_capacity(desired.min(others.len() + 1));
        selections.push(correct_letter);

        while selections.len() < desired && !others.is_empty() {
            let r = clamp_unit(rng.next_unit());
            let index = ((r * others.len() as f64).floor() as usize).min(others.len() - 1);
            selections.push(others.remove(index));
        }

        Ok(shuffle(selections, rng))
    }
}

/// Walk cumulative weights and return the first letter whose bound exceeds
/// the scaled draw
///
/// Returns the first entry when the total weight is zero, `None` when empty.
pub fn weighted_select<R: UnitRng + ?Sized>(
    entries: &[WeightedLetter],
    rng: &mut R,
) -> Option<Letter> {
    let first = entries.first()?;

    let total: u64 = entries.iter().map(|e| e.weight as u64).sum();
    if total == 0 {
        return Some(first.letter);
    }

    let pick = clamp_unit(rng.next_unit()) * total as f64;

    let mut acc = 0.0;
    for entry in entries {
        acc += entry.weight as f64;
        if pick < acc {
            return Some(entry.letter);
        }
    }

    entries.last().map(|e| e.letter)
}

/// Fisher-Yates shuffle driven by `rng`
///
/// Swap indices are floored, so a deterministic low draw keeps swapping with
/// the front of the list.
pub fn shuffle<T, R: UnitRng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    for i in (1..items.len()).rev() {
        let r = clamp_unit(rng.next_unit());
        let j = ((r * (i + 1) as f64).floor() as usize).min(i);
        items.swap(i, j);
    }
    items
}
