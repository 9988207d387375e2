//! Run Loop
//!
//! Glues the selector, the ledger and the progression tracker into the round
//! cycle a player goes through:
//! - [`eligible_pool`] picks the run's letters from the mode and the letters
//!   that can actually be prompted
//! - [`Session::next_prompt`] selects a target and its answer buttons
//! - [`Session::answer`] records the answer in the ledger
//! - [`Session::finish`] awards a medal and, on the guided path, advances
//!   progression
//!
//! One prompt is active at a time, so every ledger write is a complete
//! read-modify-write before the next answer arrives.

mod run;

pub use run::{Medal, Prompt, RoundOutcome, Run, RunSummary};

use std::collections::HashSet;

use tracing::{debug, info};

use crate::config::AlgoConfig;
use crate::error::{AlgoError, AlgoResult};
use crate::ledger::{MasteryLedger, StateUpdate};
use crate::letter::{normalise_letter, normalise_list, Letter};
use crate::progression::{snap_unlocked, ProgressionTracker, RunResult};
use crate::rng::UnitRng;
use crate::selector::{LetterSelector, PickRequest};
use crate::store::ProgressStore;
use crate::types::{MasteryState, Mode};

/// Letters a run may ask, in alphabet order
///
/// Free mode uses the first `free_letter_count` letters, the guided path the
/// first `unlocked` letters. Only letters present in `available` are kept.
pub fn eligible_pool<S: AsRef<str>>(
    state: &MasteryState,
    available: &[S],
    config: &AlgoConfig,
) -> AlgoResult<Vec<Letter>> {
    let count = match state.mode {
        Mode::Free => state.free_letter_count.clamp(1, config.letter_limit()),
        Mode::Path => snap_unlocked(state.unlocked as i64, config),
    };

    let available: HashSet<Letter> = normalise_list(available).into_iter().collect();
    let pool: Vec<Letter> = Letter::prefix(count as usize)
        .into_iter()
        .filter(|l| available.contains(l))
        .collect();

    if pool.is_empty() {
        return Err(AlgoError::EmptyPool);
    }
    Ok(pool)
}

/// Letters listed as trouble spots in a run summary
const TROUBLE_LETTERS: usize = 3;

pub struct Session<'a, S: ProgressStore> {
    ledger: &'a MasteryLedger<S>,
    selector: LetterSelector,
    tracker: ProgressionTracker,
    mode: Mode,
    run: Run,
}

impl<'a, S: ProgressStore> Session<'a, S> {
    /// Start a run over the letters in `available`
    ///
    /// `rounds` falls back to the configured default.
    pub fn start<T: AsRef<str>>(
        ledger: &'a MasteryLedger<S>,
        available: &[T],
        rounds: Option<u32>,
    ) -> AlgoResult<Self> {
        let config = ledger.config().clone();
        let state = ledger.get_progress();
        let pool = eligible_pool(&state, available, &config)?;
        let rounds = rounds.unwrap_or(config.default_rounds);

        debug!(mode = ?state.mode, pool = pool.len(), rounds, "run started");

        Ok(Self {
            ledger,
            selector: LetterSelector::new(config.clone()),
            tracker: ProgressionTracker::new(config),
            mode: state.mode,
            run: Run::new(pool, rounds),
        })
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether another prompt can be asked
    pub fn has_next(&self) -> bool {
        !self.run.is_exhausted()
    }

    /// Select the next target and its answer buttons
    ///
    /// Returns the active prompt again while it is unanswered.
    pub fn next_prompt<R: UnitRng + ?Sized>(&mut self, rng: &mut R) -> AlgoResult<Prompt> {
        if let Some(prompt) = &self.run.active {
            return Ok(prompt.clone());
        }
        if self.run.is_exhausted() {
            return Err(AlgoError::RunFinished);
        }

        let state = self.ledger.get_progress();
        let target = self.selector.pick_next(
            &PickRequest {
                pool: self.run.pool.as_slice(),
                last: self.run.last,
                wrong_counts: &state.wrong_counts,
                recent: &self.run.recent,
            },
            rng,
        )?;
        let options = self
            .selector
            .make_options(target.as_str(), self.run.pool.as_slice(), None, rng)?;

        let depth = self.selector.config().recent_depth;
        self.run.recent.push(target, state.wrong_count(target) > 0, depth);
        self.run.last = Some(target);

        let prompt = Prompt {
            round: self.run.played() + 1,
            target,
            options,
        };
        self.run.active = Some(prompt.clone());
        Ok(prompt)
    }

    /// Answer the active prompt
    pub fn answer(&mut self, chosen: &str) -> AlgoResult<RoundOutcome> {
        if self.run.finished {
            return Err(AlgoError::RunFinished);
        }
        let chosen =
            normalise_letter(chosen).ok_or_else(|| AlgoError::InvalidLetter(chosen.to_string()))?;
        let prompt = self.run.active.take().ok_or(AlgoError::NoActivePrompt)?;

        let state = self.ledger.record_answer(prompt.target, chosen);
        let correct = chosen == prompt.target;
        if correct {
            self.run.ok += 1;
        } else {
            self.run.bad += 1;
        }

        let outcome = RoundOutcome {
            round: prompt.round,
            target: prompt.target,
            chosen,
            correct,
            wrong_count: state.wrong_count(prompt.target),
        };
        self.run.outcomes.push(outcome.clone());
        Ok(outcome)
    }

    /// Remove a letter whose prompt cannot be played
    ///
    /// An active prompt for that letter is discarded and its round counts as
    /// used. Returns true when letters remain.
    pub fn drop_letter(&mut self, letter: Letter) -> bool {
        self.run.pool.retain(|&l| l != letter);
        if self.run.active.as_ref().is_some_and(|p| p.target == letter) {
            self.run.active = None;
            self.run.skipped += 1;
        }
        debug!(%letter, remaining = self.run.pool.len(), "letter dropped from run");
        !self.run.pool.is_empty()
    }

    /// Close the run and report it
    ///
    /// On the guided path the mistake count is fed to the progression
    /// tracker and the outcome is saved. A run with no answered rounds never
    /// counts toward progression.
    pub fn finish(&mut self) -> AlgoResult<RunSummary> {
        if self.run.finished {
            return Err(AlgoError::RunFinished);
        }
        self.run.finished = true;
        self.run.active = None;

        let before = self.ledger.get_progress();
        let mut after = before.clone();

        if self.mode == Mode::Path && self.run.answered() > 0 {
            let advanced = self
                .tracker
                .advance_after_run(&RunResult::with_mistakes(self.run.bad), &before)?;
            after = self.ledger.save_progress(&StateUpdate {
                unlocked: Some(advanced.unlocked),
                flawless_streak: Some(advanced.flawless_streak),
                curriculum_set: Some(advanced.curriculum_set),
                ..StateUpdate::default()
            });
        }

        let percent = self.run.percent();
        let summary = RunSummary {
            mode: self.mode,
            ok: self.run.ok,
            bad: self.run.bad,
            rounds: self.run.rounds,
            answered: self.run.answered(),
            percent,
            medal: Medal::award(self.run.bad, percent),
            trouble_letters: after.trouble_letters(TROUBLE_LETTERS),
            unlocked_before: before.unlocked,
            unlocked_after: after.unlocked,
            curriculum_before: before.curriculum_set,
            curriculum_after: after.curriculum_set,
        };

        info!(
            ok = summary.ok,
            bad = summary.bad,
            medal = ?summary.medal,
            unlocked = summary.unlocked_after,
            "run finished"
        );
        Ok(summary)
    }
}
