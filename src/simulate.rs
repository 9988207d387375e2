//! Learner Simulation
//!
//! Plays independent simulated learners through guided-path runs so content
//! designers can see how a constant change moves the unlock cadence.
//! Learners run in parallel on rayon, each with its own seeded ChaCha stream,
//! so a report is reproducible for a given seed regardless of thread count.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AlgoConfig;
use crate::error::{AlgoError, AlgoResult};
use crate::ledger::{MasteryLedger, StateUpdate};
use crate::letter::Letter;
use crate::rng::{SeededRng, UnitRng};
use crate::session::Session;
use crate::store::MemoryStore;
use crate::types::{CurriculumSet, Mode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimParams {
    pub learners: usize,
    /// Runs played per learner
    pub runs: u32,
    pub seed: u64,
    /// Probability of answering a prompt correctly
    pub skill: f64,
    /// Rounds per run, the configured default when absent
    pub rounds: Option<u32>,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            learners: 100,
            runs: 60,
            seed: 42,
            skill: 0.9,
            rounds: None,
        }
    }
}

/// One learner's trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerOutcome {
    /// Run after which the full alphabet was first unlocked
    pub runs_to_full_alphabet: Option<u32>,
    /// Run after which the curriculum first moved on
    pub runs_to_next_curriculum: Option<u32>,
    pub flawless_runs: u32,
    pub final_unlocked: u32,
    pub final_curriculum: CurriculumSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimReport {
    pub params: SimParams,
    pub learners: usize,
    /// Learners that unlocked the full alphabet within the run budget
    pub reached_full_alphabet: usize,
    pub reached_next_curriculum: usize,
    pub mean_runs_to_full_alphabet: Option<f64>,
    pub min_runs_to_full_alphabet: Option<u32>,
    pub max_runs_to_full_alphabet: Option<u32>,
    /// Share of all runs that were mistake-free
    pub flawless_rate: f64,
    /// Learners per final unlocked count
    pub final_unlocked: BTreeMap<u32, usize>,
    pub final_curriculum: BTreeMap<String, usize>,
}

/// Run the simulation
pub fn simulate(config: &AlgoConfig, params: &SimParams) -> AlgoResult<SimReport> {
    if !(0.0..=1.0).contains(&params.skill) {
        return Err(AlgoError::InvalidConfig(format!(
            "skill must be within [0, 1], got {}",
            params.skill
        )));
    }

    let outcomes: Vec<LearnerOutcome> = (0..params.learners)
        .into_par_iter()
        .map(|index| {
            let mut rng = SeededRng::seeded(params.seed.wrapping_add(index as u64));
            simulate_learner(config, params, &mut rng)
        })
        .collect::<AlgoResult<Vec<_>>>()?;

    Ok(summarise(params, &outcomes))
}

/// Play one learner through `params.runs` guided-path runs
pub fn simulate_learner<R: UnitRng + ?Sized>(
    config: &AlgoConfig,
    params: &SimParams,
    rng: &mut R,
) -> AlgoResult<LearnerOutcome> {
    let ledger = MasteryLedger::new(MemoryStore::new(), config.clone());
    ledger.save_progress(&StateUpdate {
        mode: Some(Mode::Path),
        ..StateUpdate::default()
    });

    let alphabet = Letter::prefix(config.max_letters as usize);
    let mut outcome = LearnerOutcome {
        runs_to_full_alphabet: None,
        runs_to_next_curriculum: None,
        flawless_runs: 0,
        final_unlocked: config.tier_step(),
        final_curriculum: CurriculumSet::Primary,
    };

    for run in 1..=params.runs {
        let mut session = Session::start(&ledger, &alphabet, params.rounds)?;
        while session.has_next() {
            let prompt = session.next_prompt(rng)?;
            let chosen = if rng.next_unit() < params.skill {
                prompt.target
            } else {
                prompt
                    .options
                    .iter()
                    .copied()
                    .find(|&l| l != prompt.target)
                    .unwrap_or(prompt.target)
            };
            session.answer(chosen.as_str())?;
        }

        let summary = session.finish()?;
        if summary.bad == 0 {
            outcome.flawless_runs += 1;
        }
        if outcome.runs_to_full_alphabet.is_none() && summary.unlocked_after >= config.letter_limit() {
            outcome.runs_to_full_alphabet = Some(run);
        }
        if outcome.runs_to_next_curriculum.is_none() && summary.curriculum_changed() {
            outcome.runs_to_next_curriculum = Some(run);
        }
        outcome.final_unlocked = summary.unlocked_after;
        outcome.final_curriculum = summary.curriculum_after;
    }

    debug!(
        full = ?outcome.runs_to_full_alphabet,
        next = ?outcome.runs_to_next_curriculum,
        "learner finished"
    );
    Ok(outcome)
}

fn summarise(params: &SimParams, outcomes: &[LearnerOutcome]) -> SimReport {
    let reached: Vec<u32> = outcomes
        .iter()
        .filter_map(|o| o.runs_to_full_alphabet)
        .collect();

    let mean = if reached.is_empty() {
        None
    } else {
        Some(reached.iter().map(|&r| r as f64).sum::<f64>() / reached.len() as f64)
    };

    let total_runs = outcomes.len() as f64 * params.runs as f64;
    let flawless: u32 = outcomes.iter().map(|o| o.flawless_runs).sum();

    let mut final_unlocked = BTreeMap::new();
    let mut final_curriculum = BTreeMap::new();
    for outcome in outcomes {
        *final_unlocked.entry(outcome.final_unlocked).or_insert(0) += 1;
        *final_curriculum
            .entry(outcome.final_curriculum.as_str().to_string())
            .or_insert(0) += 1;
    }

    SimReport {
        params: params.clone(),
        learners: outcomes.len(),
        reached_full_alphabet: reached.len(),
        reached_next_curriculum: outcomes
            .iter()
            .filter(|o| o.runs_to_next_curriculum.is_some())
            .count(),
        mean_runs_to_full_alphabet: mean,
        min_runs_to_full_alphabet: reached.iter().copied().min(),
        max_runs_to_full_alphabet: reached.iter().copied().max(),
        flawless_rate: if total_runs > 0.0 { flawless as f64 / total_runs } else { 0.0 },
        final_unlocked,
        final_curriculum,
    }
}
