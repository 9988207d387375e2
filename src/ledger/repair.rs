//! Persisted State Repair
//!
//! Stored progress can be missing, from an older version, or hand-edited.
//! Repair never fails: each field is read on its own and falls back to its
//! default when it has the wrong shape.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::config::AlgoConfig;
use crate::letter::{normalise_letter, Letter};
use crate::progression::snap_unlocked;
use crate::types::{
    AttemptRecord, CurriculumSet, Difficulty, MasteryState, Mode, STATE_VERSION,
};

/// Rebuild a valid [`MasteryState`] from arbitrary JSON
pub fn repair_state(raw: &Value, config: &AlgoConfig) -> MasteryState {
    let defaults = MasteryState {
        free_letter_count: config.default_free_letters.clamp(1, config.letter_limit()),
        unlocked: config.tier_step(),
        ..MasteryState::default()
    };

    let object = match raw.as_object() {
        Some(object) => object,
        None => {
            if !raw.is_null() {
                warn!(kind = value_kind(raw), "progress record is not an object, using defaults");
            }
            return defaults;
        }
    };

    let mut repaired: Vec<&'static str> = Vec::new();
    let mut state = defaults.clone();

    let version = object.get("version").and_then(Value::as_u64).unwrap_or(0);
    if version > STATE_VERSION as u64 {
        warn!(version, "progress record is newer than supported, reading known fields");
    }
    state.version = STATE_VERSION;

    if let Some(value) = object.get("unlocked") {
        match as_integer(value) {
            Some(n) => {
                let snapped = snap_unlocked(n, config);
                if snapped as i64 != n {
                    repaired.push("unlocked");
                }
                state.unlocked = snapped;
            }
            None => repaired.push("unlocked"),
        }
    }

    if let Some(value) = object.get("flawlessStreak") {
        match as_integer(value) {
            Some(n) if n >= 0 => state.flawless_streak = n.min(u32::MAX as i64) as u32,
            _ => repaired.push("flawlessStreak"),
        }
    }

    if let Some(value) = object.get("wrongCounts") {
        match read_counts(value, Some(config.wrong_count_cap)) {
            Some((counts, clean)) => {
                if !clean {
                    repaired.push("wrongCounts");
                }
                state.wrong_counts = counts;
            }
            None => repaired.push("wrongCounts"),
        }
    }

    if let Some(value) = object.get("correctStreaks") {
        match read_counts(value, None) {
            Some((counts, clean)) => {
                if !clean {
                    repaired.push("correctStreaks");
                }
                state.correct_streaks = counts;
            }
            None => repaired.push("correctStreaks"),
        }
    }

    let curriculum = object.get("curriculumSet").or_else(|| object.get("audioSet"));
    if let Some(value) = curriculum {
        match value.as_str().and_then(|s| s.parse::<CurriculumSet>().ok()) {
            Some(set) => state.curriculum_set = set,
            None => repaired.push("curriculumSet"),
        }
    }

    if let Some(value) = object.get("mode") {
        match value.as_str().and_then(|s| s.parse::<Mode>().ok()) {
            Some(mode) => state.mode = mode,
            None => repaired.push("mode"),
        }
    }

    if let Some(value) = object.get("difficulty") {
        match value.as_str().and_then(|s| s.parse::<Difficulty>().ok()) {
            Some(difficulty) => state.difficulty = difficulty,
            None => repaired.push("difficulty"),
        }
    }

    if let Some(value) = object.get("freeLetterCount") {
        match as_integer(value) {
            Some(n) if n >= 1 => {
                state.free_letter_count = n.min(config.letter_limit() as i64) as u32;
            }
            _ => repaired.push("freeLetterCount"),
        }
    }

    if let Some(value) = object.get("attemptLog") {
        match read_attempts(value, config.attempt_log_limit) {
            Some((log, clean)) => {
                if !clean {
                    repaired.push("attemptLog");
                }
                state.attempt_log = log;
            }
            None => repaired.push("attemptLog"),
        }
    }

    if !repaired.is_empty() {
        warn!(fields = ?repaired, "repaired malformed progress fields");
    }

    state
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Finite numbers floored to an integer
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.is_finite())
        .map(|f| f.floor().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}

/// Letter-keyed counters; the flag is false when entries were dropped or clamped
fn read_counts(value: &Value, cap: Option<u32>) -> Option<(BTreeMap<Letter, u32>, bool)> {
    let object: &Map<String, Value> = value.as_object()?;
    let mut counts = BTreeMap::new();
    let mut clean = true;

    for (key, raw) in object {
        let letter = match normalise_letter(key) {
            Some(letter) => letter,
            None => {
                clean = false;
                continue;
            }
        };
        let count = match as_integer(raw) {
            Some(n) if n >= 0 => n.min(u32::MAX as i64) as u32,
            _ => {
                clean = false;
                continue;
            }
        };
        let bounded = cap.map_or(count, |cap| count.min(cap));
        if bounded != count || counts.contains_key(&letter) {
            clean = false;
        }
        let entry = counts.entry(letter).or_insert(0);
        *entry = (*entry).max(bounded);
    }

    Some((counts, clean))
}

fn read_attempts(value: &Value, limit: usize) -> Option<(Vec<AttemptRecord>, bool)> {
    let items = value.as_array()?;
    let mut log: Vec<AttemptRecord> = Vec::with_capacity(items.len().min(limit));
    let mut clean = true;

    for item in items {
        match serde_json::from_value::<AttemptRecord>(item.clone()) {
            Ok(record) => log.push(record),
            Err(_) => clean = false,
        }
    }

    if log.len() > limit {
        log.drain(..log.len() - limit);
        clean = false;
    }

    Some((log, clean))
}
