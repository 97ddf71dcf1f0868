//! Session-scoped record of logged sets.
//!
//! The ledger is a pure data holder: one entry per (exercise, set number),
//! ordered by set number regardless of arrival order. Duplicate set numbers
//! are rejected, never merged. Reps and weights are not validated here;
//! semantics live in the evaluator.

use crate::{Error, LoggedSet, Result};
use std::collections::BTreeMap;

/// Append-only collection of the sets logged during one session.
#[derive(Clone, Debug, Default)]
pub struct SetLedger {
    sets: BTreeMap<(String, u32), LoggedSet>,
}

impl SetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a set. Fails without modifying the ledger if the set number is
    /// zero or already taken for this exercise.
    pub fn insert(&mut self, set: LoggedSet) -> Result<()> {
        if set.set_number == 0 {
            return Err(Error::InvalidSet(format!(
                "set number must be positive (exercise {})",
                set.exercise_id
            )));
        }

        let key = (set.exercise_id.clone(), set.set_number);
        if self.sets.contains_key(&key) {
            return Err(Error::DuplicateSet {
                exercise_id: set.exercise_id,
                set_number: set.set_number,
            });
        }

        self.sets.insert(key, set);
        Ok(())
    }

    /// Sets recorded for an exercise, ordered by set number.
    pub fn sets_for(&self, exercise_id: &str) -> Vec<LoggedSet> {
        self.sets
            .values()
            .filter(|s| s.exercise_id == exercise_id)
            .cloned()
            .collect()
    }

    /// First unused set number for an exercise (1-based).
    pub fn next_set_number(&self, exercise_id: &str) -> u32 {
        self.sets
            .values()
            .filter(|s| s.exercise_id == exercise_id)
            .map(|s| s.set_number)
            .max()
            .map_or(1, |n| n + 1)
    }

    /// All sets in the ledger, ordered by (exercise id, set number).
    pub fn iter(&self) -> impl Iterator<Item = &LoggedSet> {
        self.sets.values()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
