//! Session orchestration: evaluate every exercise in a workout and commit the
//! resulting progression states.
//!
//! This is the only component with side effects. Each exercise's evaluation
//! depends solely on its own spec, state, and sets, so exercises are
//! independent; the orchestrator simply walks them in workout order. Exactly
//! one state commit is issued per non-skipped exercise, and both state fields
//! travel together through [`ProgressionStore::commit`].

use crate::{
    progression, CommitFailure, ProgressionState, Result, SessionSummary, SetLedger,
    TrainingSession, Workout,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

/// Persistence seam for per-exercise progression state.
///
/// `commit` must write `current_weight` and `failed_attempts` as a single
/// atomic unit; a crash must never leave one field new and the other stale.
pub trait ProgressionStore {
    fn state_for(&self, exercise_id: &str) -> Option<ProgressionState>;
    fn commit(&mut self, exercise_id: &str, state: &ProgressionState) -> Result<()>;
}

/// In-memory store for tests and embedders without a data directory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    states: HashMap<String, ProgressionState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressionStore for MemoryStore {
    fn state_for(&self, exercise_id: &str) -> Option<ProgressionState> {
        self.states.get(exercise_id).cloned()
    }

    fn commit(&mut self, exercise_id: &str, state: &ProgressionState) -> Result<()> {
        self.states.insert(exercise_id.to_string(), state.clone());
        Ok(())
    }
}

/// The session currently in progress, created by `start` and consumed by
/// `finish`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveSession {
    pub id: Uuid,
    pub workout_id: String,
    pub session_date: NaiveDate,
    pub started_at: DateTime<Utc>,
}

impl ActiveSession {
    pub fn begin(workout_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            workout_id: workout_id.to_string(),
            session_date: now.date_naive(),
            started_at: now,
        }
    }

    /// Load the active session marker, if any.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string(self)?)?;
        tracing::debug!("Saved active session {} to {:?}", self.id, path);
        Ok(())
    }

    pub fn clear(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Run the progression evaluator over every exercise of a workout and persist
/// the outcomes.
///
/// Evaluation errors abort the whole session (they indicate a caller or
/// data-integrity bug). Commit errors do not: each commit is retried up to
/// `commit_retries` times, and exercises whose state still could not be
/// written are listed per-exercise in the summary so the caller knows exactly
/// what was and was not persisted. Skipped exercises are never rewritten.
pub fn run_session(
    workout: &Workout,
    ledger: &SetLedger,
    store: &mut dyn ProgressionStore,
    active: &ActiveSession,
    now: DateTime<Utc>,
    commit_retries: u32,
) -> Result<SessionSummary> {
    let mut results = Vec::with_capacity(workout.exercises.len());
    let mut commit_failures = Vec::new();

    for spec in &workout.exercises {
        let prior = store
            .state_for(&spec.id)
            .unwrap_or_else(|| ProgressionState::starting_at(spec.start_weight));
        let sets = ledger.sets_for(&spec.id);

        let (result, next) = progression::evaluate(spec, &prior, &sets)?;

        if result.outcome != crate::Outcome::Skipped {
            if let Err(e) = commit_with_retry(store, &spec.id, &next, commit_retries) {
                tracing::error!("{}: giving up on state commit: {}", spec.id, e);
                commit_failures.push(CommitFailure {
                    exercise_id: spec.id.clone(),
                    detail: e.to_string(),
                });
            }
        }

        results.push(result);
    }

    let session = TrainingSession {
        id: active.id,
        workout_id: active.workout_id.clone(),
        session_date: active.session_date,
        started_at: active.started_at,
        completed_at: now,
        duration_minutes: duration_minutes(active.started_at, now),
    };

    tracing::info!(
        "Closed session {} ({}): {} exercises, {} commit failures, {} min",
        session.id,
        session.workout_id,
        results.len(),
        commit_failures.len(),
        session.duration_minutes
    );

    Ok(SessionSummary {
        session,
        results,
        commit_failures,
    })
}

fn commit_with_retry(
    store: &mut dyn ProgressionStore,
    exercise_id: &str,
    state: &ProgressionState,
    retries: u32,
) -> Result<()> {
    let mut attempt = 0;
    loop {
        match store.commit(exercise_id, state) {
            Ok(()) => return Ok(()),
            Err(e) if attempt < retries => {
                attempt += 1;
                tracing::warn!(
                    "{}: commit attempt {} failed: {}. Retrying.",
                    exercise_id,
                    attempt,
                    e
                );
            }
            Err(e) => return Err(e),
        }
    }
}

/// Wall-clock elapsed time, truncated to whole minutes and floored at zero.
pub fn duration_minutes(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    (now - started_at)
        .num_minutes()
        .clamp(0, i64::from(u32::MAX)) as u32
}
