//! Working-weight progression rules.
//!
//! This module implements the per-exercise decision made when a session is
//! completed:
//! - Advance: every target set hit target reps, add the weight increment
//! - Repeat: the session came up short, keep the weight and count the miss
//! - Deload: third miss at this weight, drop by the configured percentage
//!
//! `evaluate` is a pure function of (spec, prior state, logged sets); all
//! persistence happens in the session orchestrator.

use crate::{Error, ExerciseSpec, LoggedSet, Outcome, ProgressionState, Result, SessionResult};

/// Misses at the same weight before a deload fires.
pub const DELOAD_THRESHOLD: u32 = 3;

/// Deadlift variants always jump by this amount, regardless of the configured
/// increment. Matched by name, case-insensitively.
pub const DEADLIFT_INCREMENT: f64 = 10.0;

/// Decide the next progression state for one exercise.
///
/// Returns the outcome record and the state to persist. An exercise with no
/// logged sets is `Skipped` and its state is returned unchanged; skipping
/// carries no failed-attempt penalty.
pub fn evaluate(
    spec: &ExerciseSpec,
    prior: &ProgressionState,
    sets: &[LoggedSet],
) -> Result<(SessionResult, ProgressionState)> {
    if spec.target_sets == 0 || spec.target_reps == 0 {
        return Err(Error::InvalidSpec(format!(
            "{}: target sets and reps must be positive ({}x{})",
            spec.id, spec.target_sets, spec.target_reps
        )));
    }
    if !(0.0..=100.0).contains(&spec.deload_percentage) {
        return Err(Error::InvalidSpec(format!(
            "{}: deload percentage must be within 0-100, got {}",
            spec.id, spec.deload_percentage
        )));
    }
    if !spec.weight_increment.is_finite() || spec.weight_increment < 0.0 {
        return Err(Error::InvalidSpec(format!(
            "{}: weight increment must be non-negative, got {}",
            spec.id, spec.weight_increment
        )));
    }
    if !prior.current_weight.is_finite() || prior.current_weight < 0.0 {
        return Err(Error::InvalidState(format!(
            "{}: working weight must be non-negative, got {}",
            spec.id, prior.current_weight
        )));
    }

    if sets.is_empty() {
        tracing::debug!("{}: no sets logged, skipping", spec.id);
        return Ok((result(spec, prior, Outcome::Skipped, prior), prior.clone()));
    }

    // All-or-nothing: one set short of target reps fails the whole exercise,
    // and a partial set count never qualifies regardless of reps.
    let complete = sets.len() as u64 >= u64::from(spec.target_sets)
        && sets.iter().all(|s| s.reps_completed >= spec.target_reps);

    let (outcome, next) = if complete {
        let increment = if is_deadlift(&spec.name) {
            DEADLIFT_INCREMENT
        } else {
            spec.weight_increment
        };
        let next = ProgressionState {
            current_weight: prior.current_weight + increment,
            failed_attempts: 0,
        };
        tracing::debug!(
            "{}: complete, advancing {} -> {}",
            spec.id,
            prior.current_weight,
            next.current_weight
        );
        (Outcome::Advance, next)
    } else {
        let failures = prior.failed_attempts + 1;
        if failures >= DELOAD_THRESHOLD {
            let deload = prior.current_weight * spec.deload_percentage / 100.0;
            let next = ProgressionState {
                current_weight: (prior.current_weight - deload).max(0.0),
                failed_attempts: 0,
            };
            tracing::debug!(
                "{}: failed {} times, deloading {}% to {}",
                spec.id,
                failures,
                spec.deload_percentage,
                next.current_weight
            );
            (Outcome::Deload, next)
        } else {
            tracing::debug!(
                "{}: failed attempt {}/{}, repeating {}",
                spec.id,
                failures,
                DELOAD_THRESHOLD,
                prior.current_weight
            );
            let next = ProgressionState {
                current_weight: prior.current_weight,
                failed_attempts: failures,
            };
            (Outcome::Repeat, next)
        }
    };

    Ok((result(spec, prior, outcome, &next), next))
}

fn result(
    spec: &ExerciseSpec,
    prior: &ProgressionState,
    outcome: Outcome,
    next: &ProgressionState,
) -> SessionResult {
    SessionResult {
        exercise_id: spec.id.clone(),
        outcome,
        previous_weight: prior.current_weight,
        new_weight: next.current_weight,
        previous_failed_attempts: prior.failed_attempts,
        new_failed_attempts: next.failed_attempts,
    }
}

fn is_deadlift(name: &str) -> bool {
    name.to_lowercase().contains("deadlift")
}
