//! Core domain types for the Liftlog training tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise prescriptions and workouts
//! - Logged sets and working-weight progression state
//! - Session records and per-exercise outcomes

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Exercise and Workout Types
// ============================================================================

/// Target prescription for a single exercise within a workout.
///
/// Read-only input to the progression evaluator; the only mutable part of an
/// exercise's record is its [`ProgressionState`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseSpec {
    pub id: String,
    pub name: String,
    pub target_sets: u32,
    pub target_reps: u32,
    /// Working weight used to seed state the first time an exercise is seen.
    pub start_weight: f64,
    /// Added to the working weight after a complete session.
    pub weight_increment: f64,
    /// Percentage (0-100) removed from the working weight after three misses.
    pub deload_percentage: f64,
}

/// An ordered training program (e.g., "Workout A").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub exercises: Vec<ExerciseSpec>,
}

// ============================================================================
// Progression State
// ============================================================================

/// Persisted per-exercise progression state.
///
/// `failed_attempts` resets to 0 whenever `current_weight` changes; the two
/// fields are always written together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub current_weight: f64,
    pub failed_attempts: u32,
}

impl ProgressionState {
    /// Fresh state for an exercise that has never been evaluated.
    pub fn starting_at(weight: f64) -> Self {
        Self {
            current_weight: weight,
            failed_attempts: 0,
        }
    }
}

// ============================================================================
// Set and Session Types
// ============================================================================

/// One set logged during a session.
///
/// `weight_used` is informational; progression decisions read the prescribed
/// weight from [`ProgressionState`], not from the logged value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedSet {
    pub exercise_id: String,
    pub set_number: u32,
    pub reps_completed: u32,
    pub weight_used: f64,
    pub rpe: Option<u8>,
}

/// How a session went for one exercise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every target set hit target reps; the weight goes up.
    Advance,
    /// The session came up short; same weight next time.
    Repeat,
    /// Third miss at this weight; the weight comes down.
    Deload,
    /// No sets logged; the exercise was not attempted.
    Skipped,
}

/// Per-exercise outcome record produced by the evaluator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub exercise_id: String,
    pub outcome: Outcome,
    pub previous_weight: f64,
    pub new_weight: f64,
    pub previous_failed_attempts: u32,
    pub new_failed_attempts: u32,
}

/// A completed, closed training session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingSession {
    pub id: Uuid,
    pub workout_id: String,
    pub session_date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_minutes: u32,
}

/// Everything the orchestrator produced for one completed session.
///
/// Transient; consumed immediately by the caller. Commit failures are listed
/// per exercise so the caller knows exactly which states were persisted.
#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub session: TrainingSession,
    pub results: Vec<SessionResult>,
    pub commit_failures: Vec<CommitFailure>,
}

impl SessionSummary {
    /// True when every non-skipped exercise had its new state persisted.
    pub fn all_committed(&self) -> bool {
        self.commit_failures.is_empty()
    }
}

/// An exercise whose new state could not be persisted after retries.
#[derive(Clone, Debug)]
pub struct CommitFailure {
    pub exercise_id: String,
    pub detail: String,
}
