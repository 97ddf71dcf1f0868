//! Integration tests for the liftlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - The start / log / finish session workflow
//! - Weight progression visible in the persisted state
//! - CSV rollup operations
//! - Error paths for duplicate sets and session misuse

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("liftlog"))
}

fn run(data_dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = cli();
    cmd.arg("--data-dir").arg(data_dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd.assert()
}

fn read_state(data_dir: &Path) -> serde_json::Value {
    let contents = fs::read_to_string(data_dir.join("state.json")).expect("state.json missing");
    serde_json::from_str(&contents).expect("state.json unparseable")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Barbell training tracker with automatic weight progression",
        ));
}

#[test]
fn test_workouts_lists_default_program() {
    let temp_dir = setup_test_dir();

    run(temp_dir.path(), &["workouts"])
        .success()
        .stdout(predicate::str::contains("Workout A"))
        .stdout(predicate::str::contains("Workout B"))
        .stdout(predicate::str::contains("Squat: 5x5 @ 45.0 lb"))
        .stdout(predicate::str::contains("Deadlift: 1x5 @ 95.0 lb"));
}

#[test]
fn test_status_without_session() {
    let temp_dir = setup_test_dir();

    run(temp_dir.path(), &["status"])
        .success()
        .stdout(predicate::str::contains("No active session"));
}

#[test]
fn test_full_session_applies_progression() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["start", "workout_a"])
        .success()
        .stdout(predicate::str::contains("Started Workout A"));

    // Squat: all five sets at target reps
    for _ in 0..5 {
        run(data_dir, &["log", "squat", "--reps", "5"]).success();
    }
    // Bench: one set short of target reps
    for reps in ["5", "5", "4", "5", "5"] {
        run(data_dir, &["log", "bench_press", "--reps", reps]).success();
    }
    // Barbell row: never attempted

    run(data_dir, &["status"])
        .success()
        .stdout(predicate::str::contains("Squat: 5/5 sets"))
        .stdout(predicate::str::contains("Barbell Row: 0/5 sets"));

    run(data_dir, &["finish"])
        .success()
        .stdout(predicate::str::contains("Squat: 45.0 → 50.0 lb"))
        .stdout(predicate::str::contains(
            "Bench Press: failed attempt 1/3, repeating 45.0 lb",
        ))
        .stdout(predicate::str::contains("Barbell Row: skipped"))
        .stdout(predicate::str::contains("Workout complete"));

    // Progression landed in the state file, both fields together
    let state = read_state(data_dir);
    let squat = &state["exercises"]["squat"];
    assert_eq!(squat["current_weight"].as_f64().unwrap(), 50.0);
    assert_eq!(squat["failed_attempts"].as_u64().unwrap(), 0);

    let bench = &state["exercises"]["bench_press"];
    assert_eq!(bench["current_weight"].as_f64().unwrap(), 45.0);
    assert_eq!(bench["failed_attempts"].as_u64().unwrap(), 1);

    // Skipped exercises are not written at all
    assert!(state["exercises"].get("barbell_row").is_none());

    // Session was recorded and the set journal archived
    assert!(data_dir.join("log/sessions.jsonl").exists());
    assert!(!data_dir.join("session/active_sets.jsonl").exists());
    assert!(!data_dir.join("session/active_session.json").exists());
}

#[test]
fn test_deadlift_uses_fixed_increment() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["start", "workout_b"]).success();
    run(data_dir, &["log", "deadlift", "--reps", "5"]).success();

    run(data_dir, &["finish"])
        .success()
        .stdout(predicate::str::contains("Deadlift: 95.0 → 105.0 lb"));

    let state = read_state(data_dir);
    assert_eq!(
        state["exercises"]["deadlift"]["current_weight"]
            .as_f64()
            .unwrap(),
        105.0
    );
}

#[test]
fn test_duplicate_set_is_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["start", "workout_a"]).success();
    run(data_dir, &["log", "squat", "--reps", "5", "--set", "1"]).success();

    run(data_dir, &["log", "squat", "--reps", "5", "--set", "1"])
        .failure()
        .stderr(predicate::str::contains("duplicate set 1"));

    // The first entry is still the only one
    run(data_dir, &["status"])
        .success()
        .stdout(predicate::str::contains("Squat: 1/5 sets"));
}

#[test]
fn test_start_twice_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["start", "workout_a"]).success();
    run(data_dir, &["start", "workout_b"])
        .failure()
        .stderr(predicate::str::contains("already active"));
}

#[test]
fn test_finish_without_session_fails() {
    let temp_dir = setup_test_dir();

    run(temp_dir.path(), &["finish"])
        .failure()
        .stderr(predicate::str::contains("no active session"));
}

#[test]
fn test_unknown_workout_fails() {
    let temp_dir = setup_test_dir();

    run(temp_dir.path(), &["start", "leg_day"])
        .failure()
        .stderr(predicate::str::contains("unknown workout"));
}

#[test]
fn test_logging_unknown_exercise_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["start", "workout_a"]).success();
    run(data_dir, &["log", "curl", "--reps", "10"])
        .failure()
        .stderr(predicate::str::contains("not part of Workout A"));
}

#[test]
fn test_manual_weight_override() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["weight", "squat", "225"])
        .success()
        .stdout(predicate::str::contains("squat working weight set to 225.0 lb"));

    let state = read_state(data_dir);
    let squat = &state["exercises"]["squat"];
    assert_eq!(squat["current_weight"].as_f64().unwrap(), 225.0);
    assert_eq!(squat["failed_attempts"].as_u64().unwrap(), 0);

    // The override feeds the next session's prescription
    run(data_dir, &["workouts"])
        .success()
        .stdout(predicate::str::contains("Squat: 5x5 @ 225.0 lb"));
}

#[test]
fn test_history_and_rollup() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    // A minimal session: everything skipped, still recorded
    run(data_dir, &["start", "workout_a"]).success();
    run(data_dir, &["finish"]).success();

    run(data_dir, &["history"])
        .success()
        .stdout(predicate::str::contains("Workout A"));

    run(data_dir, &["rollup"])
        .success()
        .stdout(predicate::str::contains("Rolled up 1 sessions to CSV"));

    assert!(data_dir.join("sessions.csv").exists());
    assert!(!data_dir.join("log/sessions.jsonl").exists());

    // History still reads the archived copy
    run(data_dir, &["history"])
        .success()
        .stdout(predicate::str::contains("Workout A"));

    run(data_dir, &["rollup", "--cleanup"])
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}

#[test]
fn test_repeated_misses_deload_across_sessions() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    // Pin the squat at a round number first
    run(data_dir, &["weight", "squat", "100"]).success();

    for _ in 0..2 {
        run(data_dir, &["start", "workout_a"]).success();
        run(data_dir, &["log", "squat", "--reps", "3"]).success();
        run(data_dir, &["finish"]).success();
    }

    let state = read_state(data_dir);
    assert_eq!(
        state["exercises"]["squat"]["failed_attempts"]
            .as_u64()
            .unwrap(),
        2
    );

    // Third miss triggers the 10% deload
    run(data_dir, &["start", "workout_a"]).success();
    run(data_dir, &["log", "squat", "--reps", "3"]).success();
    run(data_dir, &["finish"])
        .success()
        .stdout(predicate::str::contains("Squat: deloaded 100.0 → 90.0 lb"));

    let state = read_state(data_dir);
    let squat = &state["exercises"]["squat"];
    assert_eq!(squat["current_weight"].as_f64().unwrap(), 90.0);
    assert_eq!(squat["failed_attempts"].as_u64().unwrap(), 0);
}
