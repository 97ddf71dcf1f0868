//! Built-in workout catalog.
//!
//! The default program is a classic alternating A/B barbell template: two
//! workouts of three lifts each, 5x5 everywhere except the deadlift's single
//! heavy set. Squat appears in both workouts and shares one progression
//! state.

use crate::types::{ExerciseSpec, Workout};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// The workouts a session can be started from, in program order.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub workouts: Vec<Workout>,
}

impl Catalog {
    pub fn workout(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    /// Check catalog consistency, returning every violation found.
    ///
    /// An exercise id appearing in several workouts must keep the same name,
    /// since the id keys one shared progression state.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut workout_ids = HashMap::new();
        let mut exercise_names: HashMap<&str, &str> = HashMap::new();

        for workout in &self.workouts {
            if workout_ids.insert(workout.id.as_str(), ()).is_some() {
                errors.push(format!("duplicate workout id: {}", workout.id));
            }
            if workout.exercises.is_empty() {
                errors.push(format!("workout {} has no exercises", workout.id));
            }

            let mut seen = HashMap::new();
            for spec in &workout.exercises {
                if seen.insert(spec.id.as_str(), ()).is_some() {
                    errors.push(format!(
                        "duplicate exercise id {} in workout {}",
                        spec.id, workout.id
                    ));
                }
                match exercise_names.get(spec.id.as_str()) {
                    Some(name) if *name != spec.name => errors.push(format!(
                        "exercise {} named both {:?} and {:?}",
                        spec.id, name, spec.name
                    )),
                    _ => {
                        exercise_names.insert(&spec.id, &spec.name);
                    }
                }

                if spec.target_sets == 0 || spec.target_reps == 0 {
                    errors.push(format!("{}: targets must be positive", spec.id));
                }
                if !(0.0..=100.0).contains(&spec.deload_percentage) {
                    errors.push(format!("{}: deload percentage out of range", spec.id));
                }
                if !spec.weight_increment.is_finite() || spec.weight_increment < 0.0 {
                    errors.push(format!("{}: weight increment must be non-negative", spec.id));
                }
                if !spec.start_weight.is_finite() || spec.start_weight < 0.0 {
                    errors.push(format!("{}: start weight must be non-negative", spec.id));
                }
            }
        }

        errors
    }
}

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns
/// a cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn build_default_catalog_internal() -> Catalog {
    let exercise = |id: &str,
                    name: &str,
                    target_sets: u32,
                    target_reps: u32,
                    start_weight: f64,
                    weight_increment: f64| ExerciseSpec {
        id: id.into(),
        name: name.into(),
        target_sets,
        target_reps,
        start_weight,
        weight_increment,
        deload_percentage: 10.0,
    };

    Catalog {
        workouts: vec![
            Workout {
                id: "workout_a".into(),
                name: "Workout A".into(),
                description: Some("Squat / Bench Press / Barbell Row".into()),
                exercises: vec![
                    exercise("squat", "Squat", 5, 5, 45.0, 5.0),
                    exercise("bench_press", "Bench Press", 5, 5, 45.0, 5.0),
                    exercise("barbell_row", "Barbell Row", 5, 5, 65.0, 5.0),
                ],
            },
            Workout {
                id: "workout_b".into(),
                name: "Workout B".into(),
                description: Some("Squat / Overhead Press / Deadlift".into()),
                exercises: vec![
                    exercise("squat", "Squat", 5, 5, 45.0, 5.0),
                    exercise("overhead_press", "Overhead Press", 5, 5, 45.0, 5.0),
                    // The increment here is nominal; deadlifts always jump by
                    // the fixed deadlift increment.
                    exercise("deadlift", "Deadlift", 1, 5, 95.0, 10.0),
                ],
            },
        ],
    }
}
