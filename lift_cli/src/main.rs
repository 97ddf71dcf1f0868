use chrono::Utc;
use clap::{Parser, Subcommand};
use lift_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Barbell training tracker with automatic weight progression", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available workouts and current working weights
    Workouts,

    /// Start a session for the given workout
    Start {
        /// Workout id (see `liftlog workouts`)
        workout: String,
    },

    /// Log one set for an exercise in the active session
    Log {
        /// Exercise id or name
        exercise: String,

        /// Reps completed
        #[arg(long)]
        reps: u32,

        /// Set number (defaults to the next unlogged set)
        #[arg(long)]
        set: Option<u32>,

        /// Weight used (defaults to the prescribed working weight)
        #[arg(long)]
        weight: Option<f64>,

        /// Perceived exertion, 1-10
        #[arg(long)]
        rpe: Option<u8>,
    },

    /// Show progress of the active session (default)
    Status,

    /// Close the active session and apply weight progression
    Finish,

    /// Manually override an exercise's working weight
    Weight {
        /// Exercise id
        exercise: String,

        /// New working weight
        value: f64,
    },

    /// Show recent sessions
    History {
        /// Day window to report
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Roll up logged sessions to CSV
    Rollup {
        /// Clean up processed log files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

/// File layout under the data directory
struct Paths {
    state: PathBuf,
    active: PathBuf,
    set_journal: PathBuf,
    session_log: PathBuf,
    csv: PathBuf,
    session_dir: PathBuf,
    log_dir: PathBuf,
}

fn paths(data_dir: &Path) -> Paths {
    let session_dir = data_dir.join("session");
    let log_dir = data_dir.join("log");
    Paths {
        state: data_dir.join("state.json"),
        active: session_dir.join("active_session.json"),
        set_journal: session_dir.join("active_sets.jsonl"),
        session_log: log_dir.join("sessions.jsonl"),
        csv: data_dir.join("sessions.csv"),
        session_dir,
        log_dir,
    }
}

fn main() {
    // Initialize logging
    lift_core::logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Workouts) => cmd_workouts(&data_dir, &config),
        Some(Commands::Start { workout }) => cmd_start(&data_dir, &config, &workout),
        Some(Commands::Log {
            exercise,
            reps,
            set,
            weight,
            rpe,
        }) => cmd_log(&data_dir, &config, &exercise, reps, set, weight, rpe),
        Some(Commands::Finish) => cmd_finish(&data_dir, &config),
        Some(Commands::Weight { exercise, value }) => cmd_weight(&data_dir, &exercise, value),
        Some(Commands::History { days }) => cmd_history(&data_dir, &config, days),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&data_dir, cleanup),
        // Default to "status" command
        Some(Commands::Status) | None => cmd_status(&data_dir, &config),
    }
}

/// Custom workouts from the config merged over the built-in catalog.
fn available_workouts(config: &Config) -> Result<Vec<Workout>> {
    let mut workouts = config.custom_workouts();
    for workout in &get_default_catalog().workouts {
        if !workouts.iter().any(|w| w.id == workout.id) {
            workouts.push(workout.clone());
        }
    }

    let merged = Catalog { workouts };
    let errors = merged.validate();
    if !errors.is_empty() {
        eprintln!("Workout validation errors:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Config("Invalid workout definitions".into()));
    }

    Ok(merged.workouts)
}

fn find_workout(config: &Config, id: &str) -> Result<Workout> {
    available_workouts(config)?
        .into_iter()
        .find(|w| w.id == id)
        .ok_or_else(|| Error::Config(format!("unknown workout: {}", id)))
}

fn require_active(p: &Paths) -> Result<ActiveSession> {
    ActiveSession::load(&p.active)?.ok_or_else(|| {
        Error::Session("no active session; start one with `liftlog start <workout>`".into())
    })
}

/// Stored weights keep full precision; display truncates to one decimal.
fn display_weight(weight: f64) -> String {
    format!("{:.1}", (weight * 10.0).trunc() / 10.0)
}

fn cmd_workouts(data_dir: &Path, config: &Config) -> Result<()> {
    let state = TrainingState::load(&paths(data_dir).state)?;

    for workout in available_workouts(config)? {
        println!("{} — {}", workout.id, workout.name);
        if let Some(ref description) = workout.description {
            println!("  {}", description);
        }
        for spec in &workout.exercises {
            let weight = state
                .exercises
                .get(&spec.id)
                .map_or(spec.start_weight, |s| s.current_weight);
            println!(
                "  {}: {}x{} @ {} lb",
                spec.name,
                spec.target_sets,
                spec.target_reps,
                display_weight(weight)
            );
        }
        println!();
    }

    Ok(())
}

fn cmd_start(data_dir: &Path, config: &Config, workout_id: &str) -> Result<()> {
    let p = paths(data_dir);

    if let Some(active) = ActiveSession::load(&p.active)? {
        return Err(Error::Session(format!(
            "a session for {} is already active; finish it first",
            active.workout_id
        )));
    }

    let workout = find_workout(config, workout_id)?;
    let state = TrainingState::load(&p.state)?;

    let active = ActiveSession::begin(&workout.id, Utc::now());
    active.save(&p.active)?;

    println!("✓ Started {} ({})", workout.name, active.session_date);
    for spec in &workout.exercises {
        let weight = state
            .exercises
            .get(&spec.id)
            .map_or(spec.start_weight, |s| s.current_weight);
        println!(
            "  {}: {}x{} @ {} lb",
            spec.name,
            spec.target_sets,
            spec.target_reps,
            display_weight(weight)
        );
    }

    Ok(())
}

fn cmd_log(
    data_dir: &Path,
    config: &Config,
    exercise: &str,
    reps: u32,
    set: Option<u32>,
    weight: Option<f64>,
    rpe: Option<u8>,
) -> Result<()> {
    let p = paths(data_dir);
    let active = require_active(&p)?;
    let workout = find_workout(config, &active.workout_id)?;

    let spec = workout
        .exercises
        .iter()
        .find(|e| e.id == exercise || e.name.eq_ignore_ascii_case(exercise))
        .ok_or_else(|| {
            Error::Session(format!("{} is not part of {}", exercise, workout.name))
        })?;

    let ledger = read_ledger(&p.set_journal)?;
    let set_number = set.unwrap_or_else(|| ledger.next_set_number(&spec.id));

    // Sets are logged against the currently prescribed weight unless the
    // caller says otherwise.
    let state = TrainingState::load(&p.state)?;
    let prescribed = state
        .exercises
        .get(&spec.id)
        .map_or(spec.start_weight, |s| s.current_weight);

    let logged = LoggedSet {
        exercise_id: spec.id.clone(),
        set_number,
        reps_completed: reps,
        weight_used: weight.unwrap_or(prescribed),
        rpe,
    };
    JsonlSetJournal::new(&p.set_journal).append(&logged)?;

    println!(
        "✓ {}: set {} — {} reps @ {} lb",
        spec.name,
        set_number,
        reps,
        display_weight(logged.weight_used)
    );

    Ok(())
}

fn cmd_status(data_dir: &Path, config: &Config) -> Result<()> {
    let p = paths(data_dir);

    let Some(active) = ActiveSession::load(&p.active)? else {
        println!("No active session. Start one with `liftlog start <workout>`.");
        return Ok(());
    };

    let workout = find_workout(config, &active.workout_id)?;
    let ledger = read_ledger(&p.set_journal)?;

    println!(
        "{} — started {}",
        workout.name,
        active.started_at.format("%Y-%m-%d %H:%M")
    );
    for spec in &workout.exercises {
        let sets = ledger.sets_for(&spec.id);
        let reps: Vec<String> = sets.iter().map(|s| s.reps_completed.to_string()).collect();
        println!(
            "  {}: {}/{} sets  [{}]",
            spec.name,
            sets.len(),
            spec.target_sets,
            reps.join(" ")
        );
    }

    Ok(())
}

fn cmd_finish(data_dir: &Path, config: &Config) -> Result<()> {
    let p = paths(data_dir);
    let active = require_active(&p)?;
    let workout = find_workout(config, &active.workout_id)?;
    let ledger = read_ledger(&p.set_journal)?;

    let mut store = FileStore::open(&p.state)?;
    let summary = run_session(
        &workout,
        &ledger,
        &mut store,
        &active,
        Utc::now(),
        config.persistence.commit_retries,
    )?;

    for result in &summary.results {
        let name = workout
            .exercises
            .iter()
            .find(|e| e.id == result.exercise_id)
            .map_or(result.exercise_id.as_str(), |e| e.name.as_str());

        match result.outcome {
            Outcome::Advance => println!(
                "  {}: {} → {} lb",
                name,
                display_weight(result.previous_weight),
                display_weight(result.new_weight)
            ),
            Outcome::Repeat => println!(
                "  {}: failed attempt {}/{}, repeating {} lb",
                name,
                result.new_failed_attempts,
                DELOAD_THRESHOLD,
                display_weight(result.new_weight)
            ),
            Outcome::Deload => println!(
                "  {}: deloaded {} → {} lb",
                name,
                display_weight(result.previous_weight),
                display_weight(result.new_weight)
            ),
            Outcome::Skipped => println!("  {}: skipped", name),
        }
    }

    // The session record and the set archive survive even if some state
    // commits failed; the failures are reported below.
    JsonlSessionLog::new(&p.session_log).append(&summary.session)?;

    if p.set_journal.exists() {
        let archived = p
            .session_dir
            .join(format!("sets-{}.jsonl", summary.session.id));
        std::fs::rename(&p.set_journal, &archived)?;
    }
    ActiveSession::clear(&p.active)?;

    if !summary.all_committed() {
        for failure in &summary.commit_failures {
            eprintln!(
                "  ✗ {}: state not saved: {}",
                failure.exercise_id, failure.detail
            );
        }
        return Err(Error::Session(format!(
            "{} exercise state update(s) failed",
            summary.commit_failures.len()
        )));
    }

    println!(
        "\n✓ Workout complete in {} min — weights adjusted for next session",
        summary.session.duration_minutes
    );

    Ok(())
}

fn cmd_weight(data_dir: &Path, exercise: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidState(format!(
            "{}: working weight must be non-negative, got {}",
            exercise, value
        )));
    }

    let p = paths(data_dir);
    // A manual weight change resets the miss count, same as any other weight
    // change.
    TrainingState::update(&p.state, |state| {
        state.exercises.insert(
            exercise.to_string(),
            ProgressionState {
                current_weight: value,
                failed_attempts: 0,
            },
        );
        Ok(())
    })?;

    println!("✓ {} working weight set to {} lb", exercise, display_weight(value));
    Ok(())
}

fn cmd_history(data_dir: &Path, config: &Config, days: i64) -> Result<()> {
    let p = paths(data_dir);
    let sessions = load_recent_sessions(&p.session_log, &p.csv, days)?;

    if sessions.is_empty() {
        println!("No sessions in the last {} days.", days);
        return Ok(());
    }

    let workouts = available_workouts(config)?;
    for session in &sessions {
        let name = workouts
            .iter()
            .find(|w| w.id == session.workout_id)
            .map_or(session.workout_id.as_str(), |w| w.name.as_str());
        println!(
            "{}  {} — {} min",
            session.session_date, name, session.duration_minutes
        );
    }

    Ok(())
}

fn cmd_rollup(data_dir: &Path, cleanup: bool) -> Result<()> {
    let p = paths(data_dir);

    if !p.session_log.exists() {
        println!("No session log found - nothing to roll up.");
        return Ok(());
    }

    let count = lift_core::csv_rollup::log_to_csv_and_archive(&p.session_log, &p.csv)?;

    println!("✓ Rolled up {} sessions to CSV", count);
    println!("  CSV: {}", p.csv.display());

    if cleanup {
        let cleaned = lift_core::csv_rollup::cleanup_processed_logs(&p.log_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed log files", cleaned);
        }
    }

    Ok(())
}
