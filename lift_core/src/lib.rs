#![forbid(unsafe_code)]

//! Core domain model and business logic for the Liftlog training tracker.
//!
//! This crate provides:
//! - Domain types (exercises, workouts, sets, sessions)
//! - Set ledger (per-session record of logged sets)
//! - Progression evaluator (advance / repeat / deload decisions)
//! - Session orchestrator
//! - Persistence (state store, set journal, session log, CSV archive)
//! - Workout catalog and configuration

pub mod types;
pub mod error;
pub mod ledger;
pub mod progression;
pub mod session;
pub mod store;
pub mod journal;
pub mod session_log;
pub mod csv_rollup;
pub mod history;
pub mod catalog;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use ledger::SetLedger;
pub use progression::{evaluate, DEADLIFT_INCREMENT, DELOAD_THRESHOLD};
pub use session::{run_session, ActiveSession, MemoryStore, ProgressionStore};
pub use store::{FileStore, TrainingState};
pub use journal::{read_ledger, JsonlSetJournal, SetSink};
pub use session_log::{JsonlSessionLog, SessionSink};
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use config::Config;
pub use history::load_recent_sessions;
