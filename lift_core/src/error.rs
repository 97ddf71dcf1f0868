//! Error types for the lift_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lift_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Exercise prescription is malformed (caller/data-integrity bug)
    #[error("invalid exercise spec: {0}")]
    InvalidSpec(String),

    /// Persisted progression state is malformed (caller/data-integrity bug)
    #[error("invalid progression state: {0}")]
    InvalidState(String),

    /// Logged set is malformed (non-positive set number)
    #[error("invalid set: {0}")]
    InvalidSet(String),

    /// A set with this number was already logged for this exercise
    #[error("duplicate set {set_number} for exercise {exercise_id}")]
    DuplicateSet {
        exercise_id: String,
        set_number: u32,
    },

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),

    /// Session workflow error
    #[error("Session error: {0}")]
    Session(String),
}
