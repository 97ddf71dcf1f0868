//! Session history loading with a rolling day window.
//!
//! This module merges recent sessions from the live session log and the CSV
//! archive, deduplicating sessions that appear in both.

use crate::{Result, TrainingSession};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// CSV row format for reading archived sessions
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    workout_id: String,
    session_date: String,
    started_at: String,
    completed_at: String,
    duration_minutes: u32,
}

impl TryFrom<CsvRow> for TrainingSession {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::State(format!("Invalid UUID: {}", e)))?;

        let session_date = row
            .session_date
            .parse::<NaiveDate>()
            .map_err(|e| crate::Error::State(format!("Invalid date: {}", e)))?;

        let started_at = parse_timestamp(&row.started_at)?;
        let completed_at = parse_timestamp(&row.completed_at)?;

        Ok(TrainingSession {
            id,
            workout_id: row.workout_id,
            session_date,
            started_at,
            completed_at,
            duration_minutes: row.duration_minutes,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| crate::Error::State(format!("Invalid timestamp: {}", e)))
}

/// Load sessions from the last N days from both the log and the CSV archive
///
/// Returns sessions sorted by completed_at (newest first).
/// Automatically deduplicates sessions that appear in both sources.
pub fn load_recent_sessions(
    log_path: &Path,
    csv_path: &Path,
    days: i64,
) -> Result<Vec<TrainingSession>> {
    let cutoff = Utc::now() - Duration::days(days);
    let mut sessions = Vec::new();
    let mut seen_ids = HashSet::new();

    // Live log first (most recent)
    if log_path.exists() {
        let log_sessions = crate::session_log::read_sessions(log_path)?;
        for session in log_sessions {
            if session.completed_at >= cutoff {
                seen_ids.insert(session.id);
                sessions.push(session);
            }
        }
        tracing::debug!("Loaded {} sessions from log", sessions.len());
    }

    // CSV archive second
    if csv_path.exists() {
        let csv_sessions = load_sessions_from_csv(csv_path)?;
        let mut csv_count = 0;
        for session in csv_sessions {
            if session.completed_at >= cutoff && !seen_ids.contains(&session.id) {
                seen_ids.insert(session.id);
                sessions.push(session);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} sessions from CSV", csv_count);
    }

    // Sort by completed_at, newest first
    sessions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

    tracing::info!(
        "Loaded {} total sessions from last {} days",
        sessions.len(),
        days
    );

    Ok(sessions)
}

/// Load all sessions from a CSV file
fn load_sessions_from_csv(path: &Path) -> Result<Vec<TrainingSession>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut sessions = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match TrainingSession::try_from(row) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                    // Continue processing other rows
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(sessions)
}
