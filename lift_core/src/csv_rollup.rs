//! CSV rollup functionality for archiving the session log.
//!
//! This module implements atomic log-to-CSV conversion with proper error
//! handling to prevent data loss.

use crate::{Result, TrainingSession};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    workout_id: String,
    session_date: String,
    started_at: String,
    completed_at: String,
    duration_minutes: u32,
}

impl From<&TrainingSession> for CsvRow {
    fn from(session: &TrainingSession) -> Self {
        CsvRow {
            id: session.id.to_string(),
            workout_id: session.workout_id.clone(),
            session_date: session.session_date.to_string(),
            started_at: session.started_at.to_rfc3339(),
            completed_at: session.completed_at.to_rfc3339(),
            duration_minutes: session.duration_minutes,
        }
    }
}

/// Roll up logged sessions into CSV and archive the log atomically
///
/// This function:
/// 1. Reads all sessions from the log
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the log to .processed
/// 5. Returns the number of sessions processed
///
/// # Safety
/// - CSV is fsynced before the log is renamed
/// - The log is renamed (not deleted) to allow manual recovery if needed
/// - Processed log files can be cleaned up separately
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let sessions = crate::session_log::read_sessions(log_path)?;

    if sessions.is_empty() {
        tracing::info!("No sessions in log to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only when the file is brand new
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for session in &sessions {
        let row = CsvRow::from(session);
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} sessions to CSV", sessions.len());

    // Atomically archive the log by renaming it
    let processed_path = log_path.with_extension("jsonl.processed");
    std::fs::rename(log_path, &processed_path)?;

    tracing::info!("Archived session log to {:?}", processed_path);

    Ok(sessions.len())
}

/// Clean up old processed log files
///
/// This removes all .processed files in the given directory.
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed log: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed log files", count);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_log::{JsonlSessionLog, SessionSink};
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_session(workout_id: &str) -> TrainingSession {
        let now = Utc::now();
        TrainingSession {
            id: Uuid::new_v4(),
            workout_id: workout_id.into(),
            session_date: now.date_naive(),
            started_at: now,
            completed_at: now,
            duration_minutes: 40,
        }
    }

    #[test]
    fn test_log_to_csv_creates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSessionLog::new(&log_path);
        for i in 0..3 {
            sink.append(&create_test_session(&format!("workout_{}", i)))
                .unwrap();
        }

        let count = log_to_csv_and_archive(&log_path, &csv_path).unwrap();
        assert_eq!(count, 3);

        assert!(csv_path.exists());
        assert!(!log_path.exists());
        assert!(log_path.with_extension("jsonl.processed").exists());
    }

    #[test]
    fn test_log_to_csv_appends_without_duplicate_headers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSessionLog::new(&log_path);
        sink.append(&create_test_session("workout_a")).unwrap();
        assert_eq!(log_to_csv_and_archive(&log_path, &csv_path).unwrap(), 1);

        let mut sink = JsonlSessionLog::new(&log_path);
        sink.append(&create_test_session("workout_b")).unwrap();
        assert_eq!(log_to_csv_and_archive(&log_path, &csv_path).unwrap(), 1);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        let header_count = contents
            .lines()
            .filter(|l| l.starts_with("id,workout_id"))
            .count();
        assert_eq!(header_count, 1);
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_empty_log_is_a_noop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        let count = log_to_csv_and_archive(&log_path, &csv_path).unwrap();
        assert_eq!(count, 0);
        assert!(!csv_path.exists());
    }

    #[test]
    fn test_cleanup_processed_logs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("sessions.jsonl");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSessionLog::new(&log_path);
        sink.append(&create_test_session("workout_a")).unwrap();
        log_to_csv_and_archive(&log_path, &csv_path).unwrap();

        let cleaned = cleanup_processed_logs(temp_dir.path()).unwrap();
        assert_eq!(cleaned, 1);
        assert!(!log_path.with_extension("jsonl.processed").exists());
    }
}
