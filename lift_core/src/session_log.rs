//! Append-only log of completed training sessions.
//!
//! Sessions are appended to a JSONL (JSON Lines) file with file locking to
//! ensure safe concurrent access. The log is periodically rolled up into the
//! CSV archive (see `csv_rollup`).

use crate::{Result, TrainingSession};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Session sink trait for persisting completed sessions
pub trait SessionSink {
    fn append(&mut self, session: &TrainingSession) -> Result<()>;
}

/// JSONL-based session log with file locking
pub struct JsonlSessionLog {
    path: PathBuf,
}

impl JsonlSessionLog {
    /// Create a new session log for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SessionSink for JsonlSessionLog {
    fn append(&mut self, session: &TrainingSession) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(session)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended session {} to log", session.id);
        Ok(())
    }
}

/// Read all sessions from a log file
pub fn read_sessions(path: &Path) -> Result<Vec<TrainingSession>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut sessions = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<TrainingSession>(&line) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} sessions from log", sessions.len());
    Ok(sessions)
}
