//! Append-only set journal for the session in progress.
//!
//! Sets are appended to a JSONL (JSON Lines) file with file locking to
//! ensure safe concurrent access. The duplicate-set check runs against the
//! journal contents while the exclusive lock is held, so two writers racing
//! on the same set number cannot both win.

use crate::{Error, LoggedSet, Result, SetLedger};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Set sink trait for persisting logged sets
pub trait SetSink {
    fn append(&mut self, set: &LoggedSet) -> Result<()>;
}

/// JSONL-based set journal with file locking
pub struct JsonlSetJournal {
    path: PathBuf,
}

impl JsonlSetJournal {
    /// Create a new journal for the given path
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

impl SetSink for JsonlSetJournal {
    fn append(&mut self, set: &LoggedSet) -> Result<()> {
        if set.set_number == 0 {
            return Err(Error::InvalidSet(format!(
                "set number must be positive (exercise {})",
                set.exercise_id
            )));
        }

        self.ensure_parent_dir()?;

        // Open readable so the duplicate scan and the append happen against
        // the same locked handle
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let duplicate = {
            let reader = BufReader::new(&file);
            scan_for_duplicate(reader, set)
        };
        if duplicate {
            file.unlock()?;
            return Err(Error::DuplicateSet {
                exercise_id: set.exercise_id.clone(),
                set_number: set.set_number,
            });
        }

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(set)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!(
            "Appended set {} of {} to journal",
            set.set_number,
            set.exercise_id
        );
        Ok(())
    }
}

fn scan_for_duplicate(reader: impl BufRead, set: &LoggedSet) -> bool {
    for line in reader.lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        if let Ok(existing) = serde_json::from_str::<LoggedSet>(&line) {
            if existing.exercise_id == set.exercise_id && existing.set_number == set.set_number {
                return true;
            }
        }
    }
    false
}

/// Rebuild the session's ledger from a journal file.
///
/// Unparseable lines are logged and skipped; a duplicate entry (only possible
/// if the file was edited by hand) keeps its first occurrence.
pub fn read_ledger(path: &Path) -> Result<SetLedger> {
    let mut ledger = SetLedger::new();
    if !path.exists() {
        return Ok(ledger);
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<LoggedSet>(&line) {
            Ok(set) => {
                if let Err(e) = ledger.insert(set) {
                    tracing::warn!("Ignoring journal line {}: {}", line_num + 1, e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to parse set at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} sets from journal", ledger.len());
    Ok(ledger)
}
