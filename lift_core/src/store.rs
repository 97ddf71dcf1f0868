//! Per-exercise progression state persistence with file locking.
//!
//! All exercise states live in one JSON document that is replaced atomically
//! on every commit, so a crash can never expose a weight without its matching
//! failed-attempt count.

use crate::session::ProgressionStore;
use crate::{Error, ProgressionState, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// All persisted progression states, keyed by exercise id.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TrainingState {
    pub exercises: HashMap<String, ProgressionState>,
}

impl TrainingState {
    /// Load state from a file with shared locking.
    ///
    /// Returns default state if file doesn't exist.
    /// If file is corrupted, logs a warning and returns default state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No state file found, using default state");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open state file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock state file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read state file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<TrainingState>(&contents) {
            Ok(state) => {
                tracing::debug!("Loaded training state from {:?}", path);
                Ok(state)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse state file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save state to a file with exclusive locking.
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "state path missing parent")
        })?)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved training state to {:?}", path);
        Ok(())
    }

    /// Load state, modify it, and save it back atomically.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut TrainingState) -> Result<()>,
    {
        let mut state = Self::load(path)?;
        f(&mut state)?;
        state.save(path)?;
        Ok(state)
    }
}

/// [`ProgressionStore`] backed by a single JSON state file.
pub struct FileStore {
    path: PathBuf,
    state: TrainingState,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = TrainingState::load(&path)?;
        Ok(Self { path, state })
    }

    pub fn state(&self) -> &TrainingState {
        &self.state
    }
}

impl ProgressionStore for FileStore {
    fn state_for(&self, exercise_id: &str) -> Option<ProgressionState> {
        self.state.exercises.get(exercise_id).cloned()
    }

    fn commit(&mut self, exercise_id: &str, state: &ProgressionState) -> Result<()> {
        // Re-read under the update so commits from other processes between
        // open and finish are not clobbered.
        let updated = TrainingState::update(&self.path, |s| {
            s.exercises.insert(exercise_id.to_string(), state.clone());
            Ok(())
        })?;
        self.state = updated;
        Ok(())
    }
}
