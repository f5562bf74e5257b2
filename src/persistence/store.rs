//! JSON state file with atomic replace

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::types::{PersistedState, PersistenceError, STATE_VERSION};

/// Reads and writes `state.json`
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state, falling back to empty state when the file is
    /// missing or cannot be used
    pub fn load(&self) -> PersistedState {
        match self.try_load() {
            Ok(Some(state)) => {
                debug!(
                    path = ?self.path,
                    tickers = state.tickers.len(),
                    positions = state.positions.len(),
                    trades = state.trades.len(),
                    "Loaded persisted state"
                );
                state
            }
            Ok(None) => PersistedState::default(),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Ignoring unreadable state file");
                PersistedState::default()
            }
        }
    }

    /// Load the state; Ok(None) when no file exists
    pub fn try_load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };
        let state: PersistedState = serde_json::from_str(&raw)?;
        if state.version != STATE_VERSION {
            return Err(PersistenceError::Version {
                found: state.version,
                expected: STATE_VERSION,
            });
        }
        Ok(Some(state))
    }

    /// Write to a sibling temp file, then rename over the target
    pub fn save(&self, state: &PersistedState) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;
        }
        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| PersistenceError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| PersistenceError::io(&self.path, e))?;
        debug!(path = ?self.path, "Saved state");
        Ok(())
    }
}
