//! JSON file snapshot store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::engine::TimerSnapshot;

use super::error::StoreError;
use super::SnapshotStore;

/// Application directory under the platform data directory.
pub const APP_DIR_NAME: &str = "syncplanner";

/// Snapshot file name inside the application directory.
pub const STATE_FILE_NAME: &str = "pomodoro.json";

/// Returns the default state file path, e.g.
/// `~/.local/share/syncplanner/pomodoro.json` on Linux.
///
/// # Errors
///
/// Returns `StoreError::NoDataDir` if the platform has no data directory.
pub fn default_state_path() -> Result<PathBuf, StoreError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(STATE_FILE_NAME))
        .ok_or(StoreError::NoDataDir)
}

/// Stores the snapshot as a pretty-printed JSON file.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store at the given path. Nothing is touched until the
    /// first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default state path.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory is available.
    pub fn at_default_path() -> Result<Self, StoreError> {
        default_state_path().map(Self::new)
    }

    /// Returns the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| STATE_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<TimerSnapshot>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let snapshot = TimerSnapshot::from_json(&text)?;
        debug!("Loaded snapshot from {}", self.path.display());
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &TimerSnapshot) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = snapshot.to_json()?;
        let temp = self.temp_path();
        fs::write(&temp, json).map_err(write_err)?;
        fs::rename(&temp, &self.path).map_err(write_err)?;

        debug!("Saved snapshot to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimerMode;

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/state.json"));

        let mut snapshot = TimerSnapshot::default();
        snapshot.mode = TimerMode::LongBreak;
        snapshot.remaining_seconds = 42;
        store.save(&snapshot).unwrap();

        assert_eq!(store.load().unwrap(), Some(snapshot));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        store.save(&TimerSnapshot::default()).unwrap();
        let mut snapshot = TimerSnapshot::default();
        snapshot.session_index = 3;
        store.save(&snapshot).unwrap();

        assert_eq!(store.load().unwrap().unwrap().session_index, 3);
    }

    #[test]
    fn test_load_garbage_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json at all").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_load_partial_document_is_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"mode":"shortBreak","stats":{"pomodoros":2}}"#).unwrap();

        let snapshot = JsonFileStore::new(&path).load().unwrap().unwrap();
        assert_eq!(snapshot.mode, TimerMode::ShortBreak);
        assert_eq!(snapshot.remaining_seconds, 300);
        assert_eq!(snapshot.stats.completed_pomodoros, 2);
    }

    #[test]
    fn test_save_into_file_parent_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let store = JsonFileStore::new(blocker.join("state.json"));
        assert!(matches!(
            store.save(&TimerSnapshot::default()),
            Err(StoreError::Write { .. })
        ));
    }

    #[test]
    fn test_default_state_path_file_name() {
        if let Ok(path) = default_state_path() {
            assert!(path.ends_with("syncplanner/pomodoro.json"));
        }
    }
}
