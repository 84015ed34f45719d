//! Snapshot store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing snapshots.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the snapshot failed.
    #[error("failed to read snapshot from {path}: {source}")]
    Read {
        /// Location of the snapshot
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing the snapshot failed.
    #[error("failed to write snapshot to {path}: {source}")]
    Write {
        /// Location of the snapshot
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The stored text is not JSON.
    #[error("snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// No state directory could be determined.
    #[error("could not determine a data directory for the state file")]
    NoDataDir,

    /// Generic store failure (used by in-memory stores).
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if the stored data exists but could not be understood.
    ///
    /// Callers fall back to a default snapshot in this case.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}
