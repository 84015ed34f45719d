//! Snapshot persistence for the Pomodoro timer.
//!
//! This module provides:
//!
//! - `SnapshotStore`: the load/save seam the host persists through
//! - `JsonFileStore`: pretty JSON on disk, written atomically
//! - `MemoryStore`: in-memory store for tests
//! - `Persister`: fire-and-forget background writer
//!
//! Persistence is best effort. A failed write is logged and dropped; the
//! next mutation simply tries again.

mod error;
mod file;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::TimerSnapshot;

pub use error::StoreError;
pub use file::{default_state_path, JsonFileStore, APP_DIR_NAME, STATE_FILE_NAME};

/// Load/save seam for timer snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Loads the stored snapshot, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored data cannot be read or is not JSON.
    fn load(&self) -> Result<Option<TimerSnapshot>, StoreError>;

    /// Saves a snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save(&self, snapshot: &TimerSnapshot) -> Result<(), StoreError>;
}

/// Loads a snapshot, falling back to defaults on any failure.
pub fn load_or_default(store: &dyn SnapshotStore) -> TimerSnapshot {
    match store.load() {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => TimerSnapshot::default(),
        Err(e) if e.is_corrupt() => {
            warn!("Timer snapshot is corrupt, starting fresh: {}", e);
            TimerSnapshot::default()
        }
        Err(e) => {
            warn!("Could not load timer snapshot, starting fresh: {}", e);
            TimerSnapshot::default()
        }
    }
}

/// Saves a snapshot, logging and swallowing failures.
///
/// Returns true if the write succeeded.
pub fn save_best_effort(store: &dyn SnapshotStore, snapshot: &TimerSnapshot) -> bool {
    match store.save(snapshot) {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not persist timer snapshot: {}", e);
            false
        }
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory snapshot store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<TimerSnapshot>>,
    should_fail: AtomicBool,
    save_count: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: TimerSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Returns the last saved snapshot.
    #[must_use]
    pub fn current(&self) -> Option<TimerSnapshot> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<TimerSnapshot>, StoreError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock failure".to_string()));
        }
        Ok(self.current())
    }

    fn save(&self, snapshot: &TimerSnapshot) -> Result<(), StoreError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock failure".to_string()));
        }
        *self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(snapshot.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Persister
// ============================================================================

/// Writes snapshots on a background task so callers never wait on I/O.
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct Persister {
    tx: mpsc::UnboundedSender<TimerSnapshot>,
    handle: JoinHandle<()>,
}

impl Persister {
    /// Spawns the writer task.
    pub fn spawn(store: Arc<dyn SnapshotStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<TimerSnapshot>();

        let handle = tokio::spawn(async move {
            while let Some(mut snapshot) = rx.recv().await {
                // Only the newest queued snapshot matters.
                while let Ok(newer) = rx.try_recv() {
                    snapshot = newer;
                }
                save_best_effort(store.as_ref(), &snapshot);
            }
            debug!("Persister stopped");
        });

        Self { tx, handle }
    }

    /// Queues a snapshot for writing. Never blocks and never fails.
    pub fn persist(&self, snapshot: TimerSnapshot) {
        if self.tx.send(snapshot).is_err() {
            warn!("Persister task is gone, snapshot dropped");
        }
    }

    /// Writes everything still queued and stops the writer.
    pub async fn flush(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            warn!("Persister task failed: {}", e);
        }
    }
}
