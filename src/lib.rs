//! Sync Planner Pomodoro Timer Library
//!
//! This library provides the core functionality for the Pomodoro timer CLI.
//! It includes:
//! - Timer engine with mode transitions and wall-clock tick accounting
//! - Snapshot persistence with lenient repair of stored state
//! - A single-owner scheduler service for interactive use
//! - CLI command parsing and display utilities
//! - Completion cues (synthesized tone or terminal bell)
//! - Type definitions for configuration, state, and daily stats

pub mod cli;
pub mod engine;
pub mod sound;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{TimerConfig, TimerMode, TimerState, TimerStats};

// Re-export engine types
pub use engine::{
    Clock, Command, MockClock, SystemClock, TimerEngine, TimerEvent, TimerService, TimerSnapshot,
    TimerView, Transition,
};

// Re-export persistence types
pub use store::{JsonFileStore, MemoryStore, Persister, SnapshotStore, StoreError};

// Re-export sound types
pub use sound::{Cue, MockSoundPlayer, RodioSoundPlayer, SoundError, SoundPlayer};
