//! Persistable snapshot of the timer.
//!
//! Snapshots serialize to a camelCase JSON document. Reading is lenient:
//! unknown keys are ignored, missing or malformed fields fall back to their
//! defaults one by one, and documents written by the browser version of the
//! planner (`durations`, `remaining`, `pomodoros`, ...) are understood.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::types::{TimerConfig, TimerMode, TimerState, TimerStats};

use super::clock::Clock;
use super::timer::TimerEngine;

/// Current snapshot document version.
pub const SNAPSHOT_VERSION: u32 = 1;

// ============================================================================
// TimerSnapshot
// ============================================================================

/// Serialized form of `TimerState`, including its configuration.
///
/// Deserializing goes through [`TimerSnapshot::from_value`], so it never
/// fails on a JSON document and always yields a valid state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct TimerSnapshot {
    /// Document version
    pub version: u32,
    /// Mode durations and cycle length
    pub config: TimerConfig,
    /// Current mode
    pub mode: TimerMode,
    /// Seconds left in the current mode
    pub remaining_seconds: u32,
    /// Whether the countdown was advancing
    pub running: bool,
    /// Current or next work session within the cycle
    pub session_index: u32,
    /// Daily statistics
    pub stats: TimerStats,
    /// Elapsed-time reference, present only while running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tick: Option<u64>,
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::from(&TimerState::default())
    }
}

impl From<&TimerState> for TimerSnapshot {
    fn from(state: &TimerState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            config: state.config,
            mode: state.mode,
            remaining_seconds: state.remaining_seconds,
            running: state.running,
            session_index: state.session_index,
            stats: state.stats,
            last_tick: state.last_tick,
        }
    }
}

impl TimerSnapshot {
    /// Converts the snapshot into a valid `TimerState`.
    pub fn into_state(self) -> TimerState {
        let mut state = TimerState {
            config: self.config,
            mode: self.mode,
            remaining_seconds: self.remaining_seconds,
            running: self.running,
            session_index: self.session_index,
            stats: self.stats,
            last_tick: self.last_tick,
        };
        state.normalize();
        state
    }

    /// Parses a JSON document, repairing malformed fields.
    ///
    /// # Errors
    ///
    /// Returns an error only if the text is not JSON at all.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    /// Serializes the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Builds a snapshot from an arbitrary JSON value, field by field.
    ///
    /// Never fails: anything unusable is replaced by its default.
    pub fn from_value(value: &Value) -> Self {
        let Some(doc) = value.as_object() else {
            warn!("Snapshot is not an object, using defaults");
            return Self::default();
        };

        let config = read_config(doc);
        let mode = doc
            .get("mode")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<TimerMode>().ok())
            .unwrap_or_default();
        let remaining_seconds = first_of(doc, &["remainingSeconds", "remaining"])
            .and_then(read_u64)
            .map(saturate_u32)
            .unwrap_or_else(|| config.duration(mode));
        let running = doc.get("running").and_then(Value::as_bool).unwrap_or(false);
        let session_index = doc
            .get("sessionIndex")
            .and_then(read_u64)
            .map(saturate_u32)
            .unwrap_or(1);
        let stats = doc
            .get("stats")
            .and_then(Value::as_object)
            .map(read_stats)
            .unwrap_or_default();
        let last_tick = doc.get("lastTick").and_then(read_u64);

        let state = TimerState {
            config,
            mode,
            remaining_seconds,
            running,
            session_index,
            stats,
            last_tick,
        };
        Self::from(&normalized(state))
    }
}

impl From<Value> for TimerSnapshot {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

fn normalized(mut state: TimerState) -> TimerState {
    state.normalize();
    state
}

// ============================================================================
// Field readers
// ============================================================================

/// Returns the first present key's value.
fn first_of<'a>(doc: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| doc.get(*key).filter(|v| !v.is_null()))
}

/// Reads a finite number, accepting numeric strings.
fn read_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Reads a non-negative integer, flooring fractions.
fn read_u64(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let number = read_number(value)?;
    // `as` saturates for out-of-range floats
    (number >= 0.0).then(|| number.floor() as u64)
}

/// Reads a duration: non-positive numbers clamp to one second.
fn read_duration(value: Option<&Value>, default: u32) -> u32 {
    match value.and_then(read_number) {
        Some(n) if n < 1.0 => 1,
        Some(n) => saturate_u32(n.floor() as u64),
        None => default,
    }
}

fn saturate_u32(n: u64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn read_config(doc: &Map<String, Value>) -> TimerConfig {
    let defaults = TimerConfig::default();
    let section = first_of(doc, &["config", "durations"]).and_then(Value::as_object);
    let field = |key: &str| section.and_then(|s| s.get(key));

    TimerConfig {
        work: read_duration(field("work"), defaults.work),
        short_break: read_duration(field("shortBreak"), defaults.short_break),
        long_break: read_duration(field("longBreak"), defaults.long_break),
        sessions_per_cycle: read_duration(
            field("sessionsPerCycle").or_else(|| doc.get("sessionsPerCycle")),
            defaults.sessions_per_cycle,
        ),
    }
}

fn read_count(doc: &Map<String, Value>, keys: &[&str]) -> u32 {
    first_of(doc, keys)
        .and_then(read_u64)
        .map(saturate_u32)
        .unwrap_or(0)
}

fn read_stats(doc: &Map<String, Value>) -> TimerStats {
    TimerStats {
        completed_pomodoros: read_count(doc, &["completedPomodoros", "pomodoros"]),
        focus_seconds: first_of(doc, &["focusSeconds", "focusSecondsAccumulated"])
            .and_then(read_u64)
            .unwrap_or(0),
        completed_breaks: read_count(doc, &["completedBreaks", "breaks"]),
        streak: read_count(doc, &["streak"]),
    }
}

// ============================================================================
// TimerEngine integration
// ============================================================================

impl TimerEngine {
    /// Restores an engine from a snapshot.
    pub fn restore(snapshot: TimerSnapshot, clock: Arc<dyn Clock>) -> Self {
        Self::from_state(snapshot.into_state(), clock)
    }

    /// Captures the current state for persistence.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::from(self.state())
    }
}

// ============================================================================
// Tests
// ============================================================================
