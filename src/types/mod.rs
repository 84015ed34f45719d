//! Core data types for the Pomodoro timer.
//!
//! This module defines the data structures used for:
//! - Timer modes and their display labels
//! - Timer configuration with sanitization
//! - Daily statistics
//! - The mutable timer state owned by the engine

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Minimum duration of any mode, in seconds.
pub const MIN_DURATION_SECS: u32 = 1;

/// Default work duration (25 minutes).
pub const DEFAULT_WORK_SECS: u32 = 25 * 60;

/// Default short break duration (5 minutes).
pub const DEFAULT_SHORT_BREAK_SECS: u32 = 5 * 60;

/// Default long break duration (15 minutes).
pub const DEFAULT_LONG_BREAK_SECS: u32 = 15 * 60;

/// Default number of work sessions before a long break.
pub const DEFAULT_SESSIONS_PER_CYCLE: u32 = 4;

// ============================================================================
// TimerMode
// ============================================================================

/// The activity phase the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    /// Focused work session
    #[default]
    Work,
    /// Short break between work sessions
    ShortBreak,
    /// Long break at the end of a cycle
    LongBreak,
}

impl TimerMode {
    /// All modes, in cycle order.
    pub const ALL: [TimerMode; 3] = [TimerMode::Work, TimerMode::ShortBreak, TimerMode::LongBreak];

    /// Returns the key used in persisted documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::ShortBreak => "shortBreak",
            TimerMode::LongBreak => "longBreak",
        }
    }

    /// Returns the human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Work => "Deep Work",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    /// Returns true for either break mode.
    pub fn is_break(&self) -> bool {
        matches!(self, TimerMode::ShortBreak | TimerMode::LongBreak)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = String;

    /// Accepts the persisted key as well as kebab/snake spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(TimerMode::Work),
            "shortbreak" | "short-break" | "short_break" => Ok(TimerMode::ShortBreak),
            "longbreak" | "long-break" | "long_break" => Ok(TimerMode::LongBreak),
            other => Err(format!("unknown timer mode: {other}")),
        }
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Durations for each mode plus the cycle length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    /// Work duration in seconds
    pub work: u32,
    /// Short break duration in seconds
    pub short_break: u32,
    /// Long break duration in seconds
    pub long_break: u32,
    /// Number of work sessions before a long break
    pub sessions_per_cycle: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work: DEFAULT_WORK_SECS,
            short_break: DEFAULT_SHORT_BREAK_SECS,
            long_break: DEFAULT_LONG_BREAK_SECS,
            sessions_per_cycle: DEFAULT_SESSIONS_PER_CYCLE,
        }
    }
}

impl TimerConfig {
    /// Creates a configuration with the specified work duration.
    pub fn with_work(mut self, seconds: u32) -> Self {
        self.work = seconds;
        self
    }

    /// Creates a configuration with the specified short break duration.
    pub fn with_short_break(mut self, seconds: u32) -> Self {
        self.short_break = seconds;
        self
    }

    /// Creates a configuration with the specified long break duration.
    pub fn with_long_break(mut self, seconds: u32) -> Self {
        self.long_break = seconds;
        self
    }

    /// Creates a configuration with the specified cycle length.
    pub fn with_sessions_per_cycle(mut self, sessions: u32) -> Self {
        self.sessions_per_cycle = sessions;
        self
    }

    /// Returns a copy with every value clamped to its minimum.
    ///
    /// Configuration is never rejected; zero durations become one second
    /// and a zero-length cycle becomes one session.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            work: self.work.max(MIN_DURATION_SECS),
            short_break: self.short_break.max(MIN_DURATION_SECS),
            long_break: self.long_break.max(MIN_DURATION_SECS),
            sessions_per_cycle: self.sessions_per_cycle.max(1),
        }
    }

    /// Returns the configured duration for a mode, in seconds.
    pub fn duration(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Work => self.work,
            TimerMode::ShortBreak => self.short_break,
            TimerMode::LongBreak => self.long_break,
        }
    }
}

// ============================================================================
// TimerStats
// ============================================================================

/// Per-day counters. Non-decreasing until the host signals a new day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerStats {
    /// Completed work sessions
    pub completed_pomodoros: u32,
    /// Seconds counted down while in work mode
    pub focus_seconds: u64,
    /// Completed breaks (short and long)
    pub completed_breaks: u32,
    /// Consecutive days with at least one completed pomodoro
    pub streak: u32,
}

impl TimerStats {
    /// Returns focus time rounded to whole minutes.
    pub fn focus_minutes(&self) -> u64 {
        self.focus_seconds.saturating_add(30) / 60
    }

    /// Returns the counters for the day after this one.
    ///
    /// The streak survives only if this day completed a pomodoro.
    #[must_use]
    pub fn rolled_over(&self) -> Self {
        Self {
            streak: if self.completed_pomodoros > 0 {
                self.streak
            } else {
                0
            },
            ..Self::default()
        }
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Mutable timer state. Owned by a single `TimerEngine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    /// Active configuration
    pub config: TimerConfig,
    /// Current mode
    pub mode: TimerMode,
    /// Seconds left in the current mode
    pub remaining_seconds: u32,
    /// Whether the countdown is advancing
    pub running: bool,
    /// Ordinal of the current or next work session within the cycle
    pub session_index: u32,
    /// Daily statistics
    pub stats: TimerStats,
    /// Wall-clock reference (Unix epoch milliseconds) for elapsed-time accounting
    pub last_tick: Option<u64>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

impl TimerState {
    /// Creates a stopped state in work mode at full duration.
    pub fn new(config: TimerConfig) -> Self {
        let config = config.sanitized();
        Self {
            config,
            mode: TimerMode::Work,
            remaining_seconds: config.work,
            running: false,
            session_index: 1,
            stats: TimerStats::default(),
            last_tick: None,
        }
    }

    /// Returns the full duration of the current mode.
    pub fn current_duration(&self) -> u32 {
        self.config.duration(self.mode)
    }

    /// Brings every field back inside its valid range.
    pub fn normalize(&mut self) {
        self.config = self.config.sanitized();
        self.remaining_seconds = self.remaining_seconds.min(self.current_duration());
        self.session_index = self
            .session_index
            .clamp(1, self.config.sessions_per_cycle);
        if !self.running {
            self.last_tick = None;
        }
    }

    /// Returns true if every invariant holds.
    pub fn is_valid(&self) -> bool {
        self.config == self.config.sanitized()
            && self.remaining_seconds <= self.current_duration()
            && (1..=self.config.sessions_per_cycle).contains(&self.session_index)
            && (self.running || self.last_tick.is_none())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // TimerMode Tests
    // ------------------------------------------------------------------------

    mod timer_mode_tests {
        use super::*;

        #[test]
        fn test_default_is_work() {
            assert_eq!(TimerMode::default(), TimerMode::Work);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(TimerMode::Work.as_str(), "work");
            assert_eq!(TimerMode::ShortBreak.as_str(), "shortBreak");
            assert_eq!(TimerMode::LongBreak.as_str(), "longBreak");
        }

        #[test]
        fn test_serialize_matches_as_str() {
            for mode in TimerMode::ALL {
                let json = serde_json::to_string(&mode).unwrap();
                assert_eq!(json, format!("\"{}\"", mode.as_str()));
            }
        }

        #[test]
        fn test_from_str_variants() {
            assert_eq!("work".parse::<TimerMode>().unwrap(), TimerMode::Work);
            assert_eq!(
                "short-break".parse::<TimerMode>().unwrap(),
                TimerMode::ShortBreak
            );
            assert_eq!(
                "shortBreak".parse::<TimerMode>().unwrap(),
                TimerMode::ShortBreak
            );
            assert_eq!(
                "LONG_BREAK".parse::<TimerMode>().unwrap(),
                TimerMode::LongBreak
            );
            assert!("nap".parse::<TimerMode>().is_err());
        }

        #[test]
        fn test_is_break() {
            assert!(!TimerMode::Work.is_break());
            assert!(TimerMode::ShortBreak.is_break());
            assert!(TimerMode::LongBreak.is_break());
        }
    }

    // ------------------------------------------------------------------------
    // TimerConfig Tests
    // ------------------------------------------------------------------------

    mod timer_config_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let config = TimerConfig::default();
            assert_eq!(config.work, 1500);
            assert_eq!(config.short_break, 300);
            assert_eq!(config.long_break, 900);
            assert_eq!(config.sessions_per_cycle, 4);
        }

        #[test]
        fn test_builder_pattern() {
            let config = TimerConfig::default()
                .with_work(3000)
                .with_short_break(600)
                .with_long_break(1200)
                .with_sessions_per_cycle(3);

            assert_eq!(config.duration(TimerMode::Work), 3000);
            assert_eq!(config.duration(TimerMode::ShortBreak), 600);
            assert_eq!(config.duration(TimerMode::LongBreak), 1200);
            assert_eq!(config.sessions_per_cycle, 3);
        }

        #[test]
        fn test_sanitized_clamps_zero_values() {
            let config = TimerConfig {
                work: 0,
                short_break: 0,
                long_break: 0,
                sessions_per_cycle: 0,
            }
            .sanitized();

            assert_eq!(config.work, 1);
            assert_eq!(config.short_break, 1);
            assert_eq!(config.long_break, 1);
            assert_eq!(config.sessions_per_cycle, 1);
        }

        #[test]
        fn test_sanitized_keeps_valid_values() {
            let config = TimerConfig::default();
            assert_eq!(config.sanitized(), config);
        }
    }

    // ------------------------------------------------------------------------
    // TimerStats Tests
    // ------------------------------------------------------------------------

    mod timer_stats_tests {
        use super::*;

        #[test]
        fn test_focus_minutes_rounds() {
            let stats = TimerStats {
                focus_seconds: 89,
                ..Default::default()
            };
            assert_eq!(stats.focus_minutes(), 1);

            let stats = TimerStats {
                focus_seconds: 90,
                ..Default::default()
            };
            assert_eq!(stats.focus_minutes(), 2);
        }

        #[test]
        fn test_rolled_over_keeps_streak_after_productive_day() {
            let stats = TimerStats {
                completed_pomodoros: 3,
                focus_seconds: 4500,
                completed_breaks: 2,
                streak: 5,
            };
            let next = stats.rolled_over();
            assert_eq!(next.completed_pomodoros, 0);
            assert_eq!(next.focus_seconds, 0);
            assert_eq!(next.completed_breaks, 0);
            assert_eq!(next.streak, 5);
        }

        #[test]
        fn test_rolled_over_breaks_streak_after_idle_day() {
            let stats = TimerStats {
                streak: 5,
                ..Default::default()
            };
            assert_eq!(stats.rolled_over().streak, 0);
        }
    }

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_new_state() {
            let state = TimerState::new(TimerConfig::default());

            assert_eq!(state.mode, TimerMode::Work);
            assert_eq!(state.remaining_seconds, 1500);
            assert!(!state.running);
            assert_eq!(state.session_index, 1);
            assert_eq!(state.stats, TimerStats::default());
            assert_eq!(state.last_tick, None);
            assert!(state.is_valid());
        }

        #[test]
        fn test_new_state_sanitizes_config() {
            let state = TimerState::new(TimerConfig::default().with_work(0));
            assert_eq!(state.config.work, 1);
            assert_eq!(state.remaining_seconds, 1);
        }

        #[test]
        fn test_normalize_repairs_out_of_range_fields() {
            let mut state = TimerState::new(TimerConfig::default());
            state.remaining_seconds = 99_999;
            state.session_index = 9;
            state.last_tick = Some(1_000);

            state.normalize();

            assert_eq!(state.remaining_seconds, 1500);
            assert_eq!(state.session_index, 4);
            assert_eq!(state.last_tick, None);
            assert!(state.is_valid());
        }

        #[test]
        fn test_normalize_raises_zero_session_index() {
            let mut state = TimerState::new(TimerConfig::default());
            state.session_index = 0;
            state.normalize();
            assert_eq!(state.session_index, 1);
        }
    }
}
