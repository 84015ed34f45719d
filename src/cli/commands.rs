//! Command definitions for the Sync Planner timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::{TimerConfig, TimerMode};

// ============================================================================
// CLI Structure
// ============================================================================

/// Sync Planner Pomodoro timer
#[derive(Parser, Debug)]
#[command(
    name = "syncplanner",
    version,
    about = "Pomodoro timer with persistent sessions and daily stats",
    long_about = "A Pomodoro timer that keeps its state between runs.\n\
                  Work sessions alternate with short breaks; every few sessions \
                  a long break follows.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path of the state file (defaults to the platform data directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub state_file: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show current timer status
    Status,

    /// Start or resume the countdown
    Start,

    /// Pause the countdown
    Pause,

    /// Restore the full duration of the current mode
    Reset,

    /// Complete the current mode immediately
    Skip,

    /// Switch to a mode outside the normal cycle
    Mode {
        /// Mode to switch to
        #[arg(value_enum)]
        mode: ModeArg,
    },

    /// Change durations and cycle length
    Config(ConfigArgs),

    /// Reset daily stats (carries the streak if today was productive)
    NewDay,

    /// Run the timer in the foreground with a live display
    Watch(WatchArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Mode names accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Focused work session
    Work,
    /// Short break
    ShortBreak,
    /// Long break
    LongBreak,
}

impl From<ModeArg> for TimerMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Work => TimerMode::Work,
            ModeArg::ShortBreak => TimerMode::ShortBreak,
            ModeArg::LongBreak => TimerMode::LongBreak,
        }
    }
}

// ============================================================================
// Config Command Arguments
// ============================================================================

/// Arguments for the config command. Omitted values are left unchanged.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Work duration in minutes (1-120)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=120))]
    pub work: Option<u32>,

    /// Short break duration in minutes (1-60)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub short_break: Option<u32>,

    /// Long break duration in minutes (1-60)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub long_break: Option<u32>,

    /// Work sessions before a long break (1-12)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub sessions: Option<u32>,
}

impl ConfigArgs {
    /// Returns true if no option was given.
    pub fn is_empty(&self) -> bool {
        self.work.is_none()
            && self.short_break.is_none()
            && self.long_break.is_none()
            && self.sessions.is_none()
    }

    /// Applies the given options on top of an existing configuration.
    pub fn apply_to(&self, base: TimerConfig) -> TimerConfig {
        TimerConfig {
            work: self.work.map_or(base.work, |m| m * 60),
            short_break: self.short_break.map_or(base.short_break, |m| m * 60),
            long_break: self.long_break.map_or(base.long_break, |m| m * 60),
            sessions_per_cycle: self.sessions.unwrap_or(base.sessions_per_cycle),
        }
    }
}

// ============================================================================
// Watch Command Arguments
// ============================================================================

/// Arguments for the watch command
#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Start the countdown immediately
    #[arg(short, long)]
    pub start: bool,

    /// Disable completion sounds
    #[arg(long)]
    pub no_sound: bool,
}

// ============================================================================
// Tests
// ============================================================================
