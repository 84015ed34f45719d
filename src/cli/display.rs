//! Display utilities for the timer CLI.
//!
//! This module provides formatted output for:
//! - Status display
//! - Action confirmations
//! - The single-line live display used by `watch`
//! - Error messages

use crate::engine::{format_clock, TimerView, Transition};
use crate::types::{TimerConfig, TimerStats};

/// Width of the text progress bar.
const BAR_WIDTH: usize = 20;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the full timer status.
    pub fn show_status(view: &TimerView) {
        println!("{}", Self::format_status(view));
    }

    /// Shows a confirmation for a manual operation followed by the status line.
    pub fn show_action(message: &str, view: &TimerView) {
        println!("{message}");
        println!("  {}", Self::format_line(view));
    }

    /// Shows a mode completion.
    pub fn show_transition(transition: &Transition) {
        println!("{}", Self::format_transition(transition));
    }

    /// Shows the active configuration.
    pub fn show_config(config: &TimerConfig) {
        println!("Work:        {}", format_clock(config.work));
        println!("Short break: {}", format_clock(config.short_break));
        println!("Long break:  {}", format_clock(config.long_break));
        println!("Long break every {} sessions", config.sessions_per_cycle);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {message}");
    }

    /// Formats the multi-line status block.
    pub fn format_status(view: &TimerView) -> String {
        let state = if view.running { "running" } else { "paused" };
        [
            "Pomodoro".to_string(),
            "─────────────────────────────".to_string(),
            format!("Mode:      {} ({state})", view.label),
            format!(
                "Remaining: {} {}",
                view.remaining,
                Self::progress_bar(view.progress)
            ),
            format!("Session:   {}", view.session_label),
            Self::format_stats(&view.stats),
        ]
        .join("\n")
    }

    /// Formats the compact single-line status used by `watch`.
    pub fn format_line(view: &TimerView) -> String {
        let marker = if view.running { ">" } else { "||" };
        format!(
            "{marker} {:<11} {} {} {}",
            view.label,
            view.remaining,
            Self::progress_bar(view.progress),
            view.session_label
        )
    }

    /// Formats the daily statistics line.
    pub fn format_stats(stats: &TimerStats) -> String {
        format!(
            "Today:     {} pomodoros, {}m focus, {} breaks, {}-day streak",
            stats.completed_pomodoros,
            stats.focus_minutes(),
            stats.completed_breaks,
            stats.streak
        )
    }

    /// Formats a completion message.
    pub fn format_transition(transition: &Transition) -> String {
        format!(
            "* {} finished, {} up next",
            transition.finished.label(),
            transition.next.label()
        )
    }

    /// Renders progress as a fixed-width bar.
    fn progress_bar(progress: f64) -> String {
        let filled = (progress.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
        format!(
            "[{}{}]",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
