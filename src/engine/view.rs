//! Read-only projection of the timer for rendering.

use serde::Serialize;

use crate::types::{TimerMode, TimerState, TimerStats};

use super::timer::TimerEngine;

/// Formats seconds as zero-padded `MM:SS`.
///
/// Minutes are not wrapped into hours, so two hours reads `120:00`.
pub fn format_clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Everything a UI needs to draw the timer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    /// Current mode
    pub mode: TimerMode,
    /// Human-readable mode label
    pub label: &'static str,
    /// Remaining time as `MM:SS`
    pub remaining: String,
    /// Remaining time in seconds
    pub remaining_seconds: u32,
    /// Completed fraction of the current mode, `0.0..=1.0`
    pub progress: f64,
    /// e.g. "session 2 of 4"
    pub session_label: String,
    /// Whether the countdown is advancing
    pub running: bool,
    /// Daily statistics
    pub stats: TimerStats,
}

impl TimerView {
    /// Builds the projection from timer state.
    pub fn from_state(state: &TimerState) -> Self {
        let duration = state.current_duration().max(1);
        let remaining = state.remaining_seconds.min(duration);

        Self {
            mode: state.mode,
            label: state.mode.label(),
            remaining: format_clock(remaining),
            remaining_seconds: remaining,
            progress: 1.0 - f64::from(remaining) / f64::from(duration),
            session_label: format!(
                "session {} of {}",
                state.session_index, state.config.sessions_per_cycle
            ),
            running: state.running,
            stats: state.stats,
        }
    }
}

impl TimerEngine {
    /// Returns the current read-only projection.
    pub fn view(&self) -> TimerView {
        TimerView::from_state(self.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimerConfig;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(5), "00:05");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(25 * 60), "25:00");
        assert_eq!(format_clock(120 * 60 + 59), "120:59");
    }

    #[test]
    fn test_view_of_fresh_state() {
        let view = TimerView::from_state(&TimerState::new(TimerConfig::default()));

        assert_eq!(view.mode, TimerMode::Work);
        assert_eq!(view.label, "Deep Work");
        assert_eq!(view.remaining, "25:00");
        assert_eq!(view.progress, 0.0);
        assert_eq!(view.session_label, "session 1 of 4");
        assert!(!view.running);
    }

    #[test]
    fn test_view_progress() {
        let mut state = TimerState::new(TimerConfig::default());
        state.remaining_seconds = 375;

        let view = TimerView::from_state(&state);

        assert_eq!(view.remaining, "06:15");
        assert!((view.progress - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_view_progress_complete() {
        let mut state = TimerState::new(TimerConfig::default());
        state.remaining_seconds = 0;

        assert_eq!(TimerView::from_state(&state).progress, 1.0);
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let view = TimerView::from_state(&TimerState::default());
        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(value["sessionLabel"], "session 1 of 4");
        assert_eq!(value["remainingSeconds"], 1500);
        assert_eq!(value["mode"], "work");
    }
}
