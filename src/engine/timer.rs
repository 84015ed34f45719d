//! Timer engine for the Pomodoro timer.
//!
//! This module provides the core state machine:
//! - Mode transitions (Work → ShortBreak/LongBreak → Work)
//! - Session counting within a cycle
//! - Wall-clock elapsed-time accounting that tolerates late or coalesced ticks
//! - Completion events for notifications and other subscribers

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::types::{TimerConfig, TimerMode, TimerState};

use super::clock::Clock;

const MILLIS_PER_SEC: u64 = 1_000;

// ============================================================================
// TimerEvent
// ============================================================================

/// A completed mode and the mode that followed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Mode that just completed
    pub finished: TimerMode,
    /// Mode now counting down
    pub next: TimerMode,
}

/// Timer events for notifications and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown started or resumed
    Started {
        /// Mode being counted down
        mode: TimerMode,
    },
    /// Countdown paused
    Paused {
        /// Mode that was paused
        mode: TimerMode,
        /// Seconds left at the pause
        remaining_seconds: u32,
    },
    /// Current mode restored to its full duration
    Reset {
        /// Mode that was reset
        mode: TimerMode,
    },
    /// Mode chosen manually, outside the cycle
    ModeSelected {
        /// Selected mode
        mode: TimerMode,
    },
    /// Durations or cycle length replaced
    Configured(TimerConfig),
    /// A mode completed, naturally or by skip. Fired once per transition.
    Completed(Transition),
    /// Daily counters were reset
    DayRolledOver {
        /// Streak carried into the new day
        streak: u32,
    },
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Single owner of the timer state and its transition rules.
///
/// None of the operations fail. Subscribers receive events through
/// unbounded channels, so a slow or vanished subscriber can never hold up a
/// transition.
pub struct TimerEngine {
    state: TimerState,
    clock: Arc<dyn Clock>,
    subscribers: Vec<mpsc::UnboundedSender<TimerEvent>>,
}

impl TimerEngine {
    /// Creates an engine in work mode at full duration.
    pub fn new(config: TimerConfig, clock: Arc<dyn Clock>) -> Self {
        Self::from_state(TimerState::new(config), clock)
    }

    /// Creates an engine from existing state, repairing out-of-range fields.
    pub fn from_state(mut state: TimerState, clock: Arc<dyn Clock>) -> Self {
        state.normalize();
        Self {
            state,
            clock,
            subscribers: Vec::new(),
        }
    }

    /// Registers a new event subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TimerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Returns a reference to the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &TimerConfig {
        &self.state.config
    }

    /// Returns true if the countdown is advancing.
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Returns the current time according to the engine's clock.
    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    /// Replaces durations and cycle length.
    ///
    /// A stopped timer jumps to the new full duration of its mode; a running
    /// timer keeps counting but never exceeds the new duration.
    pub fn configure(&mut self, config: TimerConfig) {
        let config = config.sanitized();
        self.state.config = config;

        let duration = config.duration(self.state.mode);
        if self.state.running {
            self.state.remaining_seconds = self.state.remaining_seconds.min(duration);
        } else {
            self.state.remaining_seconds = duration;
        }
        self.state.session_index = self
            .state
            .session_index
            .clamp(1, config.sessions_per_cycle);

        debug!(?config, "Timer configured");
        self.emit(TimerEvent::Configured(config));
    }

    /// Starts the countdown. Does nothing if already running.
    pub fn start(&mut self) {
        if self.state.running {
            return;
        }

        self.state.running = true;
        self.state.last_tick = Some(self.clock.now_millis());

        debug!(mode = %self.state.mode, remaining = self.state.remaining_seconds, "Timer started");
        self.emit(TimerEvent::Started {
            mode: self.state.mode,
        });
    }

    /// Pauses the countdown. Does nothing if not running.
    pub fn pause(&mut self) {
        if !self.state.running {
            return;
        }

        self.state.running = false;
        self.state.last_tick = None;

        debug!(mode = %self.state.mode, remaining = self.state.remaining_seconds, "Timer paused");
        self.emit(TimerEvent::Paused {
            mode: self.state.mode,
            remaining_seconds: self.state.remaining_seconds,
        });
    }

    /// Advances the countdown to `now` (Unix epoch milliseconds).
    ///
    /// Only whole elapsed seconds are consumed; the reference advances by
    /// exactly that amount so the sub-second remainder carries into the
    /// next call. A gap longer than the remaining time completes the mode
    /// once and the overrun is dropped.
    ///
    /// Returns the transition if the mode completed.
    pub fn tick(&mut self, now: u64) -> Option<Transition> {
        if !self.state.running {
            return None;
        }

        let Some(reference) = self.state.last_tick else {
            // Restored as running without a reference: count from here.
            self.state.last_tick = Some(now);
            return None;
        };

        let elapsed = now.saturating_sub(reference) / MILLIS_PER_SEC;
        if elapsed == 0 {
            return None;
        }

        let consumed = u32::try_from(elapsed)
            .unwrap_or(u32::MAX)
            .min(self.state.remaining_seconds);
        self.state.remaining_seconds -= consumed;
        if self.state.mode == TimerMode::Work {
            self.state.stats.focus_seconds = self
                .state
                .stats
                .focus_seconds
                .saturating_add(u64::from(consumed));
        }

        if self.state.remaining_seconds == 0 {
            self.state.last_tick = Some(now);
            return Some(self.complete());
        }

        self.state.last_tick = Some(reference + elapsed * MILLIS_PER_SEC);
        None
    }

    /// Advances the countdown to the clock's current time.
    pub fn tick_now(&mut self) -> Option<Transition> {
        let now = self.clock.now_millis();
        self.tick(now)
    }

    /// Stops and restores the full duration of the current mode.
    pub fn reset(&mut self) {
        self.state.running = false;
        self.state.last_tick = None;
        self.state.remaining_seconds = self.state.current_duration();

        debug!(mode = %self.state.mode, "Timer reset");
        self.emit(TimerEvent::Reset {
            mode: self.state.mode,
        });
    }

    /// Completes the current mode immediately.
    ///
    /// Statistics and the session index change exactly as they would on a
    /// natural completion. The running flag is preserved.
    pub fn skip(&mut self) -> Transition {
        self.state.remaining_seconds = 0;
        if self.state.running {
            self.state.last_tick = Some(self.clock.now_millis());
        }
        self.complete()
    }

    /// Switches to a mode outside the normal cycle.
    ///
    /// Stops the countdown; the session index and stats are untouched.
    pub fn set_mode(&mut self, mode: TimerMode) {
        self.state.running = false;
        self.state.last_tick = None;
        self.state.mode = mode;
        self.state.remaining_seconds = self.state.config.duration(mode);

        debug!(%mode, "Timer mode selected");
        self.emit(TimerEvent::ModeSelected { mode });
    }

    /// Resets the daily counters. Called by the host when a new day starts.
    pub fn new_day(&mut self) {
        self.state.stats = self.state.stats.rolled_over();

        info!(streak = self.state.stats.streak, "Daily stats rolled over");
        self.emit(TimerEvent::DayRolledOver {
            streak: self.state.stats.streak,
        });
    }

    /// Applies the transition for a mode that reached zero.
    fn complete(&mut self) -> Transition {
        let finished = self.state.mode;
        let stats = &mut self.state.stats;

        let next = match finished {
            TimerMode::Work => {
                stats.completed_pomodoros = stats.completed_pomodoros.saturating_add(1);
                if stats.completed_pomodoros == 1 {
                    stats.streak = stats.streak.saturating_add(1);
                }

                if self.state.session_index % self.state.config.sessions_per_cycle == 0 {
                    self.state.session_index = 1;
                    TimerMode::LongBreak
                } else {
                    self.state.session_index += 1;
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => {
                stats.completed_breaks = stats.completed_breaks.saturating_add(1);
                TimerMode::Work
            }
        };

        self.state.mode = next;
        self.state.remaining_seconds = self.state.config.duration(next);

        info!(
            %finished,
            %next,
            session = self.state.session_index,
            pomodoros = self.state.stats.completed_pomodoros,
            "Timer mode completed"
        );

        let transition = Transition { finished, next };
        self.emit(TimerEvent::Completed(transition));
        transition
    }

    /// Sends an event to every live subscriber, dropping closed ones.
    fn emit(&mut self, event: TimerEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
