//! Scheduler adapter that drives a `TimerEngine`.
//!
//! The service owns the engine inside one task. A one-second interval and a
//! command queue are the only inputs, so every operation runs to completion
//! before the next is observed and no locking is needed. After each mutation
//! the service hands a snapshot to the `Persister` and publishes a fresh
//! `TimerView` on a watch channel.

use std::ops::ControlFlow;
use std::str::FromStr;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::store::Persister;
use crate::types::{TimerConfig, TimerMode};

use super::timer::TimerEngine;
use super::view::TimerView;

/// Scheduling period. Elapsed time comes from the clock, so this only sets
/// how often the view refreshes.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

// ============================================================================
// Command
// ============================================================================

/// Manual operations queued to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Restore the current mode's full duration
    Reset,
    /// Complete the current mode now
    Skip,
    /// Switch mode manually
    SetMode(TimerMode),
    /// Replace durations
    Configure(TimerConfig),
    /// Reset daily counters
    NewDay,
    /// Persist and stop the service
    Quit,
}

impl FromStr for Command {
    type Err = String;

    /// Parses the single-key commands accepted by the interactive loop.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "start" => Ok(Command::Start),
            "p" | "pause" => Ok(Command::Pause),
            "r" | "reset" => Ok(Command::Reset),
            "k" | "skip" => Ok(Command::Skip),
            "w" | "work" => Ok(Command::SetMode(TimerMode::Work)),
            "b" | "short" => Ok(Command::SetMode(TimerMode::ShortBreak)),
            "l" | "long" => Ok(Command::SetMode(TimerMode::LongBreak)),
            "n" | "new-day" => Ok(Command::NewDay),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

// ============================================================================
// TimerService
// ============================================================================

/// Single owner of the engine while it is being driven.
#[derive(Debug)]
pub struct TimerService {
    engine: TimerEngine,
    persister: Persister,
    views: watch::Sender<TimerView>,
}

impl TimerService {
    /// Creates the service and the receiver for its view updates.
    pub fn new(engine: TimerEngine, persister: Persister) -> (Self, watch::Receiver<TimerView>) {
        let (views, rx) = watch::channel(engine.view());
        (
            Self {
                engine,
                persister,
                views,
            },
            rx,
        )
    }

    /// Returns a reference to the engine.
    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    /// Applies one manual operation.
    ///
    /// Returns `ControlFlow::Break` when the service should stop.
    pub fn apply(&mut self, command: Command) -> ControlFlow<()> {
        debug!(?command, "Applying command");

        match command {
            Command::Start => self.engine.start(),
            Command::Pause => {
                self.engine.tick_now();
                self.engine.pause();
            }
            Command::Reset => self.engine.reset(),
            Command::Skip => {
                // Catching up may already complete the mode; don't complete twice.
                if self.engine.tick_now().is_none() {
                    self.engine.skip();
                }
            }
            Command::SetMode(mode) => self.engine.set_mode(mode),
            Command::Configure(config) => {
                self.engine.tick_now();
                self.engine.configure(config);
            }
            Command::NewDay => self.engine.new_day(),
            Command::Quit => return ControlFlow::Break(()),
        }

        self.publish();
        ControlFlow::Continue(())
    }

    /// Advances the engine to the current time.
    pub fn on_tick(&mut self) {
        if !self.engine.is_running() {
            return;
        }
        self.engine.tick_now();
        self.publish();
    }

    /// Runs until `Command::Quit` arrives or every command sender is dropped,
    /// then persists the final state and returns the engine.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) -> TimerEngine {
        let mut ticker = interval(TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Timer service started");
        self.publish();

        loop {
            tokio::select! {
                _ = ticker.tick() => self.on_tick(),
                command = commands.recv() => match command {
                    Some(command) => {
                        if self.apply(command).is_break() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        self.shutdown().await
    }

    /// Catches up, persists, and waits for the final write.
    pub async fn shutdown(mut self) -> TimerEngine {
        self.engine.tick_now();
        self.publish();

        let Self {
            engine, persister, ..
        } = self;
        persister.flush().await;

        info!("Timer service stopped");
        engine
    }

    fn publish(&mut self) {
        self.persister.persist(self.engine.snapshot());
        // No receivers is fine; the view is for whoever is watching.
        let _ = self.views.send(self.engine.view());
    }
}

// ============================================================================
// Tests
// ============================================================================
