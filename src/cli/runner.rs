//! Executes CLI commands against the persisted timer.
//!
//! One-shot commands load the snapshot, catch the engine up to the current
//! time, apply a single operation, and save. `watch` hands the engine to a
//! `TimerService` and drives it interactively until quit or Ctrl-C.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{
    Clock, Command, SystemClock, TimerEngine, TimerEvent, TimerService, Transition,
};
use crate::sound::{default_player, notify_completion, toggle_mute};
use crate::store::{
    default_state_path, load_or_default, save_best_effort, JsonFileStore, Persister,
    SnapshotStore,
};

use super::commands::{Commands, ConfigArgs, WatchArgs};
use super::display::Display;

/// Help line printed when `watch` starts.
const WATCH_HELP: &str = "keys: [s]tart [p]ause [r]eset s[k]ip [w]ork short-[b]reak \
     [l]ong-break [n]ew-day [m]ute [q]uit (+Enter)";

// ============================================================================
// Runner
// ============================================================================

/// Runs commands against a snapshot store.
pub struct Runner {
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
}

impl Runner {
    /// Creates a runner with explicit collaborators.
    pub fn new(store: Arc<dyn SnapshotStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Creates a runner on the JSON state file and the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if no path was given and no data directory exists.
    pub fn open(state_file: Option<PathBuf>) -> Result<Self> {
        let path = match state_file {
            Some(path) => path,
            None => default_state_path().context("Failed to locate the state file")?,
        };
        debug!("Using state file {}", path.display());
        Ok(Self::new(
            Arc::new(JsonFileStore::new(path)),
            Arc::new(SystemClock),
        ))
    }

    /// Restores the engine and catches it up to the current time.
    ///
    /// The returned receiver already holds any completion that happened
    /// while nothing was running.
    pub fn load_engine(&self) -> (TimerEngine, mpsc::UnboundedReceiver<TimerEvent>) {
        let snapshot = load_or_default(self.store.as_ref());
        let mut engine = TimerEngine::restore(snapshot, self.clock.clone());
        let events = engine.subscribe();
        engine.tick_now();
        (engine, events)
    }

    /// Executes a one-shot command and saves the result.
    ///
    /// Returns the engine after the command, mainly for tests.
    pub fn run_once(&self, command: &Commands) -> TimerEngine {
        let (mut engine, mut events) = self.load_engine();
        let mut transitions = completions(&mut events);

        match command {
            Commands::Start => {
                if engine.is_running() {
                    Display::show_action("> Timer already running", &engine.view());
                } else {
                    engine.start();
                    Display::show_action("> Timer started", &engine.view());
                }
            }
            Commands::Pause => {
                if engine.is_running() {
                    engine.pause();
                    Display::show_action("|| Timer paused", &engine.view());
                } else {
                    Display::show_action("|| Timer is not running", &engine.view());
                }
            }
            Commands::Reset => {
                engine.reset();
                Display::show_action("[] Timer reset", &engine.view());
            }
            Commands::Skip => {
                // An overdue mode already completed while catching up.
                if transitions.is_empty() {
                    engine.skip();
                }
            }
            Commands::Mode { mode } => {
                engine.set_mode((*mode).into());
                Display::show_action(
                    &format!("Switched to {}", engine.view().label),
                    &engine.view(),
                );
            }
            Commands::Config(args) => self.configure(&mut engine, args),
            Commands::NewDay => {
                engine.new_day();
                println!(
                    "New day started, streak: {} day(s)",
                    engine.state().stats.streak
                );
            }
            Commands::Status | Commands::Watch(_) | Commands::Completions { .. } => {}
        }

        transitions.extend(completions(&mut events));
        for transition in &transitions {
            Display::show_transition(transition);
        }
        if matches!(command, Commands::Status | Commands::Skip) {
            Display::show_status(&engine.view());
        }

        save_best_effort(self.store.as_ref(), &engine.snapshot());
        engine
    }

    fn configure(&self, engine: &mut TimerEngine, args: &ConfigArgs) {
        if !args.is_empty() {
            let config = args.apply_to(*engine.config());
            engine.configure(config);
            println!("* Configuration updated");
        }
        Display::show_config(engine.config());
    }

    /// Runs the interactive foreground loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer service task panics.
    pub async fn watch(&self, args: &WatchArgs) -> Result<()> {
        let (mut engine, mut events) = self.load_engine();
        if args.start {
            engine.start();
        }

        let persister = Persister::spawn(self.store.clone());
        let (service, mut views) = TimerService::new(engine, persister);
        let (tx, rx) = mpsc::unbounded_channel();
        let service_task = tokio::spawn(service.run(rx));

        let player = default_player(args.no_sound);
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        println!("{WATCH_HELP}");
        render_line(&Display::format_line(&views.borrow()));

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let line = Display::format_line(&views.borrow_and_update());
                    render_line(&line);
                }
                Some(event) = events.recv() => {
                    if let TimerEvent::Completed(transition) = event {
                        println!();
                        Display::show_transition(&transition);
                        notify_completion(player.as_ref(), &transition);
                    }
                }
                line = stdin.next_line(), if stdin_open => match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) if line.trim().eq_ignore_ascii_case("m") => {
                        let state = if toggle_mute(player.as_ref()) { "on" } else { "off" };
                        println!();
                        println!("Sound {state}");
                    }
                    Ok(Some(line)) => match line.parse::<Command>() {
                        Ok(command) => {
                            let _ = tx.send(command);
                            if command == Command::Quit {
                                break;
                            }
                        }
                        Err(e) => Display::show_error(&e),
                    },
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        warn!("Could not read stdin: {}", e);
                        stdin_open = false;
                    }
                },
                _ = &mut ctrl_c => {
                    let _ = tx.send(Command::Quit);
                    break;
                }
            }
        }

        drop(tx);
        let engine = service_task
            .await
            .context("Timer service task failed")?;

        println!();
        for transition in completions(&mut events) {
            Display::show_transition(&transition);
        }
        Display::show_status(&engine.view());
        Ok(())
    }
}

/// Drains completion events from a subscriber.
fn completions(events: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<Transition> {
    let mut found = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let TimerEvent::Completed(transition) = event {
            found.push(transition);
        }
    }
    found
}

/// Redraws the live status line in place.
fn render_line(line: &str) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "\r{line}\x1b[K");
    let _ = stdout.flush();
}

// ============================================================================
// Tests
// ============================================================================
