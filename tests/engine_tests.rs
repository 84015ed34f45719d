//! Scenario tests for the timer engine.
//!
//! These drive a `TimerEngine` through whole Pomodoro days on a mock clock:
//! - Full cycles with a long break every N sessions
//! - Wall-clock accounting across long gaps and sub-second ticks
//! - Resuming from a saved snapshot
//! - Daily rollover and streaks

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use syncplanner::engine::{MockClock, TimerEngine, TimerEvent, TimerSnapshot};
use syncplanner::types::{TimerConfig, TimerMode};

// ============================================================================
// Test Helpers
// ============================================================================

const T0: u64 = 1_700_000_000_000;

/// Creates an engine on a mock clock with an event subscriber.
fn create_engine(
    config: TimerConfig,
) -> (TimerEngine, Arc<MockClock>, mpsc::UnboundedReceiver<TimerEvent>) {
    let clock = Arc::new(MockClock::new(T0));
    let mut engine = TimerEngine::new(config, clock.clone());
    let events = engine.subscribe();
    (engine, clock, events)
}

/// Short durations so scenarios stay readable.
fn fast_config() -> TimerConfig {
    TimerConfig::default()
        .with_work(60)
        .with_short_break(10)
        .with_long_break(30)
}

/// Collects the modes entered by completions.
fn drain_next_modes(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerMode> {
    let mut modes = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let TimerEvent::Completed(transition) = event {
            modes.push(transition.next);
        }
    }
    modes
}

/// Advances the clock one second at a time, ticking after each step.
fn run_for(engine: &mut TimerEngine, clock: &MockClock, seconds: u32) {
    for _ in 0..seconds {
        let now = clock.advance(Duration::from_secs(1));
        engine.tick(now);
    }
}

// ============================================================================
// Cycle Scenarios
// ============================================================================

#[test]
fn test_full_day_by_natural_completion() {
    let (mut engine, clock, mut events) = create_engine(fast_config());
    engine.start();

    // Four work sessions and four breaks: 4 * 60 + 3 * 10 + 30 seconds
    run_for(&mut engine, &clock, 4 * 60 + 3 * 10 + 30);

    assert_eq!(
        drain_next_modes(&mut events),
        vec![
            TimerMode::ShortBreak,
            TimerMode::Work,
            TimerMode::ShortBreak,
            TimerMode::Work,
            TimerMode::ShortBreak,
            TimerMode::Work,
            TimerMode::LongBreak,
            TimerMode::Work,
        ]
    );

    let state = engine.state();
    assert_eq!(state.mode, TimerMode::Work);
    assert_eq!(state.session_index, 1);
    assert_eq!(state.stats.completed_pomodoros, 4);
    assert_eq!(state.stats.completed_breaks, 4);
    assert_eq!(state.stats.focus_seconds, 240);
    assert!(engine.is_running());
    assert!(state.is_valid());
}

#[test]
fn test_cycle_of_two_alternates_long_breaks() {
    let (mut engine, _clock, mut events) =
        create_engine(fast_config().with_sessions_per_cycle(2));

    for _ in 0..8 {
        engine.skip();
    }

    assert_eq!(
        drain_next_modes(&mut events),
        vec![
            TimerMode::ShortBreak,
            TimerMode::Work,
            TimerMode::LongBreak,
            TimerMode::Work,
            TimerMode::ShortBreak,
            TimerMode::Work,
            TimerMode::LongBreak,
            TimerMode::Work,
        ]
    );
}

#[test]
fn test_cycle_of_one_always_long_break() {
    let (mut engine, _clock, _events) = create_engine(fast_config().with_sessions_per_cycle(1));

    for _ in 0..3 {
        assert_eq!(engine.skip().next, TimerMode::LongBreak);
        assert_eq!(engine.state().session_index, 1);
        assert_eq!(engine.skip().next, TimerMode::Work);
    }
}

#[test]
fn test_manual_mode_keeps_cycle_position() {
    let (mut engine, _clock, _events) = create_engine(fast_config());

    engine.skip(); // work -> short break, session 2
    engine.set_mode(TimerMode::LongBreak);
    engine.skip(); // long break -> work

    assert_eq!(engine.state().mode, TimerMode::Work);
    assert_eq!(engine.state().session_index, 2);
    assert_eq!(engine.state().stats.completed_breaks, 1);
}

// ============================================================================
// Wall-Clock Accounting
// ============================================================================

#[test]
fn test_sub_second_ticks_lose_no_time() {
    let (mut engine, clock, _events) = create_engine(TimerConfig::default());
    engine.start();

    // 25 ticks of 400ms = 10 seconds
    for _ in 0..25 {
        let now = clock.advance(Duration::from_millis(400));
        engine.tick(now);
    }

    assert_eq!(engine.state().remaining_seconds, 1490);
    assert_eq!(engine.state().stats.focus_seconds, 10);
}

#[test]
fn test_suspended_machine_completes_once() {
    let (mut engine, clock, mut events) = create_engine(TimerConfig::default());
    engine.start();

    let now = clock.advance(Duration::from_secs(8 * 60 * 60));
    let transition = engine.tick(now);

    assert_eq!(transition.map(|t| t.next), Some(TimerMode::ShortBreak));
    assert_eq!(drain_next_modes(&mut events).len(), 1);
    assert_eq!(engine.state().remaining_seconds, 300);
    assert_eq!(engine.state().stats.focus_seconds, 1500);

    // The overrun is not carried into the break
    let now = clock.advance(Duration::from_secs(1));
    engine.tick(now);
    assert_eq!(engine.state().remaining_seconds, 299);
}

#[test]
fn test_breaks_do_not_count_focus() {
    let (mut engine, clock, _events) = create_engine(fast_config());
    engine.set_mode(TimerMode::ShortBreak);
    engine.start();

    run_for(&mut engine, &clock, 5);

    assert_eq!(engine.state().remaining_seconds, 5);
    assert_eq!(engine.state().stats.focus_seconds, 0);
}

#[test]
fn test_clock_going_backwards_is_ignored() {
    let (mut engine, _clock, _events) = create_engine(TimerConfig::default());
    engine.start();

    assert!(engine.tick(T0 - 60_000).is_none());
    assert_eq!(engine.state().remaining_seconds, 1500);
}

// ============================================================================
// Resume
// ============================================================================

#[test]
fn test_resume_running_snapshot_counts_closed_time() {
    let (mut engine, clock, _events) = create_engine(TimerConfig::default());
    engine.start();
    run_for(&mut engine, &clock, 100);
    let json = engine.snapshot().to_json().unwrap();
    drop(engine);

    // Application closed for two minutes
    clock.advance(Duration::from_secs(120));

    let snapshot = TimerSnapshot::from_json(&json).unwrap();
    let mut restored = TimerEngine::restore(snapshot, clock.clone());
    restored.tick_now();

    assert!(restored.is_running());
    assert_eq!(restored.state().remaining_seconds, 1500 - 220);
}

#[test]
fn test_resume_paused_snapshot_is_frozen() {
    let (mut engine, clock, _events) = create_engine(TimerConfig::default());
    engine.start();
    run_for(&mut engine, &clock, 30);
    engine.pause();
    let snapshot = engine.snapshot();

    clock.advance(Duration::from_secs(3600));
    let mut restored = TimerEngine::restore(snapshot, clock.clone());
    restored.tick_now();

    assert!(!restored.is_running());
    assert_eq!(restored.state().remaining_seconds, 1470);
}

#[test]
fn test_resume_legacy_document() {
    let json = r#"{
        "mode": "shortBreak",
        "remaining": 120,
        "running": false,
        "sessionIndex": 3,
        "durations": { "work": 3000, "shortBreak": 600, "longBreak": 1800 },
        "sessionsPerCycle": 3,
        "stats": { "pomodoros": 2, "focusSeconds": 6000, "breaks": 1, "streak": 5 }
    }"#;

    let clock = Arc::new(MockClock::new(T0));
    let engine = TimerEngine::restore(TimerSnapshot::from_json(json).unwrap(), clock);
    let state = engine.state();

    assert_eq!(state.mode, TimerMode::ShortBreak);
    assert_eq!(state.remaining_seconds, 120);
    assert_eq!(state.session_index, 3);
    assert_eq!(state.config.work, 3000);
    assert_eq!(state.config.sessions_per_cycle, 3);
    assert_eq!(state.stats.completed_pomodoros, 2);
    assert_eq!(state.stats.streak, 5);
}

// ============================================================================
// Daily Rollover
// ============================================================================

#[test]
fn test_streak_across_days() {
    let (mut engine, _clock, _events) = create_engine(fast_config());

    // Day 1: productive
    engine.skip();
    assert_eq!(engine.state().stats.streak, 1);
    engine.new_day();

    // Day 2: productive, streak grows on the first pomodoro only
    engine.skip();
    engine.skip();
    engine.skip();
    assert_eq!(engine.state().stats.completed_pomodoros, 2);
    assert_eq!(engine.state().stats.streak, 2);
    engine.new_day();

    // Day 3: idle, streak is lost at the next rollover
    engine.new_day();
    assert_eq!(engine.state().stats.streak, 0);
    assert_eq!(engine.state().stats.completed_pomodoros, 0);
}

#[test]
fn test_new_day_keeps_timer_position() {
    let (mut engine, clock, _events) = create_engine(fast_config());
    engine.start();
    run_for(&mut engine, &clock, 15);

    engine.new_day();

    assert!(engine.is_running());
    assert_eq!(engine.state().remaining_seconds, 45);
    assert_eq!(engine.state().stats.focus_seconds, 0);
}
