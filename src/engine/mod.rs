//! Timer engine module for the Pomodoro timer.
//!
//! This module contains the core timer functionality:
//! - `timer`: state machine with transitions and elapsed-time accounting
//! - `clock`: wall-clock sources (system and mock)
//! - `snapshot`: persistable snapshot with field-by-field repair
//! - `view`: read-only projection for rendering
//! - `scheduler`: single-owner service driven by an interval and a command queue

pub mod clock;
pub mod scheduler;
pub mod snapshot;
pub mod timer;
pub mod view;

pub use clock::{Clock, MockClock, SystemClock};
pub use scheduler::{Command, TimerService, TICK_PERIOD};
pub use snapshot::{TimerSnapshot, SNAPSHOT_VERSION};
pub use timer::{TimerEngine, TimerEvent, Transition};
pub use view::{format_clock, TimerView};
