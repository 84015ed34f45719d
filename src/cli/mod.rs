//! CLI module for the Pomodoro timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `runner`: Executes commands against the persisted timer
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;
pub mod runner;

pub use commands::{Cli, Commands, ConfigArgs, ModeArg, WatchArgs};
pub use display::Display;
pub use runner::Runner;
