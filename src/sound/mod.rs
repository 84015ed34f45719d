//! Completion cues for the Pomodoro timer.
//!
//! This module provides audio notification capabilities, including:
//!
//! - Synthesized tones that distinguish "back to work" from "take a break"
//! - Non-blocking playback through rodio
//! - A terminal bell fallback when no audio device is available
//! - Graceful degradation: cue failures never affect the timer
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   Completed(Transition)   ┌──────────────────┐
//! │   TimerEngine    │──────────────────────────▶│ notify_completion│
//! └──────────────────┘                           └────────┬─────────┘
//!                                                         │ Cue
//!                                                         ▼
//!                                                ┌──────────────────┐
//!                                                │   SoundPlayer    │
//!                                                │ (rodio / bell)   │
//!                                                └──────────────────┘
//! ```

mod error;
mod player;

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::engine::Transition;
use crate::types::TimerMode;

pub use error::SoundError;
pub use player::{try_create_player, RodioSoundPlayer};

// ============================================================================
// Cue
// ============================================================================

/// A short synthesized tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    /// Tone frequency in hertz
    pub frequency_hz: f32,
    /// Tone length in milliseconds
    pub duration_ms: u64,
    /// Linear gain, `0.0..=1.0`
    pub volume: f32,
}

impl Cue {
    /// Returns the cue played when `next` begins.
    ///
    /// Entering a break plays the higher tone, returning to work the lower.
    #[must_use]
    pub fn for_next_mode(next: TimerMode) -> Self {
        let frequency_hz = if next.is_break() { 880.0 } else { 660.0 };
        Self {
            frequency_hz,
            duration_ms: 350,
            volume: 0.05,
        }
    }
}

// ============================================================================
// SoundPlayer
// ============================================================================

/// Trait for sound playback implementations.
///
/// This trait abstracts the sound playback functionality, allowing for
/// different implementations (e.g., rodio-based, mock for testing).
pub trait SoundPlayer {
    /// Plays a cue. Must not block until playback ends.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, cue: &Cue) -> Result<(), SoundError>;

    /// Returns true if sound playback is disabled.
    fn is_disabled(&self) -> bool;

    /// Enables sound playback.
    fn enable(&self);

    /// Disables sound playback.
    fn disable(&self);
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, cue: &Cue) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, cue)
    }

    fn is_disabled(&self) -> bool {
        RodioSoundPlayer::is_disabled(self)
    }

    fn enable(&self) {
        RodioSoundPlayer::enable(self)
    }

    fn disable(&self) {
        RodioSoundPlayer::disable(self)
    }
}

/// Rings the terminal bell on stderr. Used when no audio device exists.
#[derive(Debug, Default)]
pub struct TerminalBell {
    disabled: AtomicBool,
}

impl TerminalBell {
    #[must_use]
    pub fn new(disabled: bool) -> Self {
        Self {
            disabled: AtomicBool::new(disabled),
        }
    }
}

impl SoundPlayer for TerminalBell {
    fn play(&self, _cue: &Cue) -> Result<(), SoundError> {
        if self.is_disabled() {
            return Ok(());
        }
        let mut stderr = std::io::stderr();
        stderr
            .write_all(b"\x07")
            .and_then(|()| stderr.flush())
            .map_err(|e| SoundError::PlaybackError(e.to_string()))
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }
}

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<Cue>>,
    disabled: AtomicBool,
    should_fail: AtomicBool,
    device_missing: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Makes `play` fail as if the audio device vanished.
    pub fn set_device_missing(&self, missing: bool) {
        self.device_missing.store(missing, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<Cue> {
        self.play_calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, cue: &Cue) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        if self.device_missing.load(Ordering::SeqCst) {
            return Err(SoundError::DeviceNotAvailable("Mock device".to_string()));
        }
        if self.disabled.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.play_calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(*cue);
        Ok(())
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }
}

/// Plays the cue for a completed mode.
///
/// Failures are logged and swallowed; the transition already happened and
/// nothing here can undo or delay it. A device error disables the player
/// so later completions don't retry a missing device.
pub fn notify_completion(player: &dyn SoundPlayer, transition: &Transition) {
    let cue = Cue::for_next_mode(transition.next);
    match player.play(&cue) {
        Ok(()) => debug!(next = %transition.next, "Completion cue played"),
        Err(e) if e.is_device_error() => {
            warn!("Completion cue failed, sound disabled: {} ({})", e, e.suggestion());
            player.disable();
        }
        Err(e) => warn!("Completion cue failed: {}", e),
    }
}

/// Flips the player between muted and audible.
///
/// Returns true if sound is enabled afterwards.
pub fn toggle_mute(player: &dyn SoundPlayer) -> bool {
    if player.is_disabled() {
        player.enable();
    } else {
        player.disable();
    }
    let enabled = !player.is_disabled();
    debug!(enabled, "Sound toggled");
    enabled
}

/// Returns the best available player: rodio if an audio device exists,
/// otherwise the terminal bell. A disabled player never opens a device.
#[must_use]
pub fn default_player(disabled: bool) -> Box<dyn SoundPlayer> {
    if disabled {
        return Box::new(TerminalBell::new(true));
    }
    match try_create_player(disabled) {
        Some(player) => Box::new(player),
        None => Box::new(TerminalBell::new(disabled)),
    }
}
