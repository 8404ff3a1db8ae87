//! Transport controls and read-only accessors for `Player`.
//!
//! These are the user intents a host wires to its buttons and keys. None
//! of them waits for a fade; starts and restarts triggered from here run on
//! background threads.

use log::{debug, info};

use crate::error::PlaybackError;
use crate::playback::session::SessionToken;

use super::Player;

impl Player {
    /// Toggle playback.
    ///
    /// While playing this fades out and the fade closes the streams. While
    /// stopped, or while a fade-out is still running, it starts from the
    /// current position on a background thread.
    pub fn play_pause(&self) {
        if self.state.is_playing() && !self.state.stop_pending() {
            info!("pausing at {}s", self.state.position());
            self.stop_with_fade();
            return;
        }
        if !self.state.is_loaded() {
            debug!("play requested with nothing loaded");
            return;
        }
        info!("playing from {}s", self.state.position());
        self.state.set_playing(true);
        let session = self.state.session.advance();
        self.spawn_start(session);
    }

    /// Stop immediately and rewind to zero.
    pub fn stop(&self) {
        info!("stopping");
        self.stop_immediate();
    }

    /// Seek as a user intent.
    ///
    /// While playing the request is debounced: it replaces any pending
    /// request and fires from [`Player::tick`] once input has been quiet
    /// long enough. While paused it applies at once.
    pub fn seek(&self, position: u64) {
        if !self.state.is_loaded() {
            return;
        }
        let target = position.min(self.state.last_second());
        if self.state.is_playing() {
            let now = self.now();
            self.state.scrub.lock().unwrap().request(target, now);
        } else {
            self.seek_now(target);
        }
    }

    /// Seek without debouncing.
    ///
    /// Clamps to the track, cancels a pending fade-stop and, while playing,
    /// restarts both streams at the target on a background thread. While
    /// paused only the position changes.
    pub fn seek_now(&self, position: u64) {
        let target = position.min(self.state.last_second());
        self.state.begin_seek();
        self.state.set_position(target);
        self.state.set_stop_pending(false);
        self.state.tracker.lock().unwrap().reset();

        if self.state.is_playing() {
            let session = self.state.session.advance();
            debug!("session {} restarting at {}s", session.generation(), target);
            self.spawn_restart(session, target);
        } else {
            self.state.end_seek();
        }
    }

    /// Seek `seconds` back from the displayed position.
    pub fn rewind(&self, seconds: u64) {
        if !self.state.is_loaded() {
            return;
        }
        self.seek(self.display_position().saturating_sub(seconds));
    }

    /// Seek `seconds` forward from the displayed position.
    pub fn forward(&self, seconds: u64) {
        if !self.state.is_loaded() {
            return;
        }
        let target = self
            .display_position()
            .saturating_add(seconds)
            .min(self.state.last_second());
        self.seek(target);
    }

    /// Set the master volume in percent, clamped to `0..=100`.
    pub fn set_master_volume(&self, percent: u32) {
        let percent = percent.min(100);
        self.state.gain.set_master_volume(percent as f32 / 100.0);
    }

    /// Master volume in percent.
    pub fn master_volume(&self) -> u32 {
        (self.state.gain.master_volume() * 100.0).round() as u32
    }

    /// Current fade envelope value.
    pub fn fade_gain(&self) -> f32 {
        self.state.gain.fade_gain()
    }

    /// Position in whole seconds.
    pub fn current_position(&self) -> u64 {
        self.state.position()
    }

    /// Position to show: a pending scrub target if there is one.
    pub fn display_position(&self) -> u64 {
        match self.state.scrub.lock().unwrap().pending() {
            Some(pending) => pending.target,
            None => self.state.position(),
        }
    }

    /// Loaded length in seconds.
    pub fn current_duration(&self) -> f64 {
        self.state.duration()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// A fade-out is running and will stop the streams.
    pub fn is_stopping(&self) -> bool {
        self.state.stop_pending()
    }

    /// Current session generation.
    pub fn session(&self) -> SessionToken {
        self.state.session.current()
    }

    /// Stream pairs started so far.
    pub fn stream_starts(&self) -> u64 {
        self.state.stream_starts()
    }

    /// Take the last error raised by a background start or restart.
    pub fn take_error(&self) -> Option<PlaybackError> {
        self.state.take_error()
    }
}
