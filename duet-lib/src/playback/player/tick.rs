//! The polling step the host calls once per UI tick.

use std::time::Instant;

use log::info;

use super::Player;

impl Player {
    /// Advance playback bookkeeping by one poll.
    ///
    /// Moves the wall-clock position forward (paused while a scrub is
    /// pending), fires a debounced seek whose quiet period has passed and
    /// stops at the end of the track, whether the clock or the streams got
    /// there first.
    ///
    /// # Returns
    ///
    /// The position after this tick, in whole seconds.
    pub fn tick(&self) -> u64 {
        let now = self.now();

        let scrubbing = self.state.scrub.lock().unwrap().pending().is_some();
        if self.state.is_playing() && !scrubbing && self.advance_clock(now) {
            return self.state.position();
        }

        let target = self.state.scrub.lock().unwrap().poll(now);
        if let Some(target) = target {
            self.seek_now(target);
        }

        self.detect_natural_end();
        self.state.position()
    }

    /// Returns `true` when the position reached the end and playback stopped.
    fn advance_clock(&self, now: Instant) -> bool {
        let position = self.state.position();
        let advanced = self.state.tracker.lock().unwrap().advance(now, position);
        if advanced == position || !self.state.advance_position(position, advanced) {
            return false;
        }
        if advanced as f64 >= self.state.duration() {
            info!("reached end of track at {}s", advanced);
            self.stop_immediate();
            return true;
        }
        false
    }

    /// Stop if either stream went quiet on its own.
    ///
    /// Skipped mid-fade-out and mid-restart, where inactive streams are
    /// expected. The playback lock is only tried so a slow device open
    /// never stalls the poll.
    fn detect_natural_end(&self) -> bool {
        if !self.state.is_playing()
            || !self.state.streams_running()
            || self.state.stop_pending()
            || self.state.is_seeking()
        {
            return false;
        }

        let ended = match self.state.transport.try_lock() {
            Ok(transport) => transport
                .streams
                .as_ref()
                .map(|streams| streams.any_inactive())
                .unwrap_or(false),
            Err(_) => return false,
        };

        if ended {
            info!("stream finished, stopping");
            self.stop_immediate();
        }
        ended
    }
}
