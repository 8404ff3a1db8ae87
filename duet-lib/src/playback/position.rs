//! Wall-clock extrapolated playback position.

use std::time::{Duration, Instant};

/// Converts elapsed wall-clock time into whole playback seconds.
///
/// The tracker never asks the audio host where the streams are; it trades a
/// little drift for independence from the callback threads. Sub-second
/// remainders are carried over between ticks.
#[derive(Debug, Default)]
pub struct PositionTracker {
    last_tick: Option<Instant>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `now` as the reference point (streams just started).
    pub fn mark(&mut self, now: Instant) {
        self.last_tick = Some(now);
    }

    /// Forget the reference point; the next advance only records a timestamp.
    pub fn reset(&mut self) {
        self.last_tick = None;
    }

    #[cfg(test)]
    fn last_tick(&self) -> Option<Instant> {
        self.last_tick
    }

    /// Advance `position` by the whole seconds elapsed since the last tick.
    ///
    /// # Arguments
    ///
    /// * `now` - Current wall-clock time.
    /// * `position` - Position in whole seconds before this tick.
    ///
    /// # Returns
    ///
    /// The new position. The first call after a reset returns `position`
    /// unchanged.
    pub fn advance(&mut self, now: Instant, position: u64) -> u64 {
        let last = match self.last_tick {
            Some(last) => last,
            None => {
                self.last_tick = Some(now);
                return position;
            }
        };

        let whole = now.saturating_duration_since(last).as_secs();
        if whole == 0 {
            return position;
        }
        self.last_tick = Some(last + Duration::from_secs(whole));
        position.saturating_add(whole)
    }
}
