use log::debug;

use crate::settings::PlayerSettings;

use super::Player;

impl Player {
    /// Snapshot of the current settings.
    pub fn settings(&self) -> PlayerSettings {
        self.settings.lock().unwrap().clone()
    }

    /// Configure the start fade-in and pause fade-out length (ms).
    pub fn set_fade_ms(&self, fade_ms: u64) {
        self.settings.lock().unwrap().fade_ms = fade_ms;
    }

    /// Configure the fade curve steepness. Non-positive values are ignored.
    pub fn set_fade_alpha(&self, alpha: f64) {
        if !alpha.is_finite() || alpha <= 0.0 {
            debug!("ignoring fade alpha {}", alpha);
            return;
        }
        self.settings.lock().unwrap().fade_alpha = alpha;
    }

    /// Configure how long seek input must be quiet before a restart (ms).
    pub fn set_scrub_quiet_ms(&self, quiet_ms: u64) {
        let mut settings = self.settings.lock().unwrap();
        settings.scrub_quiet_ms = quiet_ms;
        self.state
            .scrub
            .lock()
            .unwrap()
            .set_quiet_period(settings.scrub_quiet());
    }

    /// Configure the hardware block size used from the next start.
    ///
    /// `None` leaves the block size to the host.
    pub fn set_block_frames(&self, block_frames: Option<u32>) {
        self.settings.lock().unwrap().block_frames = block_frames.filter(|frames| *frames > 0);
    }
}
