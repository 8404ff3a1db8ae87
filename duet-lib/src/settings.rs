//! Tunable engine settings, loadable from JSON.

use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Timing, gain and format parameters for the loader and the player.
///
/// Missing fields fall back to their defaults, so a settings file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Length of the start fade-in and the pause fade-out.
    pub fade_ms: u64,
    /// Sleep between fade steps.
    pub fade_step_ms: u64,
    /// Steepness of the exponential fade curve.
    pub fade_alpha: f64,
    /// Quiet period before a burst of seeks turns into one restart.
    pub scrub_quiet_ms: u64,
    /// Requested hardware block size; `None` leaves it to the host.
    pub block_frames: Option<u32>,
    /// Host polling interval.
    pub tick_ms: u64,
    /// Rewind and forward step.
    pub skip_seconds: u64,
    /// Initial master volume, `0.0..=1.0`.
    pub default_volume: f32,
    /// Rate both tracks are resampled to.
    pub sample_rate: u32,
    /// Gain applied to the backing track under the vocal.
    pub vocal_overlay_db: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            fade_ms: 300,
            fade_step_ms: 25,
            fade_alpha: 5.0,
            scrub_quiet_ms: 150,
            block_frames: Some(1024),
            tick_ms: 100,
            skip_seconds: 5,
            default_volume: 0.7,
            sample_rate: 44_100,
            vocal_overlay_db: -6.0,
        }
    }
}

impl PlayerSettings {
    /// Read settings from a JSON file and sanitise them.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&raw)?;
        info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(raw)?;
        Ok(settings.sanitized())
    }

    /// Pretty JSON of these settings.
    pub fn to_json_pretty(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp out-of-range values to something playable.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.fade_step_ms == 0 {
            warn!("fade_step_ms must be at least 1, using 1");
            self.fade_step_ms = 1;
        }
        if self.tick_ms == 0 {
            warn!("tick_ms must be at least 1, using {}", defaults.tick_ms);
            self.tick_ms = defaults.tick_ms;
        }
        if !self.fade_alpha.is_finite() || self.fade_alpha <= 0.0 {
            warn!("fade_alpha must be positive, using {}", defaults.fade_alpha);
            self.fade_alpha = defaults.fade_alpha;
        }
        self.default_volume = if self.default_volume.is_finite() {
            self.default_volume.clamp(0.0, 1.0)
        } else {
            defaults.default_volume
        };
        if self.sample_rate == 0 {
            warn!("sample_rate must be positive, using {}", defaults.sample_rate);
            self.sample_rate = defaults.sample_rate;
        }
        if !self.vocal_overlay_db.is_finite() {
            self.vocal_overlay_db = defaults.vocal_overlay_db;
        }
        if self.block_frames == Some(0) {
            self.block_frames = None;
        }
        self
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    pub fn fade_step(&self) -> Duration {
        Duration::from_millis(self.fade_step_ms)
    }

    pub fn scrub_quiet(&self) -> Duration {
        Duration::from_millis(self.scrub_quiet_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
