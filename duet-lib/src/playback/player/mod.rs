//! High-level dual-output playback controller.

mod controls;
mod runtime;
mod settings;
mod tick;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::{info, warn};

use crate::audio::buffer::TrackPair;
use crate::settings::PlayerSettings;
use crate::tools::clock::{Clock, SystemClock};

use super::backend::{AudioBackend, DevicePair};
use super::fade::FadeController;
use super::state::PlaybackState;

/// Primary playback controller.
///
/// `Player` owns the shared [`PlaybackState`] and drives two output
/// streams in lockstep: the mixed track to the performer device and the
/// backing track to the broadcast device. Clones share the same state, so
/// the host can hand one to its input handler and poll another.
///
/// Control methods never block on fades. Work that may take a while
/// (fades, seek restarts, starts from [`Player::play_pause`]) runs on short
/// lived threads tagged with the session that spawned them.
#[derive(Clone)]
pub struct Player {
    state: Arc<PlaybackState>,
    backend: Arc<dyn AudioBackend>,
    clock: Arc<dyn Clock>,
    settings: Arc<Mutex<PlayerSettings>>,
}

impl Player {
    /// Create a player on the system clock.
    pub fn new(backend: Arc<dyn AudioBackend>, settings: PlayerSettings) -> Self {
        Self::with_clock(backend, settings, Arc::new(SystemClock))
    }

    /// Create a player whose position tracking and scrub debounce read
    /// `clock`.
    pub fn with_clock(
        backend: Arc<dyn AudioBackend>,
        settings: PlayerSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let settings = settings.sanitized();
        let state = PlaybackState::new(settings.default_volume);
        state
            .scrub
            .lock()
            .unwrap()
            .set_quiet_period(settings.scrub_quiet());

        Self {
            state,
            backend,
            clock,
            settings: Arc::new(Mutex::new(settings)),
        }
    }

    /// Replace the loaded tracks and devices.
    ///
    /// Any running session is stopped immediately and the position resets
    /// to zero.
    pub fn load(&self, tracks: TrackPair, devices: DevicePair) {
        self.stop_immediate();

        if devices.is_shared() {
            warn!(
                "performer and broadcast share device '{}'; the broadcast will hear the vocal",
                devices.performer
            );
        }

        let mut transport = self.state.transport.lock().unwrap();
        self.state.set_duration(tracks.duration());
        self.state.set_position(0);
        info!(
            "loaded {:.2}s at {} Hz (performer: {}, broadcast: {})",
            tracks.duration(),
            tracks.sample_rate(),
            devices.performer,
            devices.broadcast
        );
        transport.tracks = Some(tracks);
        transport.devices = Some(devices);
        self.state.set_loaded(true);
    }

    /// Drop the loaded tracks, e.g. after the source files or devices
    /// changed and a reload is required.
    pub fn unload(&self) {
        self.stop_immediate();
        let mut transport = self.state.transport.lock().unwrap();
        transport.tracks = None;
        transport.devices = None;
        self.state.set_loaded(false);
        self.state.set_duration(0.0);
        self.state.set_position(0);
    }

    pub fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }

    /// Devices of the loaded session.
    pub fn devices(&self) -> Option<DevicePair> {
        self.state.transport.lock().unwrap().devices.clone()
    }

    fn fade(&self) -> FadeController {
        let settings = self.settings.lock().unwrap();
        FadeController::new(self.state.clone(), settings.fade_step(), settings.fade_alpha)
    }

    fn now(&self) -> Instant {
        self.clock.now()
    }
}
