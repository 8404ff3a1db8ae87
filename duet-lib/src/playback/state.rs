//! Playback state shared by the controller, fade threads and the poller.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};

use crate::audio::buffer::TrackPair;
use crate::error::PlaybackError;

use super::backend::{DevicePair, OutputStream};
use super::gain::GainStage;
use super::position::PositionTracker;
use super::scrub::ScrubDebouncer;
use super::session::{SessionManager, SessionToken};

const DEFAULT_SCRUB_QUIET: Duration = Duration::from_millis(150);

/// The two open hardware streams of one session.
pub(crate) struct StreamPair {
    pub(crate) performer: Box<dyn OutputStream>,
    pub(crate) broadcast: Box<dyn OutputStream>,
}

impl StreamPair {
    fn stop(&mut self) {
        self.performer.stop();
        self.broadcast.stop();
    }

    /// Either stream stopped pulling blocks.
    pub(crate) fn any_inactive(&self) -> bool {
        !self.performer.is_active() || !self.broadcast.is_active()
    }
}

/// Everything guarded by the playback lock.
#[derive(Default)]
pub(crate) struct Transport {
    pub(crate) tracks: Option<TrackPair>,
    pub(crate) devices: Option<DevicePair>,
    pub(crate) streams: Option<StreamPair>,
}

/// Process-wide playback state.
///
/// Lifecycle transitions (opening and closing streams) happen under
/// `transport`. Scalars the poller reads every tick are atomics. The fade
/// envelope lives in `gain` behind its own lock and the seek counter has
/// its own mutex, so the callbacks and the poller never wait on a device
/// open.
///
/// Lock order: `transport` before `tracker`, `scrub` or `seeking`.
pub(crate) struct PlaybackState {
    pub(crate) transport: Mutex<Transport>,
    pub(crate) session: SessionManager,
    pub(crate) gain: Arc<GainStage>,
    pub(crate) tracker: Mutex<PositionTracker>,
    pub(crate) scrub: Mutex<ScrubDebouncer>,
    seeking: Mutex<u32>,
    stop_pending: AtomicBool,
    position: AtomicU64,
    duration_bits: AtomicU64,
    playing: AtomicBool,
    loaded: AtomicBool,
    streams_running: AtomicBool,
    stream_starts: AtomicU64,
    last_error: Mutex<Option<PlaybackError>>,
}

impl PlaybackState {
    pub(crate) fn new(master_volume: f32) -> Arc<Self> {
        Arc::new(Self {
            transport: Mutex::new(Transport::default()),
            session: SessionManager::new(),
            gain: Arc::new(GainStage::new(master_volume)),
            tracker: Mutex::new(PositionTracker::new()),
            scrub: Mutex::new(ScrubDebouncer::new(DEFAULT_SCRUB_QUIET)),
            seeking: Mutex::new(0),
            stop_pending: AtomicBool::new(false),
            position: AtomicU64::new(0),
            duration_bits: AtomicU64::new(0.0_f64.to_bits()),
            playing: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
            streams_running: AtomicBool::new(false),
            stream_starts: AtomicU64::new(0),
            last_error: Mutex::new(None),
        })
    }

    /// Stop and drop any open streams. Device errors are logged by the
    /// streams themselves and never propagate.
    pub(crate) fn close_streams(&self, transport: &mut Transport) {
        if let Some(mut streams) = transport.streams.take() {
            streams.stop();
            drop(streams);
            debug!("closed stream pair");
        }
        self.streams_running.store(false, Ordering::SeqCst);
    }

    /// Tear down after a completed fade-out, if `session` still owns
    /// playback and the stop was not cancelled in the meantime.
    ///
    /// # Returns
    ///
    /// `true` when the streams were closed.
    pub(crate) fn finish_fade_stop(&self, session: SessionToken) -> bool {
        let mut transport = self.transport.lock().unwrap();
        if !self.session.is_current(session) || !self.stop_pending() {
            return false;
        }
        self.close_streams(&mut transport);
        self.set_playing(false);
        self.set_stop_pending(false);
        self.tracker.lock().unwrap().reset();
        debug!("fade-out finished, streams closed at {}s", self.position());
        true
    }

    pub(crate) fn position(&self) -> u64 {
        self.position.load(Ordering::SeqCst)
    }

    pub(crate) fn set_position(&self, position: u64) {
        self.position.store(position, Ordering::SeqCst);
    }

    /// Move the position from `from` to `to` unless someone else wrote it
    /// since it was read.
    pub(crate) fn advance_position(&self, from: u64, to: u64) -> bool {
        self.position
            .compare_exchange(from, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn duration(&self) -> f64 {
        f64::from_bits(self.duration_bits.load(Ordering::SeqCst))
    }

    pub(crate) fn set_duration(&self, duration: f64) {
        let duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        self.duration_bits.store(duration.to_bits(), Ordering::SeqCst);
    }

    /// Last whole second a seek may target.
    pub(crate) fn last_second(&self) -> u64 {
        self.duration().floor() as u64
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::SeqCst);
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    pub(crate) fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::SeqCst);
    }

    pub(crate) fn streams_running(&self) -> bool {
        self.streams_running.load(Ordering::SeqCst)
    }

    pub(crate) fn set_streams_running(&self, running: bool) {
        self.streams_running.store(running, Ordering::SeqCst);
    }

    pub(crate) fn stop_pending(&self) -> bool {
        self.stop_pending.load(Ordering::SeqCst)
    }

    pub(crate) fn set_stop_pending(&self, pending: bool) {
        self.stop_pending.store(pending, Ordering::SeqCst);
    }

    pub(crate) fn stream_starts(&self) -> u64 {
        self.stream_starts.load(Ordering::SeqCst)
    }

    pub(crate) fn record_stream_start(&self) {
        self.stream_starts.fetch_add(1, Ordering::SeqCst);
    }

    /// A seek restart is in flight.
    pub(crate) fn is_seeking(&self) -> bool {
        *self.seeking.lock().unwrap() > 0
    }

    pub(crate) fn begin_seek(&self) {
        *self.seeking.lock().unwrap() += 1;
    }

    pub(crate) fn end_seek(&self) {
        let mut seeking = self.seeking.lock().unwrap();
        *seeking = seeking.saturating_sub(1);
    }

    pub(crate) fn set_error(&self, err: PlaybackError) {
        warn!("{}", err);
        *self.last_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn take_error(&self) -> Option<PlaybackError> {
        self.last_error.lock().unwrap().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_position_writes_are_rejected() {
        let state = PlaybackState::new(0.7);
        state.set_position(3);
        assert!(state.advance_position(3, 4));
        state.set_position(8);
        assert!(!state.advance_position(4, 5));
        assert_eq!(state.position(), 8);
    }

    #[test]
    fn overlapping_seeks_keep_the_flag_raised() {
        let state = PlaybackState::new(0.7);
        state.begin_seek();
        state.begin_seek();
        state.end_seek();
        assert!(state.is_seeking());
        state.end_seek();
        assert!(!state.is_seeking());
        state.end_seek();
        assert!(!state.is_seeking());
    }

    #[test]
    fn fade_stop_ignores_superseded_sessions() {
        let state = PlaybackState::new(0.7);
        state.set_playing(true);
        state.set_stop_pending(true);
        let stale = state.session.advance();
        state.session.advance();
        assert!(!state.finish_fade_stop(stale));
        assert!(state.is_playing());
    }

    #[test]
    fn duration_rejects_nonsense() {
        let state = PlaybackState::new(0.7);
        state.set_duration(f64::NAN);
        assert_eq!(state.duration(), 0.0);
        state.set_duration(10.6);
        assert_eq!(state.last_second(), 10);
    }
}
