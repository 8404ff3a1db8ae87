//! Stream lifecycle: opening, tearing down and restarting the stream pair.

use std::thread;

use log::{debug, error, info};

use crate::audio::cursor::FrameCursor;
use crate::audio::CHANNELS;
use crate::error::PlaybackError;
use crate::playback::backend::{DevicePair, OutputRole, StreamSpec};
use crate::playback::output::OutputCallback;
use crate::playback::session::SessionToken;
use crate::playback::state::{StreamPair, Transport};

use super::Player;

impl Player {
    /// Start both streams at `at` seconds in a new session.
    ///
    /// Prior streams are torn down first, so at most one pair is ever
    /// open. On failure nothing is left open and playback is stopped.
    ///
    /// # Arguments
    ///
    /// * `at` - Start position in whole seconds, clamped to the track.
    pub fn start(&self, at: u64) -> Result<(), PlaybackError> {
        let mut transport = self.state.transport.lock().unwrap();
        let session = self.state.session.advance();
        self.start_locked(&mut transport, session, at)
    }

    pub(super) fn start_locked(
        &self,
        transport: &mut Transport,
        session: SessionToken,
        at: u64,
    ) -> Result<(), PlaybackError> {
        self.state.set_stop_pending(false);
        self.state.close_streams(transport);

        let (tracks, devices) = match (&transport.tracks, &transport.devices) {
            (Some(tracks), Some(devices)) => (tracks.clone(), devices.clone()),
            _ => {
                self.state.set_playing(false);
                return Err(PlaybackError::NotLoaded);
            }
        };
        let settings = self.settings();

        let at = at.min(self.state.last_second());
        let frame = (at as usize)
            .saturating_mul(tracks.sample_rate() as usize)
            .min(tracks.frames());
        self.state.set_position(at);
        self.state.gain.set_fade_gain(0.0);

        let spec = StreamSpec {
            sample_rate: tracks.sample_rate(),
            channels: CHANNELS as u16,
            block_frames: settings.block_frames,
        };
        let performer = OutputCallback::new(
            tracks.mixed().clone(),
            FrameCursor::at(frame),
            self.state.gain.clone(),
        );
        let broadcast = OutputCallback::new(
            tracks.background().clone(),
            FrameCursor::at(frame),
            self.state.gain.clone(),
        );

        let streams = match self.open_pair(&devices, spec, performer, broadcast) {
            Ok(streams) => streams,
            Err(err) => {
                error!("playback start failed: {}", err);
                self.state.set_playing(false);
                self.state.gain.set_fade_gain(1.0);
                self.state.tracker.lock().unwrap().reset();
                return Err(err);
            }
        };

        transport.streams = Some(streams);
        self.state.set_streams_running(true);
        self.state.set_playing(true);
        self.state.tracker.lock().unwrap().mark(self.now());
        self.state.record_stream_start();
        info!("session {} playing from {}s", session.generation(), at);

        self.fade().spawn(1.0, settings.fade(), session);
        Ok(())
    }

    /// Open and start both streams. Whatever was opened is dropped (and so
    /// closed) if either side fails.
    fn open_pair(
        &self,
        devices: &DevicePair,
        spec: StreamSpec,
        performer: OutputCallback,
        broadcast: OutputCallback,
    ) -> Result<StreamPair, PlaybackError> {
        let mut performer = self.backend.open(
            OutputRole::Performer,
            devices.get(OutputRole::Performer),
            spec,
            performer,
        )?;
        let mut broadcast = self.backend.open(
            OutputRole::Broadcast,
            devices.get(OutputRole::Broadcast),
            spec,
            broadcast,
        )?;

        performer.start()?;
        if let Err(err) = broadcast.start() {
            performer.stop();
            return Err(err);
        }

        Ok(StreamPair {
            performer,
            broadcast,
        })
    }

    /// Stop at once: close both streams, rewind to zero and restore the
    /// fade envelope. Used for explicit stop and at the end of the track.
    pub(super) fn stop_immediate(&self) {
        let mut transport = self.state.transport.lock().unwrap();
        let session = self.state.session.advance();
        self.state.close_streams(&mut transport);
        self.state.set_playing(false);
        self.state.set_position(0);
        self.state.gain.set_fade_gain(1.0);
        self.state.set_stop_pending(false);
        self.state.tracker.lock().unwrap().reset();
        self.state.scrub.lock().unwrap().clear();
        debug!("session {} stopped", session.generation());
    }

    /// Fade out in a new session; the fade closes the streams when it
    /// completes, unless something newer took over first.
    pub(super) fn stop_with_fade(&self) {
        let session = {
            let _transport = self.state.transport.lock().unwrap();
            let session = self.state.session.advance();
            self.state.set_stop_pending(true);
            session
        };
        let fade = self.settings().fade();
        debug!("session {} fading out", session.generation());
        self.fade().spawn(0.0, fade, session);
    }

    /// Start from the current position on a background thread.
    ///
    /// `session` is the generation the caller opened for this start. The
    /// thread does nothing if another operation superseded it before the
    /// playback lock was acquired.
    pub(super) fn spawn_start(&self, session: SessionToken) {
        let player = self.clone();
        thread::spawn(move || {
            let mut transport = player.state.transport.lock().unwrap();
            if !player.state.session.is_current(session) {
                debug!("start superseded before it ran");
                return;
            }
            let at = player.state.position();
            if let Err(err) = player.start_locked(&mut transport, session, at) {
                player.state.set_error(err);
            }
        });
    }

    /// Restart at `target` in `session` on a background thread while the
    /// seek flag is raised.
    ///
    /// A later seek opens a newer session, so only the latest target of
    /// overlapping restarts is played.
    pub(super) fn spawn_restart(&self, session: SessionToken, target: u64) {
        let player = self.clone();
        thread::spawn(move || {
            {
                let mut transport = player.state.transport.lock().unwrap();
                if player.state.session.is_current(session) {
                    if let Err(err) = player.start_locked(&mut transport, session, target) {
                        player.state.set_error(err);
                    }
                } else {
                    debug!("restart at {}s superseded", target);
                }
            }
            player.state.end_seek();
        });
    }
}
