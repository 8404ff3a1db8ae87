//! Session-aware exponential fades of the shared fade envelope.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;

use super::session::SessionToken;
use super::state::PlaybackState;

/// Exponential ease from 0 to 1.
///
/// `(e^(alpha*t) - 1) / (e^alpha - 1)` on `(0, 1)`, clamped to `0` at or
/// below `t = 0` and to `1` at or above `t = 1`. Larger `alpha` keeps the
/// start flatter and the end steeper. `alpha <= 0` degrades to linear.
pub fn expo(t: f64, alpha: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    if alpha <= 0.0 {
        return t;
    }
    (alpha * t).exp_m1() / alpha.exp_m1()
}

/// How a fade ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeOutcome {
    /// Every step ran and the envelope reached its target.
    Completed,
    /// A fade-out that also tore the streams down.
    StoppedStreams,
    /// A newer session took over; nothing further was written.
    Stale,
}

/// Drives the fade envelope toward a target in fixed steps.
#[derive(Clone)]
pub(crate) struct FadeController {
    state: Arc<PlaybackState>,
    step: Duration,
    alpha: f64,
}

impl FadeController {
    pub(crate) fn new(state: Arc<PlaybackState>, step: Duration, alpha: f64) -> Self {
        Self {
            state,
            step: step.max(Duration::from_millis(1)),
            alpha,
        }
    }

    /// Number of steps for a fade of `duration`; never zero.
    pub(crate) fn steps_for(&self, duration: Duration) -> u32 {
        let steps = duration.as_millis() / self.step.as_millis().max(1);
        steps.clamp(1, u32::MAX as u128) as u32
    }

    /// Ramp the envelope to `target` over `duration` for `session`.
    ///
    /// Every write happens under the fade lock and only while `session` is
    /// current. A completed fade to zero with a stop pending finalises the
    /// stop by closing both streams.
    pub(crate) fn ramp(&self, target: f32, duration: Duration, session: SessionToken) -> FadeOutcome {
        let gain = &self.state.gain;
        let start = {
            let _guard = gain.lock_fade();
            gain.fade_gain()
        };
        let steps = self.steps_for(duration);

        for i in 1..=steps {
            let t = i as f64 / steps as f64;
            let value = start + (target - start) * expo(t, self.alpha) as f32;
            if !self.write(value, session) {
                debug!("fade for session {} superseded", session.generation());
                return FadeOutcome::Stale;
            }
            thread::sleep(self.step);
        }

        if !self.write(target, session) {
            return FadeOutcome::Stale;
        }

        if target <= 0.0 && self.state.stop_pending() {
            if self.state.finish_fade_stop(session) {
                return FadeOutcome::StoppedStreams;
            }
            if !self.state.session.is_current(session) {
                return FadeOutcome::Stale;
            }
        }

        FadeOutcome::Completed
    }

    /// Run [`Self::ramp`] on a new thread.
    pub(crate) fn spawn(
        &self,
        target: f32,
        duration: Duration,
        session: SessionToken,
    ) -> JoinHandle<FadeOutcome> {
        let fade = self.clone();
        thread::spawn(move || fade.ramp(target, duration, session))
    }

    fn write(&self, value: f32, session: SessionToken) -> bool {
        let gain = &self.state.gain;
        let guard = gain.lock_fade();
        if !self.state.session.is_current(session) {
            return false;
        }
        gain.store_fade_gain(&guard, value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(state: &Arc<PlaybackState>) -> FadeController {
        FadeController::new(state.clone(), Duration::from_millis(2), 5.0)
    }

    #[test]
    fn expo_hits_its_endpoints() {
        assert_eq!(expo(0.0, 5.0), 0.0);
        assert_eq!(expo(1.0, 5.0), 1.0);
        assert_eq!(expo(-0.5, 5.0), 0.0);
        assert_eq!(expo(1.5, 5.0), 1.0);
    }

    #[test]
    fn expo_is_strictly_increasing() {
        for alpha in [0.5, 1.0, 5.0, 12.0] {
            let mut previous = expo(0.0, alpha);
            for i in 1..=1000 {
                let value = expo(i as f64 / 1000.0, alpha);
                assert!(value > previous, "alpha {} step {}", alpha, i);
                previous = value;
            }
        }
    }

    #[test]
    fn expo_starts_slowly() {
        assert!(expo(0.5, 5.0) < 0.1);
    }

    #[test]
    fn step_count_is_at_least_one() {
        let state = PlaybackState::new(0.7);
        let fade = FadeController::new(state, Duration::from_millis(25), 5.0);
        assert_eq!(fade.steps_for(Duration::from_millis(300)), 12);
        assert_eq!(fade.steps_for(Duration::from_millis(10)), 1);
        assert_eq!(fade.steps_for(Duration::ZERO), 1);
    }

    #[test]
    fn fade_in_reaches_target() {
        let state = PlaybackState::new(0.7);
        state.gain.set_fade_gain(0.0);
        let session = state.session.advance();
        let outcome = controller(&state).ramp(1.0, Duration::from_millis(20), session);
        assert_eq!(outcome, FadeOutcome::Completed);
        assert_eq!(state.gain.fade_gain(), 1.0);
    }

    #[test]
    fn stale_fade_leaves_the_envelope_alone() {
        let state = PlaybackState::new(0.7);
        state.gain.set_fade_gain(0.0);
        let stale = state.session.advance();
        let handle = FadeController::new(state.clone(), Duration::from_millis(10), 5.0).spawn(
            1.0,
            Duration::from_millis(400),
            stale,
        );

        thread::sleep(Duration::from_millis(35));
        let _fresh = state.session.advance();
        state.gain.set_fade_gain(0.25);

        assert_eq!(handle.join().unwrap(), FadeOutcome::Stale);
        assert_eq!(state.gain.fade_gain(), 0.25);
    }

    #[test]
    fn fade_out_without_stop_pending_keeps_streams() {
        let state = PlaybackState::new(0.7);
        state.set_playing(true);
        let session = state.session.advance();
        let outcome = controller(&state).ramp(0.0, Duration::from_millis(10), session);
        assert_eq!(outcome, FadeOutcome::Completed);
        assert!(state.is_playing());
        assert_eq!(state.gain.fade_gain(), 0.0);
    }

    #[test]
    fn fade_out_with_stop_pending_finishes_the_stop() {
        let state = PlaybackState::new(0.7);
        state.set_playing(true);
        state.set_stop_pending(true);
        let session = state.session.advance();
        let outcome = controller(&state).ramp(0.0, Duration::from_millis(10), session);
        assert_eq!(outcome, FadeOutcome::StoppedStreams);
        assert!(!state.is_playing());
        assert!(!state.stop_pending());
    }
}
