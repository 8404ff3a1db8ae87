//! Master volume and fade envelope shared with the output callbacks.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Gain state read by the real-time callbacks.
///
/// Both values are stored as `f32` bits so the callback never takes a lock.
/// Writers of the fade envelope serialise on `fade_lock`, which is
/// independent of the playback lock held across device opens.
#[derive(Debug)]
pub struct GainStage {
    master_volume: AtomicU32,
    fade_gain: AtomicU32,
    fade_lock: Mutex<()>,
}

impl GainStage {
    pub fn new(master_volume: f32) -> Self {
        Self {
            master_volume: AtomicU32::new(master_volume.clamp(0.0, 1.0).to_bits()),
            fade_gain: AtomicU32::new(1.0_f32.to_bits()),
            fade_lock: Mutex::new(()),
        }
    }

    /// Multiplier applied to every output sample.
    pub fn output_gain(&self) -> f32 {
        self.master_volume() * self.fade_gain()
    }

    pub fn master_volume(&self) -> f32 {
        f32::from_bits(self.master_volume.load(Ordering::Relaxed))
    }

    /// Set the master volume (linear, clamped to `[0, 1]`).
    pub fn set_master_volume(&self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.master_volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    pub fn fade_gain(&self) -> f32 {
        f32::from_bits(self.fade_gain.load(Ordering::Relaxed))
    }

    /// Take the fade lock for a read-modify-write of the envelope.
    pub fn lock_fade(&self) -> MutexGuard<'_, ()> {
        self.fade_lock.lock().unwrap()
    }

    /// Write the envelope. Callers hold the guard from [`Self::lock_fade`].
    pub fn store_fade_gain(&self, _guard: &MutexGuard<'_, ()>, gain: f32) {
        self.fade_gain
            .store(gain.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// Lock, write and release the envelope in one step.
    pub fn set_fade_gain(&self, gain: f32) {
        let guard = self.lock_fade();
        self.store_fade_gain(&guard, gain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_gain_is_volume_times_fade() {
        let gain = GainStage::new(0.5);
        gain.set_fade_gain(0.5);
        assert_eq!(gain.output_gain(), 0.25);
    }

    #[test]
    fn volume_and_fade_are_clamped() {
        let gain = GainStage::new(3.0);
        assert_eq!(gain.master_volume(), 1.0);
        gain.set_master_volume(-1.0);
        assert_eq!(gain.master_volume(), 0.0);
        gain.set_master_volume(f32::NAN);
        assert_eq!(gain.master_volume(), 0.0);
        gain.set_fade_gain(2.0);
        assert_eq!(gain.fade_gain(), 1.0);
    }
}
