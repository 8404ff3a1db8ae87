//! Immutable interleaved stereo buffers and the loaded track pair.

use std::sync::Arc;

use super::CHANNELS;

/// Normalised interleaved stereo `f32` samples for one track.
///
/// The sample data is reference counted so the output callback, the
/// controller and any clone of a [`TrackPair`] share one allocation. A
/// buffer is never mutated after construction; a reload replaces it.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wrap interleaved stereo samples.
    ///
    /// A trailing half frame (odd sample count) is dropped.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32) -> Self {
        let whole = samples.len() - samples.len() % CHANNELS;
        samples.truncate(whole);
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    /// Interleaved sample slice.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of stereo frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / CHANNELS
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The two buffers of a loaded session.
///
/// `mixed` (backing plus vocal) goes to the performer device and
/// `background` (backing only) to the broadcast device. Both always share a
/// sample rate and frame count.
#[derive(Debug, Clone)]
pub struct TrackPair {
    mixed: SampleBuffer,
    background: SampleBuffer,
}

impl TrackPair {
    /// Pair two buffers, returning `None` when their rate or length differ.
    pub fn new(mixed: SampleBuffer, background: SampleBuffer) -> Option<Self> {
        if mixed.sample_rate() != background.sample_rate()
            || mixed.frames() != background.frames()
        {
            return None;
        }
        Some(Self { mixed, background })
    }

    pub fn mixed(&self) -> &SampleBuffer {
        &self.mixed
    }

    pub fn background(&self) -> &SampleBuffer {
        &self.background
    }

    pub fn sample_rate(&self) -> u32 {
        self.mixed.sample_rate()
    }

    pub fn frames(&self) -> usize {
        self.mixed.frames()
    }

    /// Session length in seconds.
    pub fn duration(&self) -> f64 {
        self.mixed.duration()
    }
}
