//! Channel normalisation and the vocal overlay.

use crate::audio::CHANNELS;

/// Convert interleaved audio with `channels` channels to stereo.
///
/// Mono is duplicated to both sides; layouts wider than stereo keep their
/// first two channels.
pub fn to_stereo(samples: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().flat_map(|&sample| [sample, sample]).collect(),
        CHANNELS => samples.to_vec(),
        n => samples
            .chunks_exact(n)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}

/// Convert a gain in decibels to a linear factor.
pub fn db_to_linear(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Lay `vocal` over `backing`.
///
/// The result has the backing track's length. Where the vocal overlaps,
/// the backing sample is scaled by `backing_gain` before the vocal is added
/// and the sum is clamped to `[-1, 1]`. Vocal past the end of the backing
/// track is dropped.
pub fn overlay(backing: &[f32], vocal: &[f32], backing_gain: f32) -> Vec<f32> {
    backing
        .iter()
        .enumerate()
        .map(|(index, &sample)| match vocal.get(index) {
            Some(&voice) => (sample * backing_gain + voice).clamp(-1.0, 1.0),
            None => sample,
        })
        .collect()
}
