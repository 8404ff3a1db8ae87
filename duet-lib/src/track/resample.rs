//! Sample rate conversion with rubato.

use log::debug;
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::error::LoadError;

/// Resample interleaved audio from `input_rate` to `output_rate`.
///
/// # Arguments
///
/// * `input` - Interleaved samples.
/// * `input_rate` - Rate of `input`.
/// * `output_rate` - Rate to convert to.
/// * `channels` - Channel count of `input`.
///
/// # Returns
///
/// Interleaved samples holding `round(frames * output_rate / input_rate)`
/// frames. Equal rates return a copy.
pub fn resample(
    input: &[f32],
    input_rate: u32,
    output_rate: u32,
    channels: usize,
) -> Result<Vec<f32>, LoadError> {
    if input_rate == output_rate || input.is_empty() || channels == 0 {
        return Ok(input.to_vec());
    }
    if input_rate == 0 || output_rate == 0 {
        return Err(LoadError::Resample(format!(
            "cannot convert {} Hz to {} Hz",
            input_rate, output_rate
        )));
    }

    let planar = deinterleave(input, channels);
    let input_frames = planar[0].len();
    let ratio = output_rate as f64 / input_rate as f64;

    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0,
        PolynomialDegree::Septic,
        input_frames,
        channels,
    )
    .map_err(|err| LoadError::Resample(err.to_string()))?;

    let mut planar = resampler
        .process(&planar, None)
        .map_err(|err| LoadError::Resample(err.to_string()))?;

    let output_frames = (input_frames as f64 * ratio).round() as usize;
    for channel in planar.iter_mut() {
        channel.resize(output_frames, 0.0);
    }

    debug!(
        "resampled {} frames at {} Hz to {} frames at {} Hz",
        input_frames, input_rate, output_frames, output_rate
    );

    Ok(interleave(&planar))
}

/// `[L, R, L, R, ...]` to `[[L, L, ...], [R, R, ...]]`.
fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels;
    let mut planar = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (channel, sample) in frame.iter().enumerate() {
            planar[channel].push(*sample);
        }
    }
    planar
}

fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    let frames = planar.first().map(Vec::len).unwrap_or(0);
    let mut interleaved = Vec::with_capacity(frames * planar.len());
    for frame in 0..frames {
        for channel in planar {
            interleaved.push(channel[frame]);
        }
    }
    interleaved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_conversion_preserves_order() {
        let interleaved = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let planar = deinterleave(&interleaved, 2);
        assert_eq!(planar, vec![vec![1.0, 3.0, 5.0], vec![2.0, 4.0, 6.0]]);
        assert_eq!(interleave(&planar), interleaved);
    }

    #[test]
    fn equal_rates_pass_through() {
        let input = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(resample(&input, 44_100, 44_100, 2).unwrap(), input);
        assert!(resample(&[], 22_050, 44_100, 2).unwrap().is_empty());
    }

    #[test]
    fn upsampling_doubles_the_frame_count() {
        let input: Vec<f32> = (0..2_000)
            .flat_map(|i| {
                let value = (i as f32 * 0.01).sin() * 0.5;
                [value, value]
            })
            .collect();
        let output = resample(&input, 22_050, 44_100, 2).unwrap();
        assert_eq!(output.len(), 4_000 * 2);
        assert!(output.iter().all(|sample| sample.is_finite()));
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(matches!(
            resample(&[0.0, 0.0], 0, 44_100, 2),
            Err(LoadError::Resample(_))
        ));
    }
}
