//! Loading the performer and broadcast tracks from a backing file and a
//! vocal file.

pub mod decode;
pub mod mix;
pub mod resample;

use std::path::Path;

use log::{debug, info};

use crate::audio::buffer::{SampleBuffer, TrackPair};
use crate::audio::CHANNELS;
use crate::error::LoadError;
use crate::settings::PlayerSettings;

use self::decode::decode_file;
use self::mix::{db_to_linear, overlay, to_stereo};
use self::resample::resample;

/// Decode, normalise and mix a backing track and a vocal track.
///
/// Both files are converted to stereo at `settings.sample_rate`. The mixed
/// (performer) track is the backing track with the vocal overlaid, the
/// backing attenuated by `settings.vocal_overlay_db` underneath it. The
/// background (broadcast) track is the backing track alone.
///
/// # Arguments
///
/// * `backing` - Backing track file.
/// * `vocal` - Guide vocal file.
/// * `settings` - Target rate and overlay gain.
/// * `progress` - Called with 0, 25, 50, 75 and 100 as the load proceeds.
pub fn load_track_pair(
    backing: impl AsRef<Path>,
    vocal: impl AsRef<Path>,
    settings: &PlayerSettings,
    mut progress: impl FnMut(u8),
) -> Result<TrackPair, LoadError> {
    let backing = backing.as_ref();
    let vocal = vocal.as_ref();
    let rate = settings.sample_rate;

    progress(0);
    let backing_samples = load_stereo(backing, rate)?;
    progress(25);
    let vocal_samples = load_stereo(vocal, rate)?;
    progress(50);

    let mixed = overlay(
        &backing_samples,
        &vocal_samples,
        db_to_linear(settings.vocal_overlay_db),
    );
    progress(75);

    let tracks = TrackPair::new(
        SampleBuffer::new(mixed, rate),
        SampleBuffer::new(backing_samples, rate),
    )
    .ok_or_else(|| LoadError::Decode("mixed and backing tracks differ in length".to_string()))?;

    info!(
        "loaded {} with {}: {:.2}s at {} Hz",
        backing.display(),
        vocal.display(),
        tracks.duration(),
        rate
    );
    progress(100);
    Ok(tracks)
}

fn load_stereo(path: &Path, rate: u32) -> Result<Vec<f32>, LoadError> {
    let decoded = decode_file(path)?;
    debug!(
        "decoded {}: {} frames, {} channels at {} Hz",
        path.display(),
        decoded.frames(),
        decoded.channels,
        decoded.sample_rate
    );
    let stereo = to_stereo(&decoded.samples, decoded.channels);
    resample(&stereo, decoded.sample_rate, rate, CHANNELS)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn write_wav(path: &Path, channels: u16, rate: u32, frames: usize, value: f32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let sample = (value * 32768.0) as i16;
        for _ in 0..frames * channels as usize {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn fixture(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        dir.path().join(name)
    }

    #[test]
    fn mixes_vocal_over_backing() {
        let dir = tempfile::tempdir().unwrap();
        let backing = fixture(&dir, "backing.wav");
        let vocal = fixture(&dir, "vocal.wav");
        write_wav(&backing, 2, 44_100, 44_100, 0.5);
        write_wav(&vocal, 1, 44_100, 22_050, 0.25);

        let mut steps = Vec::new();
        let tracks = load_track_pair(&backing, &vocal, &PlayerSettings::default(), |step| {
            steps.push(step)
        })
        .unwrap();

        assert_eq!(steps, vec![0, 25, 50, 75, 100]);
        assert_eq!(tracks.sample_rate(), 44_100);
        assert_eq!(tracks.frames(), 44_100);
        assert!((tracks.duration() - 1.0).abs() < 1e-9);

        let mixed = tracks.mixed().samples();
        let background = tracks.background().samples();
        let under_vocal = 0.5 * db_to_linear(-6.0) + 0.25;
        assert!((mixed[0] - under_vocal).abs() < 1e-3);
        assert!((mixed[1] - under_vocal).abs() < 1e-3);
        assert!((mixed[30_000 * 2] - 0.5).abs() < 1e-3);
        assert!(background.iter().all(|sample| (sample - 0.5).abs() < 1e-3));
    }

    #[test]
    fn longer_vocal_is_cut_to_the_backing_length() {
        let dir = tempfile::tempdir().unwrap();
        let backing = fixture(&dir, "backing.wav");
        let vocal = fixture(&dir, "vocal.wav");
        write_wav(&backing, 2, 44_100, 4_410, 0.1);
        write_wav(&vocal, 2, 44_100, 44_100, 0.1);

        let tracks = load_track_pair(&backing, &vocal, &PlayerSettings::default(), |_| {}).unwrap();
        assert_eq!(tracks.frames(), 4_410);
        assert_eq!(tracks.mixed().frames(), tracks.background().frames());
    }

    #[test]
    fn other_rates_are_converted() {
        let dir = tempfile::tempdir().unwrap();
        let backing = fixture(&dir, "backing.wav");
        let vocal = fixture(&dir, "vocal.wav");
        write_wav(&backing, 2, 22_050, 22_050, 0.2);
        write_wav(&vocal, 1, 48_000, 24_000, 0.2);

        let tracks = load_track_pair(&backing, &vocal, &PlayerSettings::default(), |_| {}).unwrap();
        assert_eq!(tracks.sample_rate(), 44_100);
        assert_eq!(tracks.frames(), 44_100);
    }

    #[test]
    fn missing_files_are_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let backing = fixture(&dir, "backing.wav");
        write_wav(&backing, 2, 44_100, 100, 0.1);

        let mut steps = Vec::new();
        let err = load_track_pair(
            &backing,
            fixture(&dir, "missing.wav"),
            &PlayerSettings::default(),
            |step| steps.push(step),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
        assert_eq!(steps, vec![0, 25]);
    }

    #[test]
    fn non_audio_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let backing = fixture(&dir, "backing.wav");
        std::fs::write(&backing, b"definitely not a riff header").unwrap();
        let vocal = fixture(&dir, "vocal.wav");
        write_wav(&vocal, 1, 44_100, 100, 0.1);

        let result = load_track_pair(&backing, &vocal, &PlayerSettings::default(), |_| {});
        assert!(result.is_err());
    }
}
