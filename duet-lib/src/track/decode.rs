//! Symphonia helpers for decoding a whole file into interleaved `f32`.

use std::fs::File;
use std::path::Path;

use log::{debug, warn};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::LoadError;

/// Interleaved samples of one decoded file, in its own rate and layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels
    }
}

/// Decode the first playable track of `path`.
///
/// The file extension is used as the probe hint. Packets the codec rejects
/// are skipped; any other decoder error aborts the load.
pub fn decode_file(path: &Path) -> Result<DecodedAudio, LoadError> {
    let src = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| LoadError::NoAudio(path.display().to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder =
        symphonia::default::get_codecs().make(&codec_params, &DecoderOptions::default())?;

    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|channels| channels.count());
    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(Error::DecodeError(err)) => {
                warn!("skipping bad packet in {}: {}", path.display(), err);
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channels.get_or_insert(spec.channels.count());

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    let (sample_rate, channels) = match (sample_rate, channels) {
        (Some(rate), Some(channels)) if rate > 0 && channels > 0 && !samples.is_empty() => {
            (rate, channels)
        }
        _ => return Err(LoadError::NoAudio(path.display().to_string())),
    };

    debug!(
        "decoded {}: {} frames, {} channels at {} Hz",
        path.display(),
        samples.len() / channels,
        channels,
        sample_rate
    );

    Ok(DecodedAudio {
        samples,
        channels,
        sample_rate,
    })
}
