//! `cpal` implementation of the output boundary plus device enumeration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, error, info, warn};

use crate::error::PlaybackError;

use super::backend::{AudioBackend, DeviceId, OutputRole, OutputStream, StreamSpec};
use super::output::{OutputCallback, StreamOutcome};

/// One output-capable device as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDeviceInfo {
    pub index: usize,
    pub name: String,
    pub default_sample_rate: Option<u32>,
}

impl OutputDeviceInfo {
    /// Display label, e.g. `"Speakers - 48000 Hz"`.
    pub fn label(&self) -> String {
        match self.default_sample_rate {
            Some(rate) => format!("{} - {} Hz", self.name, rate),
            None => self.name.clone(),
        }
    }
}

/// List the default host's output devices in host order.
pub fn list_output_devices() -> Result<Vec<OutputDeviceInfo>, PlaybackError> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|err| PlaybackError::DeviceEnumeration(err.to_string()))?;

    let devices: Vec<OutputDeviceInfo> = devices
        .enumerate()
        .map(|(index, device)| OutputDeviceInfo {
            index,
            name: device.name().unwrap_or_else(|_| "Unknown".to_string()),
            default_sample_rate: device
                .default_output_config()
                .ok()
                .map(|config| config.sample_rate().0),
        })
        .collect();

    debug!("found {} output devices", devices.len());
    Ok(devices)
}

fn resolve_device(host: &cpal::Host, id: &DeviceId) -> Result<cpal::Device, PlaybackError> {
    let enumeration = |err: cpal::DevicesError| PlaybackError::DeviceEnumeration(err.to_string());
    match id {
        DeviceId::Default => host
            .default_output_device()
            .ok_or_else(|| PlaybackError::DeviceNotFound(id.to_string())),
        DeviceId::Index(index) => host
            .output_devices()
            .map_err(enumeration)?
            .nth(*index)
            .ok_or_else(|| PlaybackError::DeviceNotFound(id.to_string())),
        DeviceId::Named(name) => host
            .output_devices()
            .map_err(enumeration)?
            .find(|device| device.name().ok().as_deref() == Some(name.as_str()))
            .ok_or_else(|| PlaybackError::DeviceNotFound(id.to_string())),
    }
}

/// `cpal::Stream` is `!Send` on some platforms; the controller only touches
/// it under the playback lock, one thread at a time.
struct StreamHolder(cpal::Stream);
unsafe impl Send for StreamHolder {}

struct CpalStream {
    stream: StreamHolder,
    active: Arc<AtomicBool>,
    started: bool,
    role: OutputRole,
    device: String,
}

impl OutputStream for CpalStream {
    fn start(&mut self) -> Result<(), PlaybackError> {
        self.stream
            .0
            .play()
            .map_err(|err| PlaybackError::DeviceOpen {
                role: self.role,
                device: self.device.clone(),
                reason: err.to_string(),
            })?;
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Err(err) = self.stream.0.pause() {
            warn!("{} stream on '{}' did not pause: {}", self.role, self.device, err);
        }
    }

    fn is_active(&self) -> bool {
        self.started && self.active.load(Ordering::Acquire)
    }
}

/// Output backend over the default `cpal` host.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpalBackend;

impl CpalBackend {
    pub fn new() -> Self {
        Self
    }
}

impl AudioBackend for CpalBackend {
    fn open(
        &self,
        role: OutputRole,
        device_id: &DeviceId,
        spec: StreamSpec,
        mut callback: OutputCallback,
    ) -> Result<Box<dyn OutputStream>, PlaybackError> {
        let open_error = |reason: String| PlaybackError::DeviceOpen {
            role,
            device: device_id.to_string(),
            reason,
        };

        let host = cpal::default_host();
        let device = resolve_device(&host, device_id).map_err(|err| open_error(err.to_string()))?;
        let device_name = device.name().unwrap_or_else(|_| device_id.to_string());

        let config = cpal::StreamConfig {
            channels: spec.channels,
            sample_rate: cpal::SampleRate(spec.sample_rate),
            buffer_size: match spec.block_frames {
                Some(frames) => cpal::BufferSize::Fixed(frames),
                None => cpal::BufferSize::Default,
            },
        };

        let active = Arc::new(AtomicBool::new(true));
        let data_active = active.clone();
        let error_active = active.clone();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !data_active.load(Ordering::Acquire) {
                        data.fill(0.0);
                        return;
                    }
                    if callback.render(data) == StreamOutcome::Complete {
                        data_active.store(false, Ordering::Release);
                    }
                },
                move |err| {
                    error!("{} stream error: {}", role, err);
                    error_active.store(false, Ordering::Release);
                },
                None,
            )
            .map_err(|err| open_error(err.to_string()))?;

        info!(
            "opened {} output on '{}' ({} Hz, {:?})",
            role, device_name, spec.sample_rate, config.buffer_size
        );

        Ok(Box::new(CpalStream {
            stream: StreamHolder(stream),
            active,
            started: false,
            role,
            device: device_name,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_include_the_default_rate() {
        let info = OutputDeviceInfo {
            index: 0,
            name: "Headphones".to_string(),
            default_sample_rate: Some(44_100),
        };
        assert_eq!(info.label(), "Headphones - 44100 Hz");

        let info = OutputDeviceInfo {
            default_sample_rate: None,
            ..info
        };
        assert_eq!(info.label(), "Headphones");
    }
}
