//! Output device boundary.
//!
//! The controller only talks to hardware through [`AudioBackend`] and
//! [`OutputStream`]; [`CpalBackend`](super::cpal_output::CpalBackend) is the
//! production implementation.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::PlaybackError;

use super::output::OutputCallback;

/// Which of the two outputs a stream feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputRole {
    /// Guide mix (backing plus vocal) heard by the performer.
    Performer,
    /// Backing only, captured by the broadcast software.
    Broadcast,
}

impl Display for OutputRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Performer => write!(f, "performer"),
            Self::Broadcast => write!(f, "broadcast"),
        }
    }
}

/// Output device selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceId {
    /// The host's default output device.
    Default,
    /// Position in the host's output device list.
    Index(usize),
    /// Exact device name.
    Named(String),
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Index(index) => write!(f, "#{}", index),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for DeviceId {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("default") {
            return Ok(Self::Default);
        }
        match value.parse::<usize>() {
            Ok(index) => Ok(Self::Index(index)),
            Err(_) => Ok(Self::Named(value.to_string())),
        }
    }
}

/// Devices for the two outputs of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePair {
    pub performer: DeviceId,
    pub broadcast: DeviceId,
}

impl DevicePair {
    pub fn new(performer: DeviceId, broadcast: DeviceId) -> Self {
        Self {
            performer,
            broadcast,
        }
    }

    pub fn get(&self, role: OutputRole) -> &DeviceId {
        match role {
            OutputRole::Performer => &self.performer,
            OutputRole::Broadcast => &self.broadcast,
        }
    }

    /// Both outputs point at the same device, so the broadcast would hear the
    /// vocal.
    pub fn is_shared(&self) -> bool {
        self.performer == self.broadcast
    }
}

/// Stream format requested from a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSpec {
    pub sample_rate: u32,
    pub channels: u16,
    /// Fixed block size in frames, or `None` for the host default.
    pub block_frames: Option<u32>,
}

/// An opened hardware stream. Dropping it closes the stream.
pub trait OutputStream: Send {
    /// Begin pulling blocks from the callback.
    fn start(&mut self) -> Result<(), PlaybackError>;
    /// Stop pulling blocks. Errors are logged and swallowed.
    fn stop(&mut self);
    /// `false` once the stream stopped, failed or its callback completed.
    fn is_active(&self) -> bool;
}

/// Opens output streams on named devices.
pub trait AudioBackend: Send + Sync {
    fn open(
        &self,
        role: OutputRole,
        device: &DeviceId,
        spec: StreamSpec,
        callback: OutputCallback,
    ) -> Result<Box<dyn OutputStream>, PlaybackError>;
}
