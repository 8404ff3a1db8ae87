//! Error types surfaced by the playback engine, the track loader and the
//! settings layer.

use std::fmt::{Display, Formatter};

use crate::playback::backend::OutputRole;

/// Failure raised while starting or addressing output streams.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// A start was requested before a track pair and devices were loaded.
    NotLoaded,
    /// A hardware stream failed to open or start.
    DeviceOpen {
        role: OutputRole,
        device: String,
        reason: String,
    },
    /// The audio host could not list its output devices.
    DeviceEnumeration(String),
    /// A device selector matched no output device.
    DeviceNotFound(String),
}

impl Display for PlaybackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "no tracks loaded"),
            Self::DeviceOpen {
                role,
                device,
                reason,
            } => write!(
                f,
                "failed to open {} output on device '{}': {}",
                role, device, reason
            ),
            Self::DeviceEnumeration(err) => write!(f, "could not query output devices: {}", err),
            Self::DeviceNotFound(selector) => write!(f, "output device not found: {}", selector),
        }
    }
}

impl std::error::Error for PlaybackError {}

/// Failure raised while decoding and mixing the two source files.
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Decode(String),
    Resample(String),
    NoAudio(String),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Decode(err) => write!(f, "decode error: {}", err),
            Self::Resample(err) => write!(f, "resample error: {}", err),
            Self::NoAudio(path) => write!(f, "no decodable audio in {}", path),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<symphonia::core::errors::Error> for LoadError {
    fn from(value: symphonia::core::errors::Error) -> Self {
        match value {
            symphonia::core::errors::Error::IoError(err) => Self::Io(err),
            other => Self::Decode(other.to_string()),
        }
    }
}

/// Failure raised while reading a settings file.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Parse(err) => write!(f, "invalid settings: {}", err),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}
