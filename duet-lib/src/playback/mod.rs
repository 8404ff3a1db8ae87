//! Dual-output playback engine.
//!
//! [`Player`] keeps a performer stream and a broadcast stream in lockstep,
//! fading in on start, fading out on pause and restarting both streams on
//! seek. Hardware access goes through [`AudioBackend`].

pub mod backend;
pub mod cpal_output;
pub mod fade;
pub mod gain;
pub mod output;
pub mod player;
pub mod position;
pub mod scrub;
pub mod session;
mod state;

pub use backend::{AudioBackend, DeviceId, DevicePair, OutputRole, OutputStream, StreamSpec};
pub use cpal_output::{list_output_devices, CpalBackend, OutputDeviceInfo};
pub use player::Player;
