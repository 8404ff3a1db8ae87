//! # Duet
//!
//! Synchronised dual-device playback for live singing over a backing
//! track. The performer hears backing plus guide vocal on one output while
//! the broadcast output carries the backing track alone, sample-aligned
//! with the performer's mix.
//!
//! The crate decodes and mixes the two source files ([`track`]), and plays
//! them through two hardware streams with session-aware fades, debounced
//! seeking and wall-clock position tracking ([`playback`]).

pub mod audio;
pub mod error;
pub mod playback;
pub mod settings;
pub mod tools;
pub mod track;

pub use error::{LoadError, PlaybackError, SettingsError};
pub use playback::Player;
pub use settings::PlayerSettings;
