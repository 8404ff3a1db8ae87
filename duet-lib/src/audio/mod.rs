//! Sample storage shared between the loader, the controller and the output
//! callbacks.

pub mod buffer;
pub mod cursor;

/// Interleaved channel count for every buffer the engine plays.
pub const CHANNELS: usize = 2;
