//! VibeWave - Desktop Audio
//!
//! [`CpalDevice`] implements `vibewave_playback::AudioDevice` for Windows,
//! macOS and Linux.
//!
//! Loading is asynchronous: `load` queues the request and returns. A
//! background loader downloads the media, decodes it with symphonia and
//! resamples it to the device rate. The result is reported through the
//! `DeviceEvent` sender passed to [`CpalDevice::new`].

#![forbid(unsafe_code)]

pub mod decode;
pub mod error;
mod output;

pub use decode::{decode_bytes, resample, DecodedAudio};
pub use error::{AudioError, Result};
pub use output::CpalDevice;
