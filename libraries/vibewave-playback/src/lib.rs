//! VibeWave - Playback Control
//!
//! Platform-agnostic transport for VibeWave.
//!
//! This crate provides:
//! - The playback state machine (Idle, Paused, Playing)
//! - Navigation over a context (whole catalog or one playlist)
//! - Shuffle and repeat
//! - Seek by time, by offset and by percentage
//! - Volume (0-100, decibel curve, mute)
//!
//! # Architecture
//!
//! `vibewave-playback` has no audio dependency. Platforms implement
//! [`AudioDevice`] and feed [`DeviceEvent`]s back to the controller. Each
//! load carries a [`LoadTicket`]; completions for superseded loads are
//! dropped, so the most recent request always wins.
//!
//! # Example
//!
//! ```rust
//! use vibewave_core::{Track, TrackId};
//! use vibewave_playback::{NullDevice, PlaybackConfig, PlaybackController, PlayerState};
//!
//! let catalog = vec![
//!     Track::new(1, "One", "A").with_url("one.mp3"),
//!     Track::new(2, "Two", "B").with_url("two.mp3"),
//! ];
//!
//! let mut controller = PlaybackController::new(NullDevice::new(), PlaybackConfig::default());
//! controller.set_context(vec![TrackId::from(1), TrackId::from(2)], None);
//! controller.next(&catalog).unwrap();
//!
//! // The platform reports the load back
//! for event in controller.device_mut().take_events() {
//!     controller.handle_device_event(event, &catalog);
//! }
//! assert_eq!(controller.state(), PlayerState::Playing);
//! assert_eq!(controller.current_track().map(|t| t.title.as_str()), Some("One"));
//! ```

#![forbid(unsafe_code)]

pub mod controller;
pub mod device;
pub mod error;
pub mod shuffle;
pub mod volume;

pub use controller::{
    PlaybackConfig, PlaybackController, PlayerState, MAX_UNKNOWN_SEEK_SECS,
    RESTART_THRESHOLD_SECS, SEEK_STEP_SECS,
};
pub use device::{AudioDevice, DeviceEvent, LoadTicket, NullDevice};
pub use error::{PlaybackError, Result};
pub use volume::{Volume, VolumeIcon, DEFAULT_VOLUME};
