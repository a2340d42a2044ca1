//! Audio device seam
//!
//! The controller never touches audio hardware. It drives an
//! [`AudioDevice`] and learns about load completion, progress and track
//! end through [`DeviceEvent`]s the platform feeds back in.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifies one media load request.
///
/// Tickets increase monotonically per controller. Events carrying a
/// ticket other than the latest request are stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadTicket(pub u64);

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Platform audio output
///
/// `load` must return promptly; the outcome arrives later as
/// [`DeviceEvent::Loaded`] or [`DeviceEvent::Failed`]. Until then the
/// previously loaded media keeps its state. A freshly loaded track starts
/// paused at position zero.
pub trait AudioDevice {
    /// Begin loading `url`
    fn load(&mut self, ticket: LoadTicket, url: &str) -> Result<()>;

    /// Start or resume output of the loaded media
    fn play(&mut self) -> Result<()>;

    /// Pause output, keeping the position
    fn pause(&mut self) -> Result<()>;

    /// Move the playhead
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Linear output gain (0.0 silences)
    fn set_gain(&mut self, gain: f32) -> Result<()>;

    /// Drop the loaded media and any load in flight
    fn unload(&mut self) -> Result<()>;
}

impl<D: AudioDevice + ?Sized> AudioDevice for Box<D> {
    fn load(&mut self, ticket: LoadTicket, url: &str) -> Result<()> {
        (**self).load(ticket, url)
    }

    fn play(&mut self) -> Result<()> {
        (**self).play()
    }

    fn pause(&mut self) -> Result<()> {
        (**self).pause()
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        (**self).seek(position)
    }

    fn set_gain(&mut self, gain: f32) -> Result<()> {
        (**self).set_gain(gain)
    }

    fn unload(&mut self) -> Result<()> {
        (**self).unload()
    }
}

/// Events reported by an audio device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceEvent {
    /// Media for `ticket` is ready; duration in seconds (0 when unknown)
    Loaded {
        /// Request this answers
        ticket: LoadTicket,
        /// Media duration in seconds
        duration: f64,
    },

    /// Media for `ticket` could not be loaded
    Failed {
        /// Request this answers
        ticket: LoadTicket,
        /// Human-readable cause
        reason: String,
    },

    /// Playhead moved during output
    Progress {
        /// Media the position belongs to
        ticket: LoadTicket,
        /// Position in seconds
        position: f64,
    },

    /// Output reached the end of the media
    Ended {
        /// Media that finished
        ticket: LoadTicket,
    },
}

impl DeviceEvent {
    /// Ticket the event refers to
    pub fn ticket(&self) -> LoadTicket {
        match self {
            Self::Loaded { ticket, .. }
            | Self::Failed { ticket, .. }
            | Self::Progress { ticket, .. }
            | Self::Ended { ticket } => *ticket,
        }
    }
}

/// Device that accepts everything and produces no sound.
///
/// Every load succeeds at once with an unknown duration. The completion
/// waits in an outbox until the owner takes it with
/// [`NullDevice::take_events`] and feeds it back to the controller.
#[derive(Debug, Default)]
pub struct NullDevice {
    outbox: Vec<DeviceEvent>,
    loaded: Option<LoadTicket>,
}

impl NullDevice {
    /// New silent device
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the events produced since the last call
    pub fn take_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Ticket of the loaded media, if any
    pub fn loaded(&self) -> Option<LoadTicket> {
        self.loaded
    }
}

impl AudioDevice for NullDevice {
    fn load(&mut self, ticket: LoadTicket, _url: &str) -> Result<()> {
        self.loaded = Some(ticket);
        self.outbox.push(DeviceEvent::Loaded {
            ticket,
            duration: 0.0,
        });
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        Ok(())
    }

    fn seek(&mut self, _position: Duration) -> Result<()> {
        Ok(())
    }

    fn set_gain(&mut self, _gain: f32) -> Result<()> {
        Ok(())
    }

    fn unload(&mut self) -> Result<()> {
        self.loaded = None;
        self.outbox.clear();
        Ok(())
    }
}
