//! Output selection: real audio when available, silence otherwise

use crossbeam_channel::Sender;
use std::time::Duration;
use vibewave_audio_desktop::CpalDevice;
use vibewave_playback::{AudioDevice, DeviceEvent, LoadTicket, NullDevice, Result};

pub enum OutputDevice {
    Speakers(CpalDevice),
    Silent(NullDevice),
}

impl OutputDevice {
    /// Open the default sound card, falling back to silent output
    pub fn open(events: Sender<DeviceEvent>, no_audio: bool) -> Self {
        if no_audio {
            tracing::info!("Audio output disabled");
            return Self::Silent(NullDevice::new());
        }
        match CpalDevice::new(events) {
            Ok(device) => Self::Speakers(device),
            Err(e) => {
                tracing::warn!(error = %e, "No audio output, continuing silently");
                Self::Silent(NullDevice::new())
            }
        }
    }

    /// Events produced synchronously by the silent device.
    ///
    /// The sound card reports through the channel given to [`Self::open`]
    /// instead, so this is always empty for it.
    pub fn take_events(&mut self) -> Vec<DeviceEvent> {
        match self {
            Self::Speakers(_) => Vec::new(),
            Self::Silent(device) => device.take_events(),
        }
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Silent(_))
    }
}

impl AudioDevice for OutputDevice {
    fn load(&mut self, ticket: LoadTicket, url: &str) -> Result<()> {
        match self {
            Self::Speakers(device) => device.load(ticket, url),
            Self::Silent(device) => device.load(ticket, url),
        }
    }

    fn play(&mut self) -> Result<()> {
        match self {
            Self::Speakers(device) => device.play(),
            Self::Silent(device) => device.play(),
        }
    }

    fn pause(&mut self) -> Result<()> {
        match self {
            Self::Speakers(device) => device.pause(),
            Self::Silent(device) => device.pause(),
        }
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        match self {
            Self::Speakers(device) => device.seek(position),
            Self::Silent(device) => device.seek(position),
        }
    }

    fn set_gain(&mut self, gain: f32) -> Result<()> {
        match self {
            Self::Speakers(device) => device.set_gain(gain),
            Self::Silent(device) => device.set_gain(gain),
        }
    }

    fn unload(&mut self) -> Result<()> {
        match self {
            Self::Speakers(device) => device.unload(),
            Self::Silent(device) => device.unload(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_device_reports_loads_locally() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let mut device = OutputDevice::open(tx, true);
        assert!(device.is_silent());

        device.load(LoadTicket(4), "song.mp3").unwrap();
        assert_eq!(
            device.take_events(),
            vec![DeviceEvent::Loaded {
                ticket: LoadTicket(4),
                duration: 0.0
            }]
        );
        assert!(device.take_events().is_empty());
    }
}
