//! Volume level, mute flag and output gain
//!
//! Levels run 0-100. The device gain follows a decibel curve so equal
//! steps on the slider sound like equal steps in loudness.

use serde::{Deserialize, Serialize};

/// Level the player starts at
pub const DEFAULT_VOLUME: u8 = 80;

/// Levels below this show the "low" icon
const LOW_VOLUME_THRESHOLD: u8 = 50;

/// Range covered by the slider, in dB below unity
const DYNAMIC_RANGE_DB: f32 = 60.0;

/// Volume state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    level: u8,
    muted: bool,
}

/// Icon shown next to the volume slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeIcon {
    /// Muted, or level 0
    Muted,
    /// Level 1-49
    Low,
    /// Level 50-100
    High,
}

impl Volume {
    /// Unmuted volume at `level` (clamped to 100)
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(100),
            muted: false,
        }
    }

    /// Current level (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Set level (clamped to 100). The mute flag is untouched.
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
    }

    /// Whether output is muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Set the mute flag
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Flip the mute flag
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Linear gain for the device: 0 when muted or at level 0,
    /// otherwise `10^((level - 100) * 0.6 / 20)`.
    pub fn gain(&self) -> f32 {
        if self.muted || self.level == 0 {
            return 0.0;
        }
        let db = (f32::from(self.level) - 100.0) * DYNAMIC_RANGE_DB / 100.0;
        10.0_f32.powf(db / 20.0)
    }

    /// Icon for the current state
    pub fn icon(&self) -> VolumeIcon {
        if self.muted || self.level == 0 {
            VolumeIcon::Muted
        } else if self.level < LOW_VOLUME_THRESHOLD {
            VolumeIcon::Low
        } else {
            VolumeIcon::High
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_is_clamped() {
        assert_eq!(Volume::new(150).level(), 100);
        let mut v = Volume::default();
        v.set_level(255);
        assert_eq!(v.level(), 100);
    }

    #[test]
    fn gain_curve_endpoints() {
        assert_eq!(Volume::new(0).gain(), 0.0);
        assert!((Volume::new(100).gain() - 1.0).abs() < 1e-6);
        // -12 dB
        assert!((Volume::new(80).gain() - 0.251).abs() < 0.001);
    }

    #[test]
    fn gain_increases_with_level() {
        let gains: Vec<f32> = (1..=100).map(|l| Volume::new(l).gain()).collect();
        assert!(gains.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn mute_zeroes_gain_and_keeps_level() {
        let mut v = Volume::new(60);
        v.toggle_mute();
        assert_eq!(v.gain(), 0.0);
        assert_eq!(v.level(), 60);
        v.toggle_mute();
        assert!(v.gain() > 0.0);
    }

    #[test]
    fn icon_thresholds() {
        assert_eq!(Volume::new(0).icon(), VolumeIcon::Muted);
        assert_eq!(Volume::new(49).icon(), VolumeIcon::Low);
        assert_eq!(Volume::new(50).icon(), VolumeIcon::High);

        let mut v = Volume::new(90);
        v.set_muted(true);
        assert_eq!(v.icon(), VolumeIcon::Muted);
    }
}
