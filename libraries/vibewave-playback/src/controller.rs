//! Playback controller - transport state machine
//!
//! Owns the current-track pointer, the navigation context, the
//! play/shuffle/repeat flags and the volume. Talks to the audio hardware
//! only through [`AudioDevice`], and only ever learns about media through
//! [`DeviceEvent`]s.
//!
//! State changes are queued as [`Notification`]s; the owner drains them
//! with [`PlaybackController::drain_events`] and forwards them to a view.

use crate::device::{AudioDevice, DeviceEvent, LoadTicket};
use crate::error::{PlaybackError, Result};
use crate::shuffle::pick_other_index;
use crate::volume::{Volume, VolumeIcon, DEFAULT_VOLUME};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use vibewave_core::{
    FailureKind, Notification, PlaybackSnapshot, PlaylistId, Track, TrackId, TrackResolver,
};

/// Past this position, "previous" restarts the current track instead
pub const RESTART_THRESHOLD_SECS: f64 = 3.0;

/// Step used by the seek-forward/seek-back keys
pub const SEEK_STEP_SECS: f64 = 5.0;

/// Upper seek bound while the track duration is unknown
pub const MAX_UNKNOWN_SEEK_SECS: f64 = 24.0 * 60.0 * 60.0;

/// Initial controller settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Starting volume (0-100)
    pub volume: u8,
    /// Start with shuffle on
    pub shuffle: bool,
    /// Start with repeat on
    pub repeat: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            shuffle: false,
            repeat: false,
        }
    }
}

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No track loaded
    Idle,
    /// Track loaded, output paused
    Paused,
    /// Track loaded, output running
    Playing,
}

/// Load request still waiting for the device
#[derive(Debug, Clone)]
struct PendingLoad {
    ticket: LoadTicket,
    track: Track,
    autoplay: bool,
}

/// Media the device has ready
#[derive(Debug, Clone)]
struct LoadedMedia {
    ticket: LoadTicket,
    track: Track,
    duration: f64,
}

/// Platform-agnostic playback controller
pub struct PlaybackController<D> {
    device: D,

    // Navigation context: whole catalog or one playlist
    context: Vec<TrackId>,
    context_playlist: Option<PlaylistId>,

    // Index of the most recently requested track within the context.
    // Moves when a load is issued, reverts if that load fails.
    current_index: Option<usize>,

    pending: Option<PendingLoad>,
    loaded: Option<LoadedMedia>,
    next_ticket: u64,

    playing: bool,
    position: f64,
    shuffle: bool,
    repeat: bool,
    volume: Volume,

    rng: StdRng,

    // Event queue for view synchronization
    pending_events: Vec<Notification>,
}

impl<D: AudioDevice> PlaybackController<D> {
    /// Create a controller driving `device`
    pub fn new(mut device: D, config: PlaybackConfig) -> Self {
        let volume = Volume::new(config.volume);
        if let Err(e) = device.set_gain(volume.gain()) {
            warn!(error = %e, "Failed to apply initial volume");
        }

        Self {
            device,
            context: Vec::new(),
            context_playlist: None,
            current_index: None,
            pending: None,
            loaded: None,
            next_ticket: 1,
            playing: false,
            position: 0.0,
            shuffle: config.shuffle,
            repeat: config.repeat,
            volume,
            rng: StdRng::from_entropy(),
            pending_events: Vec::new(),
        }
    }

    /// Replace the random source (seeded in tests)
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    // ===== Context =====

    /// Set the ordered track list that next/previous walk.
    ///
    /// The current index is re-derived from the current track, so a
    /// playing track keeps playing across context switches.
    pub fn set_context(&mut self, track_ids: Vec<TrackId>, playlist: Option<PlaylistId>) {
        self.context = track_ids;
        self.context_playlist = playlist;
        self.current_index = self
            .active_track_id()
            .and_then(|id| self.context.iter().position(|t| t == id));
        debug!(
            len = self.context.len(),
            playlist = ?self.context_playlist,
            index = ?self.current_index,
            "Playback context changed"
        );
    }

    /// Track ids of the navigation context
    pub fn context(&self) -> &[TrackId] {
        &self.context
    }

    /// Playlist the context came from, `None` for the whole catalog
    pub fn context_playlist(&self) -> Option<&PlaylistId> {
        self.context_playlist.as_ref()
    }

    /// Index of the current track within the context
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    // ===== Loading =====

    /// Ask the device to load `track_id`.
    ///
    /// Fails without touching any state when the id does not resolve or
    /// the track has no media reference. On success the load completes
    /// later through [`DeviceEvent::Loaded`]; the track then plays if
    /// `autoplay` is set and stays paused otherwise. A newer load
    /// supersedes this one.
    pub fn load<R>(&mut self, track_id: &TrackId, autoplay: bool, resolver: &R) -> Result<LoadTicket>
    where
        R: TrackResolver + ?Sized,
    {
        let track = resolver
            .resolve(track_id)
            .ok_or_else(|| PlaybackError::TrackNotFound(track_id.clone()))?;
        let index = self.context.iter().position(|id| id == &track.id);
        self.issue_load(track, index, autoplay)
    }

    fn load_index<R>(&mut self, index: usize, autoplay: bool, resolver: &R) -> Result<LoadTicket>
    where
        R: TrackResolver + ?Sized,
    {
        let Some(track_id) = self.context.get(index).cloned() else {
            return Err(PlaybackError::NoTrackLoaded);
        };
        let track = resolver
            .resolve(&track_id)
            .ok_or(PlaybackError::TrackNotFound(track_id))?;
        self.issue_load(track, Some(index), autoplay)
    }

    fn issue_load(
        &mut self,
        track: Track,
        index: Option<usize>,
        autoplay: bool,
    ) -> Result<LoadTicket> {
        if !track.is_playable() {
            return Err(PlaybackError::MediaUnplayable {
                track_id: track.id,
                reason: "no media reference".into(),
            });
        }

        let ticket = LoadTicket(self.next_ticket);
        self.device
            .load(ticket, &track.url)
            .map_err(|e| PlaybackError::MediaUnplayable {
                track_id: track.id.clone(),
                reason: e.to_string(),
            })?;
        self.next_ticket += 1;

        if let Some(superseded) = &self.pending {
            debug!(ticket = %superseded.ticket, "Superseding load in flight");
        }
        info!(
            ticket = %ticket,
            track_id = %track.id,
            title = %track.title,
            autoplay,
            "Loading track"
        );

        self.current_index = index;
        self.pending = Some(PendingLoad {
            ticket,
            track,
            autoplay,
        });
        Ok(ticket)
    }

    // ===== Device events =====

    /// Apply an event reported by the device.
    ///
    /// Events for superseded loads are dropped. Failures that surface here
    /// are queued as [`Notification::Failure`].
    pub fn handle_device_event<R>(&mut self, event: DeviceEvent, resolver: &R)
    where
        R: TrackResolver + ?Sized,
    {
        match event {
            DeviceEvent::Loaded { ticket, duration } => self.on_loaded(ticket, duration),
            DeviceEvent::Failed { ticket, reason } => self.on_load_failed(ticket, &reason),
            DeviceEvent::Progress { ticket, position } => {
                if self.is_loaded_ticket(ticket) {
                    self.position = clamp_position(position, self.duration());
                    self.emit_state_changed();
                }
            }
            DeviceEvent::Ended { ticket } => {
                if !self.is_loaded_ticket(ticket) || self.pending.is_some() {
                    debug!(ticket = %ticket, "Ignoring end of superseded media");
                    return;
                }
                self.playing = false;
                self.position = self.duration();
                if let Err(e) = self.on_track_ended(resolver) {
                    self.emit_error(&e);
                }
            }
        }
    }

    fn on_loaded(&mut self, ticket: LoadTicket, duration: f64) {
        let pending = match self.pending.take() {
            Some(pending) if pending.ticket == ticket => pending,
            other => {
                self.pending = other;
                debug!(ticket = %ticket, "Discarding stale load completion");
                return;
            }
        };

        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        debug!(ticket = %ticket, track_id = %pending.track.id, duration, "Track loaded");

        self.loaded = Some(LoadedMedia {
            ticket,
            track: pending.track,
            duration,
        });
        self.position = 0.0;
        self.playing = false;

        if pending.autoplay {
            match self.device.play() {
                Ok(()) => self.playing = true,
                Err(e) => self.emit_error(&e),
            }
        }
        self.emit_state_changed();
    }

    fn on_load_failed(&mut self, ticket: LoadTicket, reason: &str) {
        let pending = match self.pending.take() {
            Some(pending) if pending.ticket == ticket => pending,
            other => {
                self.pending = other;
                debug!(ticket = %ticket, "Discarding stale load failure");
                return;
            }
        };

        warn!(ticket = %ticket, track_id = %pending.track.id, reason, "Track failed to load");

        // Pointer goes back to whatever is still loaded
        self.current_index = self.loaded.as_ref().and_then(|loaded| {
            self.context.iter().position(|id| id == &loaded.track.id)
        });

        self.emit_error(&PlaybackError::MediaUnplayable {
            track_id: pending.track.id,
            reason: reason.to_string(),
        });
    }

    fn is_loaded_ticket(&self, ticket: LoadTicket) -> bool {
        self.loaded.as_ref().is_some_and(|loaded| loaded.ticket == ticket)
    }

    // ===== Transport =====

    /// Start or resume playback.
    ///
    /// With nothing loaded, loads the first track of the context.
    pub fn play<R>(&mut self, resolver: &R) -> Result<()>
    where
        R: TrackResolver + ?Sized,
    {
        if let Some(pending) = &mut self.pending {
            pending.autoplay = true;
            return Ok(());
        }

        match (self.loaded.is_some(), self.playing) {
            (true, true) => Ok(()),
            (true, false) => {
                self.device.play()?;
                self.playing = true;
                self.emit_state_changed();
                Ok(())
            }
            (false, _) if self.context.is_empty() => Ok(()),
            (false, _) => self.load_index(0, true, resolver).map(|_| ()),
        }
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        if let Some(pending) = &mut self.pending {
            pending.autoplay = false;
        }
        if self.playing {
            self.device.pause()?;
            self.playing = false;
            self.emit_state_changed();
        }
        Ok(())
    }

    /// Play/pause button
    pub fn toggle_play_pause<R>(&mut self, resolver: &R) -> Result<()>
    where
        R: TrackResolver + ?Sized,
    {
        let wants_playback = self
            .pending
            .as_ref()
            .map_or(self.playing, |pending| pending.autoplay);
        if wants_playback {
            self.pause()
        } else {
            self.play(resolver)
        }
    }

    /// Play a track from a list: toggles it if it is already current,
    /// otherwise loads it and starts playing.
    pub fn play_or_toggle<R>(&mut self, track_id: &TrackId, resolver: &R) -> Result<()>
    where
        R: TrackResolver + ?Sized,
    {
        if self.active_track_id() == Some(track_id) {
            self.toggle_play_pause(resolver)
        } else {
            self.load(track_id, true, resolver).map(|_| ())
        }
    }

    /// Skip to the next track and play it.
    ///
    /// With shuffle on, picks uniformly among the other tracks.
    #[allow(clippy::should_implement_trait)]
    pub fn next<R>(&mut self, resolver: &R) -> Result<()>
    where
        R: TrackResolver + ?Sized,
    {
        let len = self.context.len();
        let index = if self.shuffle {
            pick_other_index(&mut self.rng, len, self.current_index)
        } else if len == 0 {
            None
        } else {
            Some(self.current_index.map_or(0, |i| (i + 1) % len))
        };

        match index {
            Some(index) => self.load_index(index, true, resolver).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Restart the current track when past the threshold, otherwise go to
    /// the previous track (wrapping) and play it.
    pub fn previous<R>(&mut self, resolver: &R) -> Result<()>
    where
        R: TrackResolver + ?Sized,
    {
        if self.loaded.is_some() && self.position > RESTART_THRESHOLD_SECS {
            debug!(position = self.position, "Restarting current track");
            return self.seek(0.0);
        }

        let len = self.context.len();
        if len == 0 {
            return Ok(());
        }
        let index = self
            .current_index
            .map_or(len - 1, |i| (i % len + len - 1) % len);
        self.load_index(index, true, resolver).map(|_| ())
    }

    /// Track reached its end: repeat reloads it, otherwise advance.
    pub fn on_track_ended<R>(&mut self, resolver: &R) -> Result<()>
    where
        R: TrackResolver + ?Sized,
    {
        match self.loaded.as_ref().map(|loaded| loaded.track.id.clone()) {
            Some(track_id) if self.repeat => {
                debug!(track_id = %track_id, "Repeating track");
                self.load(&track_id, true, resolver).map(|_| ())
            }
            _ => self.next(resolver),
        }
    }

    /// Unload everything and return to idle
    pub fn stop(&mut self) -> Result<()> {
        let result = self.device.unload();
        self.pending = None;
        self.loaded = None;
        self.current_index = None;
        self.playing = false;
        self.position = 0.0;
        info!("Playback stopped");
        self.emit_state_changed();
        result
    }

    // ===== Seek =====

    /// Seek to `position` seconds, clamped to the track
    pub fn seek(&mut self, position: f64) -> Result<()> {
        let Some(loaded) = &self.loaded else {
            return Err(PlaybackError::NoTrackLoaded);
        };
        let target = clamp_position(position, loaded.duration);
        self.device.seek(Duration::from_secs_f64(target))?;
        self.position = target;
        self.emit_state_changed();
        Ok(())
    }

    /// Seek relative to the current position
    pub fn seek_by(&mut self, delta: f64) -> Result<()> {
        self.seek(self.position + delta)
    }

    /// Seek to `percent` (0-100) of the track. No-op while the duration
    /// is unknown.
    pub fn seek_percent(&mut self, percent: f64) -> Result<()> {
        let duration = self.duration();
        if self.loaded.is_none() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if duration <= 0.0 || !percent.is_finite() {
            return Ok(());
        }
        self.seek(duration * percent.clamp(0.0, 100.0) / 100.0)
    }

    // ===== Volume =====

    /// Set volume (0-100). A non-zero level unmutes.
    pub fn set_volume(&mut self, level: u8) -> Result<()> {
        self.volume.set_level(level);
        if level > 0 {
            self.volume.set_muted(false);
        }
        self.device.set_gain(self.volume.gain())?;
        self.emit_volume_changed();
        Ok(())
    }

    /// Flip mute
    pub fn toggle_mute(&mut self) -> Result<()> {
        self.volume.toggle_mute();
        self.device.set_gain(self.volume.gain())?;
        self.emit_volume_changed();
        Ok(())
    }

    /// Current volume
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// Icon for the volume control
    pub fn volume_icon(&self) -> VolumeIcon {
        self.volume.icon()
    }

    // ===== Modes =====

    /// Set shuffle
    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
        self.emit_modes_changed();
    }

    /// Flip shuffle
    pub fn toggle_shuffle(&mut self) {
        self.set_shuffle(!self.shuffle);
    }

    /// Shuffle flag
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Set repeat
    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
        self.emit_modes_changed();
    }

    /// Flip repeat
    pub fn toggle_repeat(&mut self) {
        self.set_repeat(!self.repeat);
    }

    /// Repeat flag
    pub fn repeat(&self) -> bool {
        self.repeat
    }

    // ===== State Queries =====

    /// Transport state
    pub fn state(&self) -> PlayerState {
        match (&self.loaded, self.playing) {
            (None, _) => PlayerState::Idle,
            (Some(_), false) => PlayerState::Paused,
            (Some(_), true) => PlayerState::Playing,
        }
    }

    /// Whether output is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether a load is in flight
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Loaded track
    pub fn current_track(&self) -> Option<&Track> {
        self.loaded.as_ref().map(|loaded| &loaded.track)
    }

    /// Track currently requested: the load in flight, else the loaded one
    pub fn active_track_id(&self) -> Option<&TrackId> {
        self.pending
            .as_ref()
            .map(|pending| &pending.track.id)
            .or_else(|| self.current_track().map(|track| &track.id))
    }

    /// Position in seconds
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Duration of the loaded media in seconds (0 when unknown)
    pub fn duration(&self) -> f64 {
        self.loaded.as_ref().map_or(0.0, |loaded| loaded.duration)
    }

    /// Snapshot for the view
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            track: self.current_track().cloned(),
            playing: self.playing,
            position: self.position,
            duration: self.duration(),
        }
    }

    /// Audio device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Audio device, mutably
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    // ===== Event Handling =====

    /// Drain all pending notifications
    pub fn drain_events(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending notifications
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn emit_state_changed(&mut self) {
        let snapshot = self.snapshot();
        self.pending_events
            .push(Notification::PlaybackStateChanged(snapshot));
    }

    fn emit_volume_changed(&mut self) {
        self.pending_events.push(Notification::VolumeChanged {
            level: self.volume.level(),
            muted: self.volume.is_muted(),
        });
    }

    fn emit_modes_changed(&mut self) {
        self.pending_events.push(Notification::ModesChanged {
            shuffle: self.shuffle,
            repeat: self.repeat,
        });
    }

    fn emit_error(&mut self, error: &PlaybackError) {
        let kind = match error {
            PlaybackError::TrackNotFound(_) => FailureKind::TrackNotFound,
            PlaybackError::MediaUnplayable { .. } | PlaybackError::Device(_) => {
                FailureKind::MediaUnplayable
            }
            PlaybackError::NoTrackLoaded => FailureKind::InvalidCommand,
        };
        self.pending_events
            .push(Notification::failure(kind, error.to_string()));
    }
}

/// Clamp to `[0, duration]`, or to `[0, MAX_UNKNOWN_SEEK_SECS]` while the
/// duration is unknown (zero)
fn clamp_position(position: f64, duration: f64) -> f64 {
    if !position.is_finite() || position < 0.0 {
        return 0.0;
    }
    if duration > 0.0 {
        position.min(duration)
    } else {
        position.min(MAX_UNKNOWN_SEEK_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_handles_bounds() {
        assert_eq!(clamp_position(-2.0, 10.0), 0.0);
        assert_eq!(clamp_position(12.0, 10.0), 10.0);
        assert_eq!(clamp_position(12.0, 0.0), 12.0);
        assert_eq!(clamp_position(1e20, 0.0), MAX_UNKNOWN_SEEK_SECS);
        assert_eq!(clamp_position(f64::NAN, 10.0), 0.0);
    }
}
