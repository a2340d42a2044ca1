//! Session: the one place the catalog, the playlist store and the
//! playback controller meet.
//!
//! The session owns all three for the lifetime of the application. Front
//! ends send it [`ViewCommand`]s and device events; everything it has to
//! say comes out as [`Notification`]s on its [`View`].

use tracing::{debug, info};
use vibewave_catalog::SongCatalog;
use vibewave_core::{
    FailureKind, Notification, PlaylistId, PlaylistSummary, TrackId, TrackResolver, VibeError,
    View, ViewCommand,
};
use vibewave_playback::{AudioDevice, DeviceEvent, PlaybackController};
use vibewave_storage::{KeyValueStore, PlaylistStore};

pub const NAME_REQUIRED: &str = "Playlist name required.";
pub const ALREADY_IN_PLAYLIST: &str = "This song is already in the playlist.";

/// Session behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Load the first catalog track, paused, when the session starts
    pub autoload_first_track: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            autoload_first_track: true,
        }
    }
}

pub struct Session<D, S, V> {
    catalog: SongCatalog,
    playlists: PlaylistStore<S>,
    player: PlaybackController<D>,
    view: V,
    options: SessionOptions,
}

impl<D, S, V> Session<D, S, V>
where
    D: AudioDevice,
    S: KeyValueStore,
    V: View,
{
    pub fn new(
        catalog: SongCatalog,
        playlists: PlaylistStore<S>,
        player: PlaybackController<D>,
        view: V,
        options: SessionOptions,
    ) -> Self {
        Self {
            catalog,
            playlists,
            player,
            view,
            options,
        }
    }

    /// Publish the initial state.
    ///
    /// `fetch_failure` carries the catalog error, if the fetch failed. The
    /// catalog becomes the navigation context and, when enabled, its
    /// first track is loaded paused.
    pub fn start(&mut self, fetch_failure: Option<String>) {
        if let Some(message) = fetch_failure {
            self.report(&VibeError::network(message));
        }
        self.flush_storage_failure();

        self.player.set_context(self.catalog.track_ids(), None);
        info!(
            tracks = self.catalog.tracks().len(),
            playlists = self.playlists.len(),
            "Session started"
        );

        self.publish_playlist_list();
        self.view.notify(&Notification::VolumeChanged {
            level: self.player.volume().level(),
            muted: self.player.volume().is_muted(),
        });
        self.view.notify(&Notification::ModesChanged {
            shuffle: self.player.shuffle(),
            repeat: self.player.repeat(),
        });
        self.view
            .notify(&Notification::PlaybackStateChanged(self.player.snapshot()));

        if self.options.autoload_first_track {
            if let Some(first) = self.catalog.tracks().first().map(|t| t.id.clone()) {
                if let Err(e) = self.player.load(&first, false, &self.catalog) {
                    self.report(&VibeError::from(e));
                }
            }
        }
        self.flush_player_events();
    }

    /// Apply one user intent
    pub fn dispatch(&mut self, command: ViewCommand) {
        debug!(?command, "Dispatching view command");

        let result = match command {
            ViewCommand::CreatePlaylist { name, description } => {
                self.create_playlist(&name, &description)
            }
            ViewCommand::RenamePlaylist {
                playlist_id,
                name,
                description,
            } => self.rename_playlist(&playlist_id, &name, &description),
            ViewCommand::DeletePlaylist { playlist_id } => self.delete_playlist(&playlist_id),
            ViewCommand::AddTrack {
                playlist_id,
                track_id,
            } => self.add_track(&playlist_id, track_id),
            ViewCommand::RemoveTrack {
                playlist_id,
                track_id,
            } => self.remove_track(&playlist_id, track_id),
            ViewCommand::OpenPlaylist { playlist_id } => self.open_playlist(&playlist_id),
            ViewCommand::OpenCatalog => {
                self.player.set_context(self.catalog.track_ids(), None);
                self.publish_search("");
                Ok(())
            }
            ViewCommand::Play { track_id } => self
                .player
                .play_or_toggle(&track_id, &self.catalog)
                .map_err(Into::into),
            ViewCommand::TogglePlayPause => self
                .player
                .toggle_play_pause(&self.catalog)
                .map_err(Into::into),
            ViewCommand::Next => self.player.next(&self.catalog).map_err(Into::into),
            ViewCommand::Previous => self.player.previous(&self.catalog).map_err(Into::into),
            ViewCommand::Seek { position } => self.player.seek(position).map_err(Into::into),
            ViewCommand::SeekBy { delta } => self.player.seek_by(delta).map_err(Into::into),
            ViewCommand::SetVolume { level } => {
                self.player.set_volume(level).map_err(Into::into)
            }
            ViewCommand::ToggleMute => self.player.toggle_mute().map_err(Into::into),
            ViewCommand::ToggleShuffle => {
                self.player.toggle_shuffle();
                Ok(())
            }
            ViewCommand::ToggleRepeat => {
                self.player.toggle_repeat();
                Ok(())
            }
            ViewCommand::Search { query } => {
                self.publish_search(&query);
                Ok(())
            }
            ViewCommand::ListPlaylists => {
                self.publish_playlist_list();
                Ok(())
            }
            ViewCommand::ShowPlaylist { playlist_id } => self.publish_playlist(&playlist_id),
        };

        if let Err(e) = result {
            self.report(&e);
        }
        self.flush_storage_failure();
        self.flush_player_events();
    }

    /// Feed back an event from the audio device
    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        self.player.handle_device_event(event, &self.catalog);
        self.flush_player_events();
    }

    pub fn catalog(&self) -> &SongCatalog {
        &self.catalog
    }

    pub fn playlists(&self) -> &PlaylistStore<S> {
        &self.playlists
    }

    pub fn player(&self) -> &PlaybackController<D> {
        &self.player
    }

    pub fn device_mut(&mut self) -> &mut D {
        self.player.device_mut()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    // ===== Playlist commands =====

    fn create_playlist(&mut self, name: &str, description: &str) -> Result<(), VibeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VibeError::invalid_input(NAME_REQUIRED));
        }

        let playlist = self.playlists.create(name, description.trim());
        self.view.notify(&Notification::info(format!(
            "Created playlist \"{}\" ({})",
            playlist.name, playlist.id
        )));
        self.publish_playlist_list();
        Ok(())
    }

    fn rename_playlist(
        &mut self,
        playlist_id: &PlaylistId,
        name: &str,
        description: &str,
    ) -> Result<(), VibeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VibeError::invalid_input(NAME_REQUIRED));
        }
        if !self
            .playlists
            .rename(playlist_id, name, description.trim())
        {
            return Err(VibeError::PlaylistNotFound(playlist_id.clone()));
        }

        self.publish_playlist_list();
        self.publish_playlist(playlist_id)
    }

    fn delete_playlist(&mut self, playlist_id: &PlaylistId) -> Result<(), VibeError> {
        let holds_active_track = match (self.playlists.get(playlist_id), self.player.active_track_id())
        {
            (Some(playlist), Some(active)) => playlist.contains(active),
            (Some(_), None) => false,
            (None, _) => return Err(VibeError::PlaylistNotFound(playlist_id.clone())),
        };

        if holds_active_track {
            info!(playlist_id = %playlist_id, "Deleted playlist held the playing track");
            self.player.stop()?;
        }
        self.playlists.delete(playlist_id);

        if self.player.context_playlist() == Some(playlist_id) {
            self.player.set_context(self.catalog.track_ids(), None);
        }

        self.view.notify(&Notification::info("Playlist deleted"));
        self.publish_playlist_list();
        Ok(())
    }

    fn add_track(
        &mut self,
        playlist_id: &PlaylistId,
        track_id: TrackId,
    ) -> Result<(), VibeError> {
        let track_id = self.catalog_id(track_id);
        let Some(playlist) = self.playlists.get(playlist_id) else {
            return Err(VibeError::PlaylistNotFound(playlist_id.clone()));
        };
        let Some(track) = self.catalog.resolve(&track_id) else {
            return Err(VibeError::TrackNotFound(track_id));
        };
        if playlist.contains(&track.id) {
            self.view.notify(&Notification::info(ALREADY_IN_PLAYLIST));
            return Ok(());
        }

        self.playlists.add_track(playlist_id, track.id.clone());
        if let Some(playlist) = self.playlists.get(playlist_id) {
            self.view.notify(&Notification::info(format!(
                "Added \"{}\" to {}",
                track.display_title(),
                playlist.name
            )));
        }

        self.refresh_context(playlist_id);
        self.publish_playlist_list();
        self.publish_playlist(playlist_id)
    }

    fn remove_track(
        &mut self,
        playlist_id: &PlaylistId,
        track_id: TrackId,
    ) -> Result<(), VibeError> {
        let track_id = self.catalog_id(track_id);
        if self.playlists.get(playlist_id).is_none() {
            return Err(VibeError::PlaylistNotFound(playlist_id.clone()));
        }
        if !self.playlists.remove_track(playlist_id, track_id.clone()) {
            return Err(VibeError::invalid_input(format!(
                "Track {track_id} is not in the playlist"
            )));
        }

        let in_active_playlist = self.player.context_playlist() == Some(playlist_id);
        if in_active_playlist && self.player.active_track_id() == Some(&track_id) {
            info!(track_id = %track_id, "Removed the playing track");
            self.player.stop()?;
        }

        self.refresh_context(playlist_id);
        self.publish_playlist_list();
        self.publish_playlist(playlist_id)
    }

    /// The catalog's form of a typed id, so `1.0` names track `1`. Ids the
    /// catalog does not know are kept as typed.
    fn catalog_id(&self, track_id: TrackId) -> TrackId {
        if self.catalog.resolve(&track_id).is_some() {
            return track_id;
        }
        match track_id.numeric_form() {
            Some(numeric) if self.catalog.resolve(&numeric).is_some() => numeric,
            _ => track_id,
        }
    }

    fn open_playlist(&mut self, playlist_id: &PlaylistId) -> Result<(), VibeError> {
        let Some(playlist) = self.playlists.get(playlist_id) else {
            return Err(VibeError::PlaylistNotFound(playlist_id.clone()));
        };
        let ids = playlist.song_ids().to_vec();
        self.player.set_context(ids, Some(playlist_id.clone()));
        self.publish_playlist(playlist_id)
    }

    /// Keep the navigation context in step with an edited playlist
    fn refresh_context(&mut self, playlist_id: &PlaylistId) {
        if self.player.context_playlist() != Some(playlist_id) {
            return;
        }
        if let Some(playlist) = self.playlists.get(playlist_id) {
            let ids = playlist.song_ids().to_vec();
            self.player.set_context(ids, Some(playlist_id.clone()));
        }
    }

    // ===== Notifications =====

    fn publish_playlist_list(&mut self) {
        let playlists = self
            .playlists
            .list()
            .iter()
            .map(|playlist| PlaylistSummary {
                id: playlist.id.clone(),
                name: playlist.name.clone(),
                track_count: playlist.len(),
                cover: playlist
                    .song_ids()
                    .iter()
                    .filter_map(|id| self.catalog.get_by_id(id))
                    .map(|track| track.cover.clone())
                    .find(|cover| !cover.is_empty()),
            })
            .collect();
        self.view
            .notify(&Notification::PlaylistListChanged { playlists });
    }

    fn publish_playlist(&mut self, playlist_id: &PlaylistId) -> Result<(), VibeError> {
        let Some(playlist) = self.playlists.get(playlist_id) else {
            return Err(VibeError::PlaylistNotFound(playlist_id.clone()));
        };
        let notification = Notification::PlaylistContentsChanged {
            playlist_id: playlist.id.clone(),
            name: playlist.name.clone(),
            description: playlist.description.clone(),
            tracks: self.catalog.resolve_all(playlist.song_ids()),
        };
        self.view.notify(&notification);
        Ok(())
    }

    fn publish_search(&mut self, query: &str) {
        let tracks = self.catalog.search(query).cloned().collect();
        self.view.notify(&Notification::SearchResults {
            query: query.to_string(),
            tracks,
        });
    }

    fn report(&mut self, error: &VibeError) {
        self.view
            .notify(&Notification::failure(error.kind(), error.to_string()));
    }

    fn flush_storage_failure(&mut self) {
        if let Some(e) = self.playlists.take_failure() {
            self.view.notify(&Notification::failure(
                FailureKind::StorageUnavailable,
                format!("{e}; changes are kept for this session only"),
            ));
        }
    }

    fn flush_player_events(&mut self) {
        for notification in self.player.drain_events() {
            self.view.notify(&notification);
        }
    }
}
