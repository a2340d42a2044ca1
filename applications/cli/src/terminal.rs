//! Line-oriented terminal view

use std::io::Write;
use vibewave_core::format::format_seconds;
use vibewave_core::{Notification, PlaybackSnapshot, Track, TrackId, View};

/// Prints notifications as plain text lines.
///
/// Progress updates are frequent, so by default a playback line is only
/// printed when the track or the playing flag changes.
pub struct TerminalView<W: Write> {
    out: W,
    show_progress: bool,
    last_playback: Option<(Option<TrackId>, bool)>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            show_progress: false,
            last_playback: None,
        }
    }

    /// Print every position update as well
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, notification: &Notification) -> std::io::Result<()> {
        match notification {
            Notification::PlaybackStateChanged(snapshot) => self.render_playback(snapshot),
            Notification::VolumeChanged { level, muted } => {
                if *muted {
                    writeln!(self.out, "Volume: muted ({level})")
                } else {
                    writeln!(self.out, "Volume: {level}")
                }
            }
            Notification::ModesChanged { shuffle, repeat } => writeln!(
                self.out,
                "Shuffle: {}  Repeat: {}",
                on_off(*shuffle),
                on_off(*repeat)
            ),
            Notification::PlaylistListChanged { playlists } => {
                if playlists.is_empty() {
                    return writeln!(self.out, "No playlists yet.");
                }
                writeln!(self.out, "Playlists:")?;
                for playlist in playlists {
                    writeln!(
                        self.out,
                        "  [{}] {} ({} {})",
                        playlist.id,
                        playlist.name,
                        playlist.track_count,
                        if playlist.track_count == 1 { "song" } else { "songs" }
                    )?;
                }
                Ok(())
            }
            Notification::PlaylistContentsChanged {
                playlist_id,
                name,
                description,
                tracks,
            } => {
                writeln!(self.out, "{name} [{playlist_id}]")?;
                if !description.is_empty() {
                    writeln!(self.out, "  {description}")?;
                }
                if tracks.is_empty() {
                    return writeln!(self.out, "  No songs in this playlist.");
                }
                self.render_tracks(tracks)
            }
            Notification::SearchResults { query, tracks } => {
                if query.trim().is_empty() {
                    writeln!(self.out, "All songs ({}):", tracks.len())?;
                } else if tracks.is_empty() {
                    return writeln!(self.out, "No songs match \"{query}\".");
                } else {
                    writeln!(self.out, "{} result(s) for \"{query}\":", tracks.len())?;
                }
                self.render_tracks(tracks)
            }
            Notification::Failure { message, .. } => writeln!(self.out, "error: {message}"),
            Notification::Info { message } => writeln!(self.out, "{message}"),
        }
    }

    fn render_playback(&mut self, snapshot: &PlaybackSnapshot) -> std::io::Result<()> {
        let key = (snapshot.track.as_ref().map(|t| t.id.clone()), snapshot.playing);
        if !self.show_progress && self.last_playback.as_ref() == Some(&key) {
            return Ok(());
        }
        self.last_playback = Some(key);

        let Some(track) = &snapshot.track else {
            return writeln!(self.out, "[stopped] Nothing playing");
        };
        let status = if snapshot.playing { "playing" } else { "paused" };
        let duration = if snapshot.duration > 0.0 {
            format_seconds(snapshot.duration)
        } else {
            "--:--".to_string()
        };
        writeln!(
            self.out,
            "[{status}] {} - {} ({} / {duration})",
            track.display_title(),
            track.artist,
            format_seconds(snapshot.position)
        )
    }

    fn render_tracks(&mut self, tracks: &[Track]) -> std::io::Result<()> {
        for (index, track) in tracks.iter().enumerate() {
            writeln!(
                self.out,
                "  {:>2}. [{}] {} - {}",
                index + 1,
                track.id,
                track.display_title(),
                track.artist
            )?;
        }
        Ok(())
    }
}

impl<W: Write> View for TerminalView<W> {
    fn notify(&mut self, notification: &Notification) {
        if let Err(e) = self.render(notification).and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibewave_core::{FailureKind, PlaylistId, PlaylistSummary};

    fn rendered(notifications: &[Notification]) -> String {
        let mut view = TerminalView::new(Vec::new());
        for notification in notifications {
            view.notify(notification);
        }
        String::from_utf8(view.into_inner()).unwrap()
    }

    fn snapshot(playing: bool, position: f64) -> Notification {
        Notification::PlaybackStateChanged(PlaybackSnapshot {
            track: Some(Track::new(1, "Late_Night", "Band")),
            playing,
            position,
            duration: 185.0,
        })
    }

    #[test]
    fn playback_line_uses_display_title() {
        let out = rendered(&[snapshot(true, 65.0)]);
        assert_eq!(out, "[playing] Late Night - Band (1:05 / 3:05)\n");
    }

    #[test]
    fn progress_is_collapsed_by_default() {
        let out = rendered(&[snapshot(true, 1.0), snapshot(true, 2.0), snapshot(false, 2.0)]);
        assert_eq!(out.lines().count(), 2);
        assert!(out.lines().nth(1).unwrap().starts_with("[paused]"));
    }

    #[test]
    fn progress_can_be_shown() {
        let mut view = TerminalView::new(Vec::new()).with_progress(true);
        view.notify(&snapshot(true, 1.0));
        view.notify(&snapshot(true, 2.0));
        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 2);
    }

    #[test]
    fn playlists_and_failures() {
        let out = rendered(&[
            Notification::PlaylistListChanged {
                playlists: vec![PlaylistSummary {
                    id: PlaylistId::new("17"),
                    name: "Focus".into(),
                    track_count: 1,
                    cover: None,
                }],
            },
            Notification::failure(FailureKind::InvalidCommand, "Playlist name required."),
        ]);
        assert_eq!(
            out,
            "Playlists:\n  [17] Focus (1 song)\nerror: Playlist name required.\n"
        );
    }

    #[test]
    fn empty_search_lists_everything() {
        let out = rendered(&[Notification::SearchResults {
            query: String::new(),
            tracks: vec![Track::new(3, "Song", "Artist")],
        }]);
        assert_eq!(out, "All songs (1):\n   1. [3] Song - Artist\n");
    }
}
