//! Shell command parsing
//!
//! Turns one line typed at the prompt into a [`ViewCommand`]. Playlist
//! names and descriptions are separated by ` | `:
//!
//! ```text
//! new Road trip | songs for the car
//! add 1700000000000 42
//! ```

use crate::error::{AppError, Result};
use vibewave_core::{PlaylistId, TrackId, ViewCommand};
use vibewave_playback::SEEK_STEP_SECS;

/// What a shell line asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(ViewCommand),
    Help,
    Quit,
    Empty,
}

pub const HELP: &str = "\
Commands:
  songs                         show the catalog and play through it
  search <text>                 find songs by title or artist
  play [song]                   play a song, or toggle play/pause
  next | prev                   skip forward / back
  seek <secs|m:ss>              jump to a position
  ff | rw                       seek 5 seconds forward / back
  vol <0-100> | mute            volume
  shuffle | repeat              toggle modes
  playlists                     list playlists
  new <name> [| description]    create a playlist
  rename <id> <name> [| desc]   rename a playlist
  delete <id>                   delete a playlist
  open <id> | show <id>         play from / show a playlist
  add <id> <song>               add a song to a playlist
  remove <id> <song>            remove a song from a playlist
  help | quit";

pub fn parse_line(line: &str) -> Result<Input> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "" => return Ok(Input::Empty),
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" | "q" => return Ok(Input::Quit),

        "songs" | "catalog" => ViewCommand::OpenCatalog,
        "search" | "find" => ViewCommand::Search {
            query: rest.to_string(),
        },
        "play" | "p" if rest.is_empty() => ViewCommand::TogglePlayPause,
        "play" | "p" => ViewCommand::Play {
            track_id: TrackId::new(rest),
        },
        "pause" | "toggle" => ViewCommand::TogglePlayPause,
        "next" | "n" => ViewCommand::Next,
        "prev" | "previous" | "b" => ViewCommand::Previous,
        "seek" => ViewCommand::Seek {
            position: parse_position(required(rest, "seek", "a position")?)?,
        },
        "ff" => ViewCommand::SeekBy {
            delta: SEEK_STEP_SECS,
        },
        "rw" => ViewCommand::SeekBy {
            delta: -SEEK_STEP_SECS,
        },
        "vol" | "volume" => {
            let value = required(rest, "vol", "a level")?;
            let level = value
                .parse::<u8>()
                .ok()
                .filter(|level| *level <= 100)
                .ok_or_else(|| AppError::InvalidArgument {
                    argument: "volume",
                    value: value.to_string(),
                })?;
            ViewCommand::SetVolume { level }
        }
        "mute" => ViewCommand::ToggleMute,
        "shuffle" => ViewCommand::ToggleShuffle,
        "repeat" => ViewCommand::ToggleRepeat,

        "playlists" | "ls" => ViewCommand::ListPlaylists,
        "new" | "create" => {
            let (name, description) = split_description(rest);
            ViewCommand::CreatePlaylist { name, description }
        }
        "rename" => {
            let (id, rest) = first_word(rest, "rename", "a playlist id")?;
            let (name, description) = split_description(rest);
            ViewCommand::RenamePlaylist {
                playlist_id: PlaylistId::new(id),
                name,
                description,
            }
        }
        "delete" | "rm" => ViewCommand::DeletePlaylist {
            playlist_id: PlaylistId::new(required(rest, "delete", "a playlist id")?),
        },
        "open" => ViewCommand::OpenPlaylist {
            playlist_id: PlaylistId::new(required(rest, "open", "a playlist id")?),
        },
        "show" => ViewCommand::ShowPlaylist {
            playlist_id: PlaylistId::new(required(rest, "show", "a playlist id")?),
        },
        "add" => {
            let (id, song) = first_word(rest, "add", "a playlist id")?;
            ViewCommand::AddTrack {
                playlist_id: PlaylistId::new(id),
                track_id: TrackId::new(required(song, "add", "a song id")?),
            }
        }
        "remove" => {
            let (id, song) = first_word(rest, "remove", "a playlist id")?;
            ViewCommand::RemoveTrack {
                playlist_id: PlaylistId::new(id),
                track_id: TrackId::new(required(song, "remove", "a song id")?),
            }
        }

        _ => return Err(AppError::UnknownCommand(word.to_string())),
    };

    Ok(Input::Command(command))
}

fn required<'a>(value: &'a str, command: &'static str, argument: &'static str) -> Result<&'a str> {
    if value.is_empty() {
        Err(AppError::MissingArgument { command, argument })
    } else {
        Ok(value)
    }
}

fn first_word<'a>(
    value: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<(&'a str, &'a str)> {
    let value = required(value, command, argument)?;
    Ok(match value.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (value, ""),
    })
}

fn split_description(value: &str) -> (String, String) {
    match value.split_once('|') {
        Some((name, description)) => (name.trim().to_string(), description.trim().to_string()),
        None => (value.trim().to_string(), String::new()),
    }
}

/// Seconds (`75`, `12.5`) or minutes and seconds (`1:15`)
fn parse_position(value: &str) -> Result<f64> {
    let invalid = || AppError::InvalidArgument {
        argument: "position",
        value: value.to_string(),
    };

    let seconds = match value.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
            let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
            if !(0.0..60.0).contains(&seconds) {
                return Err(invalid());
            }
            f64::from(minutes) * 60.0 + seconds
        }
        None => value.parse().map_err(|_| invalid())?,
    };

    if seconds.is_finite() && seconds >= 0.0 {
        Ok(seconds)
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> ViewCommand {
        match parse_line(line).unwrap() {
            Input::Command(command) => command,
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn transport_words() {
        assert_eq!(command("play"), ViewCommand::TogglePlayPause);
        assert_eq!(
            command("play 42"),
            ViewCommand::Play {
                track_id: TrackId::from(42)
            }
        );
        assert_eq!(command("  NEXT "), ViewCommand::Next);
        assert_eq!(command("ff"), ViewCommand::SeekBy { delta: 5.0 });
        assert_eq!(command("rw"), ViewCommand::SeekBy { delta: -5.0 });
    }

    #[test]
    fn seek_accepts_minutes() {
        assert_eq!(command("seek 1:15"), ViewCommand::Seek { position: 75.0 });
        assert_eq!(command("seek 12.5"), ViewCommand::Seek { position: 12.5 });
        assert!(parse_line("seek 1:75").is_err());
        assert!(parse_line("seek -3").is_err());
        assert!(matches!(
            parse_line("seek"),
            Err(AppError::MissingArgument { command: "seek", .. })
        ));
    }

    #[test]
    fn volume_is_bounded() {
        assert_eq!(command("vol 35"), ViewCommand::SetVolume { level: 35 });
        assert!(matches!(
            parse_line("vol 101"),
            Err(AppError::InvalidArgument { argument: "volume", .. })
        ));
    }

    #[test]
    fn playlist_commands() {
        assert_eq!(
            command("new Road trip | songs for the car"),
            ViewCommand::CreatePlaylist {
                name: "Road trip".into(),
                description: "songs for the car".into(),
            }
        );
        assert_eq!(
            command("rename 17 Gym"),
            ViewCommand::RenamePlaylist {
                playlist_id: PlaylistId::new("17"),
                name: "Gym".into(),
                description: String::new(),
            }
        );
        assert_eq!(
            command("add 17 song-3"),
            ViewCommand::AddTrack {
                playlist_id: PlaylistId::new("17"),
                track_id: TrackId::from("song-3"),
            }
        );
        assert!(matches!(
            parse_line("add 17"),
            Err(AppError::MissingArgument { argument: "a song id", .. })
        ));
    }

    #[test]
    fn empty_name_reaches_the_session() {
        // Name validation happens in the session, which reports it to the view
        assert_eq!(
            command("new"),
            ViewCommand::CreatePlaylist {
                name: String::new(),
                description: String::new(),
            }
        );
    }

    #[test]
    fn control_words() {
        assert_eq!(parse_line("").unwrap(), Input::Empty);
        assert_eq!(parse_line("help").unwrap(), Input::Help);
        assert_eq!(parse_line("quit").unwrap(), Input::Quit);
        assert!(matches!(
            parse_line("dance"),
            Err(AppError::UnknownCommand(word)) if word == "dance"
        ));
    }
}
