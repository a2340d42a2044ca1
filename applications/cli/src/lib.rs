//! VibeWave terminal player
//!
//! Wires the song catalog, the playlist store and the playback controller
//! into a [`Session`] and drives it from a line-oriented shell.

#![forbid(unsafe_code)]

pub mod config;
pub mod device;
pub mod error;
pub mod parse;
pub mod session;
pub mod terminal;

pub use config::AppConfig;
pub use device::OutputDevice;
pub use error::{AppError, Result};
pub use parse::{parse_line, Input};
pub use session::{Session, SessionOptions};
pub use terminal::TerminalView;
