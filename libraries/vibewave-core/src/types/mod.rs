mod ids;
mod playlist;
mod track;

pub use ids::{PlaylistId, TrackId};
pub use playlist::{Playlist, PlaylistSummary};
pub use track::Track;
