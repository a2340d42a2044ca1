/// Core traits for VibeWave
use crate::types::{Track, TrackId};
use crate::view::Notification;

/// Synchronous track lookup
///
/// Implemented by the song catalog once it has been fetched. The playback
/// controller and the view layer only ever see this trait, so tests can
/// substitute a plain `Vec<Track>`.
pub trait TrackResolver {
    /// Look up a track by canonical id
    fn resolve(&self, id: &TrackId) -> Option<Track>;

    /// All track ids in catalog order
    fn track_ids(&self) -> Vec<TrackId>;

    /// Resolve a sequence of ids, skipping the ones the catalog does not know
    fn resolve_all(&self, ids: &[TrackId]) -> Vec<Track> {
        ids.iter().filter_map(|id| self.resolve(id)).collect()
    }
}

impl TrackResolver for Vec<Track> {
    fn resolve(&self, id: &TrackId) -> Option<Track> {
        self.iter().find(|track| &track.id == id).cloned()
    }

    fn track_ids(&self) -> Vec<TrackId> {
        self.iter().map(|track| track.id.clone()).collect()
    }
}

impl TrackResolver for [Track] {
    fn resolve(&self, id: &TrackId) -> Option<Track> {
        self.iter().find(|track| &track.id == id).cloned()
    }

    fn track_ids(&self) -> Vec<TrackId> {
        self.iter().map(|track| track.id.clone()).collect()
    }
}

/// Rendering surface
///
/// The view receives notifications and turns them into whatever the
/// front end shows. It never calls back into the session directly; user
/// intents come back as [`crate::view::ViewCommand`] values.
pub trait View {
    /// Render a notification
    fn notify(&mut self, notification: &Notification);
}

impl<V: View + ?Sized> View for Box<V> {
    fn notify(&mut self, notification: &Notification) {
        (**self).notify(notification);
    }
}

/// Collects notifications in memory. Useful for tests and for
/// front ends that batch renders.
impl View for Vec<Notification> {
    fn notify(&mut self, notification: &Notification) {
        self.push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_all_skips_unknown_ids() {
        let catalog = vec![Track::new(1, "A", "X"), Track::new(2, "B", "Y")];
        let ids = vec![TrackId::from(2), TrackId::from(9), TrackId::from(1)];
        let titles: Vec<String> = catalog
            .resolve_all(&ids)
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
    }
}
