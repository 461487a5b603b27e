use std::collections::BTreeMap;

use track_model::UserId;

/// Default world view when no location is known.
pub const WORLD_ZOOM: u8 = 2;

/// Zoom used when recentering on a selected user's last known location.
pub const SELECT_ZOOM: u8 = 13;

/// Zoom used when following a live position update.
pub const TRACK_ZOOM: u8 = 16;

/// One row of the visible roster.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterLine {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub last_known: String,
}

/// Visualization handle for one user. Derived state only; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerState {
    pub latitude: f64,
    pub longitude: f64,
    pub popup: String,
    pub open: bool,
}

/// The marker projection: one handle per user that has ever had a
/// location. Markers are created lazily on the first coordinate, updated
/// in place afterwards, and never removed.
#[derive(Debug, Default)]
pub struct MarkerBoard {
    markers: BTreeMap<UserId, MarkerState>,
}

impl MarkerBoard {
    pub fn get(&self, id: &UserId) -> Option<&MarkerState> {
        self.markers.get(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Move the marker for `id` to the given coordinates, creating it if
    /// this is the user's first location.
    pub(crate) fn upsert(
        &mut self,
        id: UserId,
        latitude: f64,
        longitude: f64,
    ) -> &mut MarkerState {
        let marker = self.markers.entry(id).or_insert(MarkerState {
            latitude,
            longitude,
            popup: String::new(),
            open: false,
        });
        marker.latitude = latitude;
        marker.longitude = longitude;
        marker
    }

    pub(crate) fn get_mut(&mut self, id: &UserId) -> Option<&mut MarkerState> {
        self.markers.get_mut(id)
    }
}

/// Sink for display-state changes. The session pushes every mutation of
/// derived state through this seam; implementations draw it however they
/// like (terminal, map widget, test recorder).
pub trait Presenter {
    fn roster_changed(&mut self, _lines: &[RosterLine]) {}
    fn banner_changed(&mut self, _banner: &str) {}
    fn viewport_changed(&mut self, _latitude: f64, _longitude: f64, _zoom: u8) {}
    fn marker_changed(&mut self, _id: &UserId, _marker: &MarkerState) {}
    fn notice(&mut self, _message: &str) {}
}

/// Presenter that ignores everything.
pub struct NullPresenter;

impl Presenter for NullPresenter {}
