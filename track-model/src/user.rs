use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use track_error::TrackError;

use crate::location::{coords_label, LocationRecord, NO_LOCATION_LABEL};

/// Opaque registry key for a user. Generated once at registration,
/// immutable afterwards.
#[derive(
    Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Copy, Debug, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh id. UUID v4 carries 122 bits of randomness,
    /// collisions within a session are negligible.
    pub fn generate() -> Self {
        UserId(Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(UserId).map_err(|_| TrackError::Parse)
    }
}

/// Authoritative profile record. Visualization handles are never stored
/// here, only in the marker projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Absent until the first position sample arrives for this user.
    pub location: Option<LocationRecord>,
}

impl UserProfile {
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: UserId::generate(),
            name,
            email,
            location: None,
        }
    }

    /// Roster label for the last known location: resolved address if any,
    /// else raw coordinates, else "No location". The "Locating..."
    /// placeholder does not count as resolved.
    pub fn last_known_label(&self) -> String {
        match &self.location {
            Some(loc) if loc.is_resolved() => loc.address.clone(),
            Some(loc) => coords_label(loc.latitude, loc.longitude),
            None => NO_LOCATION_LABEL.to_string(),
        }
    }
}
