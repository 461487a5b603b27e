use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Address text shown between capture and the geocoding response.
pub const LOCATING_PLACEHOLDER: &str = "Locating...";

/// Roster text for users that never produced a position sample.
pub const NO_LOCATION_LABEL: &str = "No location";

/// Coordinates formatted the way the roster and error labels show them.
pub fn coords_label(latitude: f64, longitude: f64) -> String {
    format!("{:.5}, {:.5}", latitude, longitude)
}

/// Last known location of a user. The coordinates are authoritative as soon
/// as the record is captured; `address` is backfilled asynchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    pub address: String,
}

impl LocationRecord {
    /// A freshly captured record, address still pending.
    pub fn captured(
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
            address: LOCATING_PLACEHOLDER.to_string(),
        }
    }

    /// Whether geocoding has replaced the placeholder.
    pub fn is_resolved(&self) -> bool {
        !self.address.is_empty() && self.address != LOCATING_PLACEHOLDER
    }
}

/// One reading from the position stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp: Utc::now(),
        }
    }
}

/// Contract requested from a position stream: high accuracy, no cached
/// samples, and a per-request timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    pub high_accuracy: bool,
    pub maximum_age: Duration,
    pub timeout: Duration,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age: Duration::ZERO,
            timeout: Duration::from_secs(10),
        }
    }
}
