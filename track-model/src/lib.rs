pub mod location;
pub mod user;

pub use location::{
    coords_label, LocationRecord, PositionSample, StreamOptions,
    LOCATING_PLACEHOLDER, NO_LOCATION_LABEL,
};
pub use user::{UserId, UserProfile};
