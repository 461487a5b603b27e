pub mod presenter;
pub mod registry;
pub mod session;

pub use presenter::{
    MarkerBoard, MarkerState, NullPresenter, Presenter, RosterLine,
    SELECT_ZOOM, TRACK_ZOOM, WORLD_ZOOM,
};
pub use registry::Registry;
pub use session::{
    Geocoder, PendingResolve, SampleOutcome, TrackerSession, NO_ACTIVE_PROMPT,
};
