mod atomic;
pub mod roster_store;

pub use roster_store::RosterStore;

/// Default folder under the user's home directory.
pub const TRACK_FOLDER: &str = ".waytrack";

/// Serialized registry, profiles only, in insertion order.
pub const USERS_FILE: &str = "users";

/// Id of the currently active user, if any.
pub const ACTIVE_USER_FILE: &str = "active_user";
