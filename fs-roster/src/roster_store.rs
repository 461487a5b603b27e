use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use track_error::{Result, TrackError};
use track_model::{UserId, UserProfile};

use crate::atomic::write_atomic;
use crate::{ACTIVE_USER_FILE, USERS_FILE};

/// Format version of the users file. Bump on incompatible changes and
/// keep a migration path for the old format.
const STORAGE_VERSION: i32 = 1;

/// Durable persistence for the roster: one versioned JSON file with the
/// profiles in insertion order, one plain file with the active user id.
/// Marker handles are never written here.
pub struct RosterStore {
    label: String,
    root: PathBuf,
}

/// On-disk shape of the users file.
#[derive(Serialize, Deserialize)]
struct UsersFileData {
    version: i32,
    users: Vec<UserProfile>,
}

impl RosterStore {
    pub fn new(label: String, root: &Path) -> Self {
        Self {
            label,
            root: PathBuf::from(root),
        }
    }

    pub fn users_path(&self) -> PathBuf {
        self.root.join(USERS_FILE)
    }

    pub fn active_path(&self) -> PathBuf {
        self.root.join(ACTIVE_USER_FILE)
    }

    /// Load the persisted profiles, in the order they were registered.
    /// A missing file is an empty roster, not an error.
    pub fn read_users(&self) -> Result<Vec<UserProfile>> {
        let path = self.users_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&path)?;
        let data: UsersFileData =
            serde_json::from_reader(file).map_err(|err| {
                TrackError::Storage(self.label.clone(), err.to_string())
            })?;
        if data.version != STORAGE_VERSION {
            return Err(TrackError::Storage(
                self.label.clone(),
                format!(
                    "Storage version mismatch: expected {}, got {}",
                    STORAGE_VERSION, data.version
                ),
            ));
        }
        Ok(data.users)
    }

    /// Persist the full roster. Called after every registry mutation.
    pub fn write_users(&self, users: &[UserProfile]) -> Result<()> {
        let data = UsersFileData {
            version: STORAGE_VERSION,
            users: users.to_vec(),
        };
        let payload = serde_json::to_vec(&data)?;
        write_atomic(&self.users_path(), &payload)?;
        log::info!(
            "{}: {} profiles have been written",
            self.label,
            users.len()
        );
        Ok(())
    }

    /// Load the persisted active selection, if any.
    pub fn read_active(&self) -> Result<Option<UserId>> {
        let path = self.active_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let id = UserId::from_str(content.trim()).map_err(|_| {
            TrackError::Storage(
                self.label.clone(),
                format!("Malformed active user id: {}", content.trim()),
            )
        })?;
        Ok(Some(id))
    }

    /// Persist the active selection. `None` removes the file.
    pub fn write_active(&self, active: Option<&UserId>) -> Result<()> {
        match active {
            Some(id) => write_atomic(
                &self.active_path(),
                id.to_string().as_bytes(),
            ),
            None => {
                let path = self.active_path();
                if path.exists() {
                    fs::remove_file(&path).map_err(|err| {
                        TrackError::Storage(
                            self.label.clone(),
                            err.to_string(),
                        )
                    })?;
                }
                Ok(())
            }
        }
    }

    /// Remove all persisted roster data.
    pub fn erase(&self) -> Result<()> {
        for path in [self.users_path(), self.active_path()] {
            if path.exists() {
                fs::remove_file(&path).map_err(|err| {
                    TrackError::Storage(self.label.clone(), err.to_string())
                })?;
            }
        }
        Ok(())
    }
}
