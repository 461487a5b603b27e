use std::collections::BTreeMap;

use track_model::{UserId, UserProfile};

/// In-memory mapping of user id to profile. The single source of truth for
/// all profiles in a session; insertion order defines display order.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<UserId, UserProfile>,
    order: Vec<UserId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted profiles, keeping their order.
    pub fn from_users(users: Vec<UserProfile>) -> Self {
        let mut registry = Self::new();
        for profile in users {
            registry.insert(profile);
        }
        registry
    }

    /// Insert a profile, or replace the one already stored under its id.
    pub fn insert(&mut self, profile: UserProfile) {
        let id = profile.id;
        if self.entries.insert(id, profile).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: &UserId) -> Option<&UserProfile> {
        self.entries.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &UserId) -> Option<&mut UserProfile> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.entries.contains_key(id)
    }

    /// All profiles in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &UserProfile> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
    }

    /// Owned copy of the profiles in insertion order, for persistence.
    pub fn snapshot(&self) -> Vec<UserProfile> {
        self.all().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
