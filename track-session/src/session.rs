use std::path::Path;

use fs_roster::RosterStore;
use geo_client::{GeocodeClient, ReverseGeocodeResponse};
use track_error::{Result, TrackError};
use track_model::{
    coords_label, LocationRecord, PositionSample, UserId, UserProfile,
    LOCATING_PLACEHOLDER,
};

use crate::presenter::{
    MarkerBoard, Presenter, RosterLine, SELECT_ZOOM, TRACK_ZOOM, WORLD_ZOOM,
};
use crate::registry::Registry;

/// Prompt shown when a position sample arrives with no active user.
pub const NO_ACTIVE_PROMPT: &str =
    "Please register or select an active user to track.";

const ERROR_POPUP_TEXT: &str = "Error getting address";

/// Seam between the pipeline and the reverse-geocoding service.
#[allow(async_fn_in_trait)]
pub trait Geocoder {
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ReverseGeocodeResponse>;
}

impl Geocoder for GeocodeClient {
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ReverseGeocodeResponse> {
        GeocodeClient::reverse(self, latitude, longitude).await
    }
}

/// What happened to one position sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Captured, persisted and resolved (possibly to a degraded address).
    Tracked,
    /// Discarded; nothing was mutated.
    NoActiveUser,
}

/// A captured coordinate waiting for its address. Produced by
/// [`TrackerSession::apply_sample`]; the coordinates are already durable
/// by the time one of these exists.
#[derive(Debug, Clone, Copy)]
pub struct PendingResolve {
    pub user: UserId,
    pub latitude: f64,
    pub longitude: f64,
}

/// Owns all session state: the registry, the active selection, the roster
/// store and the marker projection. All mutation goes through the methods
/// here; handlers are expected to run one at a time.
pub struct TrackerSession<G> {
    registry: Registry,
    active: Option<UserId>,
    store: RosterStore,
    geocoder: G,
    markers: MarkerBoard,
}

impl<G: Geocoder> TrackerSession<G> {
    /// Load persisted state from `root` and rebuild the marker projection
    /// for every user that already has a location. A persisted active id
    /// that no longer matches a profile is dropped.
    pub fn load(
        root: &Path,
        geocoder: G,
        presenter: &mut dyn Presenter,
    ) -> Result<Self> {
        let store = RosterStore::new("roster".to_string(), root);
        let registry = Registry::from_users(store.read_users()?);

        let mut active = store.read_active()?;
        if let Some(id) = &active {
            if !registry.contains(id) {
                log::warn!("persisted active user {} is unknown, clearing", id);
                active = None;
            }
        }

        let mut markers = MarkerBoard::default();
        for profile in registry.all() {
            if let Some(location) = &profile.location {
                let marker = markers.upsert(
                    profile.id,
                    location.latitude,
                    location.longitude,
                );
                let text = if location.is_resolved() {
                    location.address.as_str()
                } else {
                    LOCATING_PLACEHOLDER
                };
                marker.popup = popup_text(&profile.name, text);
            }
        }

        let session = Self {
            registry,
            active,
            store,
            geocoder,
            markers,
        };
        session.refresh_roster(presenter);
        session.refresh_banner(presenter);
        Ok(session)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn markers(&self) -> &MarkerBoard {
        &self.markers
    }

    pub fn active_id(&self) -> Option<UserId> {
        self.active
    }

    pub fn active_profile(&self) -> Option<&UserProfile> {
        self.active
            .as_ref()
            .and_then(|id| self.registry.get(id))
    }

    /// Register a new user and make them active. Name and email must be
    /// non-empty after trimming.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        presenter: &mut dyn Presenter,
    ) -> Result<UserId> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(TrackError::InvalidInput(
                "Please enter both name and email.".to_string(),
            ));
        }

        let profile = UserProfile::new(name.to_string(), email.to_string());
        let id = profile.id;
        self.registry.insert(profile);
        self.store.write_users(&self.registry.snapshot())?;
        self.refresh_roster(presenter);
        self.select(&id, presenter)?;

        log::info!("registered user {} ({})", name, id);
        Ok(id)
    }

    /// Make `id` the active user. Selecting an unknown id is a no-op that
    /// returns `false` and leaves the previous selection in place.
    pub fn select(
        &mut self,
        id: &UserId,
        presenter: &mut dyn Presenter,
    ) -> Result<bool> {
        let Some(profile) = self.registry.get(id) else {
            log::debug!("select ignored, unknown user {}", id);
            return Ok(false);
        };
        let last_location = profile
            .location
            .as_ref()
            .map(|loc| (loc.latitude, loc.longitude));

        self.active = Some(*id);
        self.store.write_active(Some(id))?;
        self.refresh_banner(presenter);
        match last_location {
            Some((latitude, longitude)) => {
                presenter.viewport_changed(latitude, longitude, SELECT_ZOOM)
            }
            None => presenter.viewport_changed(0.0, 0.0, WORLD_ZOOM),
        }
        Ok(true)
    }

    /// Guard and capture phases for one sample: with no active user the
    /// sample is discarded; otherwise the coordinate is recorded, persisted
    /// and projected before any geocoding happens. Returns the pending
    /// resolution, which the caller feeds to [`Self::resolve_address`].
    pub fn apply_sample(
        &mut self,
        sample: PositionSample,
        presenter: &mut dyn Presenter,
    ) -> Result<Option<PendingResolve>> {
        let Some(active_id) = self.active else {
            presenter.notice(NO_ACTIVE_PROMPT);
            return Ok(None);
        };
        let Some(profile) = self.registry.get_mut(&active_id) else {
            log::warn!("active user {} vanished from registry", active_id);
            self.active = None;
            presenter.notice(NO_ACTIVE_PROMPT);
            return Ok(None);
        };

        profile.location = Some(LocationRecord::captured(
            sample.latitude,
            sample.longitude,
            sample.timestamp,
        ));
        let name = profile.name.clone();

        // Coordinates must survive a reload even if geocoding never runs.
        self.store.write_users(&self.registry.snapshot())?;

        let marker =
            self.markers
                .upsert(active_id, sample.latitude, sample.longitude);
        marker.popup = popup_text(&name, LOCATING_PLACEHOLDER);
        marker.open = true;
        presenter.marker_changed(&active_id, &*marker);
        presenter.viewport_changed(
            sample.latitude,
            sample.longitude,
            TRACK_ZOOM,
        );
        self.refresh_roster(presenter);

        Ok(Some(PendingResolve {
            user: active_id,
            latitude: sample.latitude,
            longitude: sample.longitude,
        }))
    }

    /// Resolve phase: reverse-geocode a captured coordinate and backfill
    /// the address. Failures degrade the address field only; the stored
    /// coordinates are untouched and there is no retry.
    ///
    /// Address results apply in completion order. When samples arrive
    /// faster than the service answers, a late response can put a stale
    /// address on screen; the original behaves the same way and the
    /// coordinate precision requirements tolerate it.
    pub async fn resolve_address(
        &mut self,
        pending: PendingResolve,
        presenter: &mut dyn Presenter,
    ) -> Result<()> {
        match self
            .geocoder
            .reverse(pending.latitude, pending.longitude)
            .await
        {
            Ok(response) => {
                let display = response.display_address();
                self.backfill_address(&pending.user, &display, presenter)?;
            }
            Err(err) => {
                log::warn!("Error fetching location details: {}", err);
                let label = format!(
                    "Error getting details ({})",
                    coords_label(pending.latitude, pending.longitude)
                );
                self.backfill_address(&pending.user, &label, presenter)?;
                let name = self
                    .registry
                    .get(&pending.user)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                if let Some(marker) = self.markers.get_mut(&pending.user) {
                    marker.popup = popup_text(&name, ERROR_POPUP_TEXT);
                    presenter.marker_changed(&pending.user, &*marker);
                }
            }
        }
        Ok(())
    }

    /// Full pipeline for one sample: guard, capture, visualize, resolve.
    pub async fn handle_sample(
        &mut self,
        sample: PositionSample,
        presenter: &mut dyn Presenter,
    ) -> Result<SampleOutcome> {
        match self.apply_sample(sample, presenter)? {
            Some(pending) => {
                self.resolve_address(pending, presenter).await?;
                Ok(SampleOutcome::Tracked)
            }
            None => Ok(SampleOutcome::NoActiveUser),
        }
    }

    /// Surface a position-stream error. The stream itself decides whether
    /// it keeps delivering; nothing is retried here.
    pub fn handle_stream_error(
        &mut self,
        message: &str,
        presenter: &mut dyn Presenter,
    ) {
        log::error!("position stream error: {}", message);
        presenter.notice(&format!("Error getting location: {}", message));
    }

    fn backfill_address(
        &mut self,
        id: &UserId,
        address: &str,
        presenter: &mut dyn Presenter,
    ) -> Result<()> {
        let Some(profile) = self.registry.get_mut(id) else {
            return Ok(());
        };
        let Some(location) = profile.location.as_mut() else {
            return Ok(());
        };
        location.address = address.to_string();
        let name = profile.name.clone();
        self.store.write_users(&self.registry.snapshot())?;

        if let Some(marker) = self.markers.get_mut(id) {
            marker.popup = popup_text(&name, address);
            presenter.marker_changed(id, &*marker);
        }
        self.refresh_roster(presenter);
        Ok(())
    }

    fn refresh_roster(&self, presenter: &mut dyn Presenter) {
        let lines: Vec<RosterLine> = self
            .registry
            .all()
            .map(|profile| RosterLine {
                id: profile.id,
                name: profile.name.clone(),
                email: profile.email.clone(),
                last_known: profile.last_known_label(),
            })
            .collect();
        presenter.roster_changed(&lines);
    }

    fn refresh_banner(&self, presenter: &mut dyn Presenter) {
        let banner = match self.active_profile() {
            Some(profile) => format!(
                "Current active user: {} ({})",
                profile.name, profile.email
            ),
            None => "Current active user: None".to_string(),
        };
        presenter.banner_changed(&banner);
    }
}

fn popup_text(name: &str, text: &str) -> String {
    format!("{}: {}", name, text)
}
