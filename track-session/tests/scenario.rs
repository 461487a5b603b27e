use tempdir::TempDir;

use geo_client::ReverseGeocodeResponse;
use track_model::{PositionSample, UserId};
use track_session::{
    Geocoder, MarkerState, NullPresenter, Presenter, RosterLine,
    TrackerSession,
};

struct StubGeocoder {
    body: &'static str,
}

impl Geocoder for StubGeocoder {
    async fn reverse(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> track_error::Result<ReverseGeocodeResponse> {
        Ok(serde_json::from_str(self.body).expect("test fixture"))
    }
}

#[derive(Default)]
struct RecordingPresenter {
    rosters: Vec<Vec<RosterLine>>,
    banners: Vec<String>,
}

impl Presenter for RecordingPresenter {
    fn roster_changed(&mut self, lines: &[RosterLine]) {
        self.rosters.push(lines.to_vec());
    }

    fn banner_changed(&mut self, banner: &str) {
        self.banners.push(banner.to_string());
    }

    fn marker_changed(&mut self, _id: &UserId, _marker: &MarkerState) {}
}

#[tokio::test]
async fn register_track_and_resolve_ada() {
    let dir = TempDir::new("waytrack_scenario").unwrap();
    let geocoder = StubGeocoder {
        body: r#"{"address": {"road": "Whitehall", "city": "London", "country": "UK"}}"#,
    };
    let mut presenter = RecordingPresenter::default();
    let mut session =
        TrackerSession::load(dir.path(), geocoder, &mut presenter).unwrap();

    let ada = session
        .register("Ada", "ada@example.com", &mut presenter)
        .unwrap();
    assert_eq!(session.active_id(), Some(ada));
    assert_eq!(
        presenter.banners.last().unwrap(),
        "Current active user: Ada (ada@example.com)"
    );

    // Capture first: the roster must show raw coordinates until the
    // address comes back.
    let pending = session
        .apply_sample(PositionSample::new(51.50, -0.12), &mut presenter)
        .unwrap()
        .expect("Ada is active");
    let roster = presenter.rosters.last().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].name, "Ada");
    assert_eq!(roster[0].last_known, "51.50000, -0.12000");

    session
        .resolve_address(pending, &mut presenter)
        .await
        .unwrap();
    let roster = presenter.rosters.last().unwrap();
    assert_eq!(roster[0].last_known, "Whitehall, London, UK");
    assert_eq!(
        session.markers().get(&ada).unwrap().popup,
        "Ada: Whitehall, London, UK"
    );
}

#[tokio::test]
async fn full_state_survives_a_reload() {
    let dir = TempDir::new("waytrack_scenario").unwrap();
    let geocoder = StubGeocoder {
        body: r#"{"address": {"town": "Didcot", "country": "UK"}}"#,
    };

    let (ada, bob, snapshot, active) = {
        let mut session =
            TrackerSession::load(dir.path(), geocoder, &mut NullPresenter)
                .unwrap();
        let ada = session
            .register("Ada", "ada@example.com", &mut NullPresenter)
            .unwrap();
        let bob = session
            .register("Bob", "bob@example.com", &mut NullPresenter)
            .unwrap();

        session
            .handle_sample(PositionSample::new(51.60, -1.24), &mut NullPresenter)
            .await
            .unwrap();
        session.select(&ada, &mut NullPresenter).unwrap();
        session
            .handle_sample(PositionSample::new(51.50, -0.12), &mut NullPresenter)
            .await
            .unwrap();

        (ada, bob, session.registry().snapshot(), session.active_id())
    };

    let reloaded = TrackerSession::load(
        dir.path(),
        StubGeocoder { body: "{}" },
        &mut NullPresenter,
    )
    .unwrap();

    assert_eq!(reloaded.registry().snapshot(), snapshot);
    assert_eq!(reloaded.active_id(), active);
    assert_eq!(reloaded.active_id(), Some(ada));

    // Markers are rebuilt for every user with a location.
    assert_eq!(reloaded.markers().len(), 2);
    assert_eq!(
        reloaded.markers().get(&ada).unwrap().popup,
        "Ada: Didcot, UK"
    );
    assert_eq!(
        reloaded.markers().get(&bob).unwrap().popup,
        "Bob: Didcot, UK"
    );
}
