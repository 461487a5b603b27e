use track_model::UserId;
use track_session::{MarkerState, Presenter, RosterLine};

/// Draws session state changes as terminal output. The map viewport and
/// markers are described in words; an embedding with a real map widget
/// would implement [`Presenter`] against that instead.
#[derive(Default)]
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn roster_changed(&mut self, lines: &[RosterLine]) {
        println!("Roster:");
        for line in lines {
            println!("  {} ({})", line.name, line.email);
            println!("    Last known: {}", line.last_known);
            println!("    Id: {}", line.id);
        }
    }

    fn banner_changed(&mut self, banner: &str) {
        println!("{}", banner);
    }

    fn viewport_changed(&mut self, latitude: f64, longitude: f64, zoom: u8) {
        println!(
            "[map] centered on {:.5}, {:.5} (zoom {})",
            latitude, longitude, zoom
        );
    }

    fn marker_changed(&mut self, id: &UserId, marker: &MarkerState) {
        println!(
            "[map] marker {} at {:.5}, {:.5}: {}",
            id, marker.latitude, marker.longitude, marker.popup
        );
    }

    fn notice(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}
