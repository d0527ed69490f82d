use console::style;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::launch::{LoadEvent, Presenter};
use crate::ui::icons::{GLOBE, HOUSE};

/// Terminal stand-in for the app's two surfaces.
///
/// The native surface is a line of output; the web surface is the system
/// browser when `open_browser` is set, otherwise just the URL.
pub struct ConsolePresenter {
    open_browser: bool,
}

impl ConsolePresenter {
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }
}

impl Presenter for ConsolePresenter {
    fn present_native(&self) {
        println!("{}{}", HOUSE, style("Showing the cellar app").green());
    }

    fn present_web(&self, url: &str, events: mpsc::Sender<LoadEvent>) {
        println!("{}Redirecting to {}", GLOBE, style(url).cyan());
        if !self.open_browser {
            return;
        }

        let _ = events.try_send(LoadEvent::Started);
        let event = match open::that(url) {
            Ok(()) => {
                debug!(url, "Opened browser");
                LoadEvent::Finished
            }
            Err(e) => {
                warn!(error = %e, "Failed to open browser");
                LoadEvent::Failed(e.to_string())
            }
        };
        let _ = events.try_send(event);
    }
}
