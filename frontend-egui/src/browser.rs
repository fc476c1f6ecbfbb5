//! Opening the service in the default browser.

use tracing::{info, warn};

/// Open `url` without blocking the UI thread.
pub fn open_in_browser(url: String) {
    tokio::task::spawn_blocking(move || {
        info!(url = %url, "opening browser");
        if let Err(e) = open::that(&url) {
            warn!(url = %url, error = %e, "could not open browser");
        }
    });
}
