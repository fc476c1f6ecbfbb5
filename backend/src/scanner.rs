//! Line scanning of the service's combined output.

use crate::profile::ServiceProfile;
use std::io::BufRead;
use tracing::{debug, warn};

/// What a single output line told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Milestone(String),
    Ready(String),
}

/// Read `reader` line by line until end-of-stream, reporting milestones and
/// the first readiness line through `emit`.
///
/// Bytes are decoded lossily so a stray non-UTF-8 byte in the service log
/// does not end the scan. A read error is treated like end-of-stream.
pub fn scan_output<R, F>(mut reader: R, profile: &ServiceProfile, mut emit: F)
where
    R: BufRead,
    F: FnMut(ScanEvent),
{
    let mut buf = Vec::new();
    let mut url_seen = false;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "reading service output failed; treating as end of stream");
                break;
            }
        }

        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.trim();
        debug!(target: "service", "{}", line);

        if let Some(message) = profile.milestones.lookup(line) {
            emit(ScanEvent::Milestone(message.to_string()));
        }

        if !url_seen {
            if let Some(url) = profile.ready_url(line) {
                url_seen = true;
                emit(ScanEvent::Ready(url.to_string()));
            }
        }
    }
}
