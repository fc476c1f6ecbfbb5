//! Process group termination.

use crate::types::SupervisorError;
use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tracing::debug;

/// Whether the SIGTERM actually reached the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The group had already vanished.
    AlreadyGone,
}

/// Send SIGTERM to every process in the group led by `pgid`.
pub fn terminate_group(pgid: i32) -> Result<Delivery, SupervisorError> {
    classify(pgid, killpg(Pid::from_raw(pgid), Signal::SIGTERM))
}

/// "No such process" means the group is already gone, which is what we wanted.
fn classify(pgid: i32, result: nix::Result<()>) -> Result<Delivery, SupervisorError> {
    match result {
        Ok(()) => Ok(Delivery::Delivered),
        Err(Errno::ESRCH) => {
            debug!(pgid, "process group already gone");
            Ok(Delivery::AlreadyGone)
        }
        Err(e) => Err(SupervisorError::SignalError(pgid, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_such_process_counts_as_success() {
        assert_eq!(classify(42, Err(Errno::ESRCH)).unwrap(), Delivery::AlreadyGone);
    }

    #[test]
    fn delivered_signal_is_reported() {
        assert_eq!(classify(42, Ok(())).unwrap(), Delivery::Delivered);
    }

    #[test]
    fn permission_denied_is_surfaced() {
        match classify(42, Err(Errno::EPERM)) {
            Err(SupervisorError::SignalError(42, Errno::EPERM)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
