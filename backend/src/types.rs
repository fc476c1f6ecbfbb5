//! Data types and error definitions for the service supervisor.

use nix::errno::Errno;
use std::path::PathBuf;
use thiserror::Error;

/// Lifecycle of the supervised service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Notifications handed to the UI by [`crate::Supervisor::poll_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// A milestone or readiness message to show to the user.
    Status(String),
    /// The service reported its listening URL.
    Ready { url: String, browser_url: String },
    /// The process group is gone and the handle was released.
    Stopped { unexpected: bool },
}

/// Errors that can occur while launching or stopping the service.
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Project path does not exist: {}", .0.display())]
    PathError(PathBuf),
    #[error("Failed to create output pipe: {0}")]
    PipeError(Errno),
    #[error("Failed to spawn `{program}`: {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to send signal to process group {0}: {1}")]
    SignalError(i32, Errno),
    #[error("Failed to wait for process {0}: {1}")]
    WaitError(i32, std::io::Error),
    #[error("Service is already running")]
    AlreadyRunning,
}
