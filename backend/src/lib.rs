//! UI-agnostic supervisor for the Index-TTS web UI.
//!
//! Spawns the service in its own process group, scans its combined output for
//! loading milestones and the listening URL, and terminates the whole group on
//! stop. Uses `nix` for signalling and `regex` for the readiness line.

mod launch;
mod process_kill;
mod profile;
mod scanner;
mod supervisor;
mod types;

pub use launch::{default_project_dir, LaunchSpec};
pub use process_kill::{terminate_group, Delivery};
pub use profile::{browser_url, Milestone, MilestoneTable, ServiceProfile, INDEX_TTS_READY_PATTERN};
pub use scanner::{scan_output, ScanEvent};
pub use supervisor::{Supervisor, Waker};
pub use types::{RunState, SupervisorError, SupervisorEvent};
