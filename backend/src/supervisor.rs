//! The service supervisor.
//!
//! A [`Supervisor`] owns at most one running service process. All of its
//! state lives on the thread that owns it (the UI thread); the background
//! reader only posts [`WorkerMessage`]s into a channel that the owner drains
//! with [`Supervisor::poll_events`].

use crate::launch::{spawn_service, LaunchSpec, SpawnedService};
use crate::process_kill::{terminate_group, Delivery};
use crate::profile::{browser_url, ServiceProfile};
use crate::scanner::{scan_output, ScanEvent};
use crate::types::{RunState, SupervisorError, SupervisorEvent};
use std::io::BufReader;
use std::process::Child;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

/// Called by the reader thread after posting a message, e.g. to request a
/// repaint of the UI that will drain it.
pub type Waker = Arc<dyn Fn() + Send + Sync>;

struct ProcessHandle {
    child: Child,
    pgid: i32,
}

enum WorkerEvent {
    Scan(ScanEvent),
    OutputClosed,
}

struct WorkerMessage {
    run_id: u64,
    event: WorkerEvent,
}

pub struct Supervisor {
    launch: LaunchSpec,
    profile: Arc<ServiceProfile>,
    state: RunState,
    handle: Option<ProcessHandle>,
    url: Option<String>,
    run_id: u64,
    pending: Vec<SupervisorEvent>,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
    waker: Option<Waker>,
}

impl Supervisor {
    pub fn new(launch: LaunchSpec, profile: ServiceProfile) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            launch,
            profile: Arc::new(profile),
            state: RunState::Stopped,
            handle: None,
            url: None,
            run_id: 0,
            pending: Vec::new(),
            tx,
            rx,
            waker: None,
        }
    }

    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// URL reported by the current run, as printed by the service.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn pid(&self) -> Option<i32> {
        self.handle.as_ref().map(|h| h.pgid)
    }

    /// Spawn the service and start scanning its output in the background.
    ///
    /// Path and spawn failures are returned before any thread is started and
    /// leave the supervisor stopped.
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        if self.handle.is_some() {
            return Err(SupervisorError::AlreadyRunning);
        }

        let SpawnedService {
            child,
            pgid,
            output,
        } = spawn_service(&self.launch)?;

        self.run_id += 1;
        let run_id = self.run_id;
        let tx = self.tx.clone();
        let profile = Arc::clone(&self.profile);
        let waker = self.waker.clone();

        let spawned = thread::Builder::new()
            .name("service-output".to_string())
            .spawn(move || {
                let post = |event: WorkerEvent| {
                    if tx.send(WorkerMessage { run_id, event }).is_ok() {
                        if let Some(wake) = &waker {
                            wake();
                        }
                    }
                };
                scan_output(BufReader::new(output), &profile, |e| post(WorkerEvent::Scan(e)));
                post(WorkerEvent::OutputClosed);
            });

        let mut handle = ProcessHandle { child, pgid };
        if let Err(source) = spawned {
            warn!(pgid, error = %source, "could not start output reader; stopping service");
            if let Err(e) = shutdown(&mut handle) {
                warn!(pgid, error = %e, "cleanup after failed start did not complete");
            }
            return Err(SupervisorError::SpawnError {
                program: "service-output reader thread".to_string(),
                source,
            });
        }

        self.handle = Some(handle);
        self.url = None;
        self.state = RunState::Starting;
        info!(pgid, run_id, "service starting");
        Ok(())
    }

    /// Terminate the whole process group and wait for the leader to exit.
    ///
    /// The supervisor always ends up stopped; a signalling failure other
    /// than "no such process" is returned afterwards as a warning.
    pub fn stop(&mut self) -> Result<(), SupervisorError> {
        let Some(mut handle) = self.handle.take() else {
            self.state = RunState::Stopped;
            return Ok(());
        };

        self.state = RunState::Stopping;
        info!(pgid = handle.pgid, "stopping service");
        let result = shutdown(&mut handle);
        self.finish(false);
        result
    }

    /// Drain messages from the reader thread and apply them.
    pub fn poll_events(&mut self) -> Vec<SupervisorEvent> {
        let mut events = std::mem::take(&mut self.pending);

        while let Ok(msg) = self.rx.try_recv() {
            // Leftovers from a run that has already been stopped.
            if msg.run_id != self.run_id || self.handle.is_none() {
                continue;
            }

            match msg.event {
                WorkerEvent::Scan(ScanEvent::Milestone(message)) => {
                    info!(milestone = %message, "service milestone");
                    events.push(SupervisorEvent::Status(message));
                }
                WorkerEvent::Scan(ScanEvent::Ready(url)) => {
                    if self.url.is_some() {
                        continue;
                    }
                    let browser_url = browser_url(&url);
                    info!(url = %url, "service ready");
                    self.state = RunState::Running;
                    self.url = Some(url.clone());
                    events.push(SupervisorEvent::Status(self.profile.ready_message.clone()));
                    events.push(SupervisorEvent::Ready { url, browser_url });
                }
                WorkerEvent::OutputClosed => {
                    if let Some(mut handle) = self.handle.take() {
                        warn!(pgid = handle.pgid, "service exited on its own");
                        if let Err(e) = shutdown(&mut handle) {
                            warn!(pgid = handle.pgid, error = %e, "cleanup after exit failed");
                        }
                    }
                    self.finish(true);
                    events.append(&mut self.pending);
                }
            }
        }

        events
    }

    fn finish(&mut self, unexpected: bool) {
        self.url = None;
        self.state = RunState::Stopped;
        self.pending.push(SupervisorEvent::Stopped { unexpected });
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.stop() {
                warn!(error = %e, "stopping service on drop failed");
            }
        }
    }
}

/// SIGTERM the group, then reap the leader if the signal went out or the
/// group was already gone. Without a delivered signal the child is only
/// reaped when it has already exited.
fn shutdown(handle: &mut ProcessHandle) -> Result<(), SupervisorError> {
    let pgid = handle.pgid;
    match terminate_group(pgid) {
        Ok(delivery) => {
            let status = handle
                .child
                .wait()
                .map_err(|e| SupervisorError::WaitError(pgid, e))?;
            info!(
                pgid,
                already_gone = delivery == Delivery::AlreadyGone,
                status = %status,
                "service process reaped"
            );
            Ok(())
        }
        Err(e) => {
            warn!(pgid, error = %e, "could not signal service process group");
            if let Err(wait_err) = handle.child.try_wait() {
                warn!(pgid, error = %wait_err, "could not check service process status");
            }
            Err(e)
        }
    }
}
