//! Building and spawning the service command.

use crate::types::SupervisorError;
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use std::ffi::OsString;
use std::fs::File;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::info;

const DEFAULT_PROJECT_DIR: &str = "index-tts";
const VENV_DIR: &str = "venv_uv";

/// How to launch the service: an argument vector plus its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub project_dir: PathBuf,
    /// Virtual environment activated for the child, if any.
    pub venv_dir: Option<PathBuf>,
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchSpec {
    /// `uv run python webui.py` inside `<project_dir>` with `venv_uv` active.
    pub fn index_tts(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        Self {
            venv_dir: Some(project_dir.join(VENV_DIR)),
            project_dir,
            program: "uv".to_string(),
            args: vec!["run".into(), "python".into(), "webui.py".into()],
        }
    }

    pub fn new<I, S>(project_dir: impl Into<PathBuf>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            project_dir: project_dir.into(),
            venv_dir: None,
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the command with the working directory set and the virtual
    /// environment activated the way `source <venv>/bin/activate` would.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.project_dir);

        if let Some(venv) = &self.venv_dir {
            cmd.env("VIRTUAL_ENV", venv)
                .env("PATH", prepend_path(&venv.join("bin")))
                .env_remove("PYTHONHOME");
        }
        cmd
    }
}

/// `~/index-tts`, or a relative `index-tts` when the home directory is unknown.
pub fn default_project_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_PROJECT_DIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROJECT_DIR))
}

fn prepend_path(dir: &Path) -> OsString {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(paths).unwrap_or_else(|_| dir.as_os_str().to_owned())
}

/// A freshly spawned process group leader and the read end of its output.
pub(crate) struct SpawnedService {
    pub child: Child,
    pub pgid: i32,
    pub output: File,
}

/// Spawn `spec` as the leader of a new process group with stdout and stderr
/// sharing one pipe.
pub(crate) fn spawn_service(spec: &LaunchSpec) -> Result<SpawnedService, SupervisorError> {
    if !spec.project_dir.is_dir() {
        return Err(SupervisorError::PathError(spec.project_dir.clone()));
    }

    // Close-on-exec from creation, so a fork on another thread (browser
    // opening) cannot inherit the write end and hold the stream open.
    let (read_end, write_end) = pipe2(OFlag::O_CLOEXEC).map_err(SupervisorError::PipeError)?;
    let write_end_err = write_end.try_clone().map_err(|source| SupervisorError::SpawnError {
        program: spec.program.clone(),
        source,
    })?;

    // The command owns the parent's copies of the write end and drops them
    // when this function returns, so the reader sees EOF once the group exits.
    let mut cmd = spec.command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::from(write_end))
        .stderr(Stdio::from(write_end_err))
        .process_group(0);

    let child = cmd.spawn().map_err(|source| SupervisorError::SpawnError {
        program: spec.program.clone(),
        source,
    })?;
    let pgid = child.id() as i32;

    info!(
        pid = pgid,
        program = %spec.program,
        cwd = %spec.project_dir.display(),
        "service process spawned"
    );

    Ok(SpawnedService {
        child,
        pgid,
        output: File::from(read_end),
    })
}
