//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for `index-tts-launcher`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "index-tts-launcher",
    version,
    about = "Start and stop the Index-TTS web UI from a small desktop window.",
    long_about = None
)]
pub struct CliArgs {
    /// Index-TTS checkout to launch from.
    ///
    /// Default: `~/index-tts`.
    #[arg(long, value_name = "PATH")]
    pub project_dir: Option<PathBuf>,

    /// Do not open the browser automatically once the service is ready.
    #[arg(long)]
    pub no_browser: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `INDEX_TTS_LAUNCHER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl CliArgs {
    pub fn project_dir(&self) -> PathBuf {
        self.project_dir
            .clone()
            .unwrap_or_else(backend::default_project_dir)
    }
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_home_checkout() {
        let args = CliArgs::try_parse_from(["index-tts-launcher"]).unwrap();
        assert!(args.project_dir().ends_with("index-tts"));
        assert!(!args.no_browser);
        assert!(args.log_level.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let args = CliArgs::try_parse_from([
            "index-tts-launcher",
            "--project-dir",
            "/opt/index-tts",
            "--no-browser",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.project_dir(), PathBuf::from("/opt/index-tts"));
        assert!(args.no_browser);
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
