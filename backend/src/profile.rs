//! Log patterns of the supervised service.
//!
//! A [`ServiceProfile`] tells the scanner which output lines mark a loading
//! milestone and which line carries the listening URL. The default profile
//! matches the Index-TTS web UI.

use regex::Regex;

/// Pattern of the line announcing the listening URL. Group 1 is the URL.
pub const INDEX_TTS_READY_PATTERN: &str = r"Running on local URL:\s+(http://[\d\.:]+)";

const WILDCARD_HOST: &str = "0.0.0.0";
const LOOPBACK_HOST: &str = "127.0.0.1";

/// A literal substring and the status message it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub needle: String,
    pub message: String,
}

/// Ordered milestone lookup. The first entry contained in a line wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MilestoneTable {
    entries: Vec<Milestone>,
}

impl MilestoneTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.entries.push(Milestone {
            needle: needle.into(),
            message: message.into(),
        });
        self
    }

    pub fn lookup(&self, line: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|m| line.contains(&m.needle))
            .map(|m| m.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The five model-loading stages of the Index-TTS web UI.
    pub fn index_tts() -> Self {
        Self::new()
            .with("GPT weights restored", "1/5: GPT model loaded")
            .with("semantic_codec weights restored", "2/5: Semantic codec loaded")
            .with("s2mel weights restored", "3/5: S2Mel model loaded")
            .with("campplus_model weights restored", "4/5: CAM++ model loaded")
            .with("bigvgan weights restored", "5/5: BigVGAN vocoder loaded")
    }
}

/// Everything the output scanner matches against.
#[derive(Debug, Clone)]
pub struct ServiceProfile {
    pub milestones: MilestoneTable,
    pub readiness: Regex,
    pub ready_message: String,
}

impl ServiceProfile {
    pub fn new(
        milestones: MilestoneTable,
        readiness_pattern: &str,
        ready_message: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            milestones,
            readiness: Regex::new(readiness_pattern)?,
            ready_message: ready_message.into(),
        })
    }

    /// Extract the URL from a readiness line, if this is one.
    pub fn ready_url<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.readiness
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

impl Default for ServiceProfile {
    fn default() -> Self {
        Self {
            milestones: MilestoneTable::index_tts(),
            readiness: Regex::new(INDEX_TTS_READY_PATTERN).expect("readiness pattern is valid"),
            ready_message: "Service started successfully!".to_string(),
        }
    }
}

/// Rewrite a wildcard bind address into one a browser can navigate to.
pub fn browser_url(url: &str) -> String {
    url.replace(WILDCARD_HOST, LOOPBACK_HOST)
}
