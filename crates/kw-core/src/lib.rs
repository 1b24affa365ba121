pub mod feed;
pub mod metrics;
pub mod milestones;
pub mod pulse;
pub mod rings;
pub mod sample;
pub mod summary;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which data set the monitor reads: the live capture summary or the
/// canned sample set used for demos.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Live,
    Sample,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Live
    }
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Live => "live",
            Mode::Sample => "sample",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Live => Mode::Sample,
            Mode::Sample => Mode::Live,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            // Older tooling wrote "real" for live mode.
            "live" | "real" => Ok(Mode::Live),
            "sample" | "demo" => Ok(Mode::Sample),
            other => Err(format!("Unknown mode: {other}")),
        }
    }
}
