use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Append-only diagnostic log the dashboard tails. Inactive unless the
/// monitor runs with the verbosity flag, and never fatal: a failed
/// append is warned about and dropped.
#[derive(Debug, Clone)]
pub struct DebugSink {
    path: PathBuf,
    enabled: bool,
}

impl DebugSink {
    pub fn new(path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            path: path.into(),
            enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn append(&self, message: &str) {
        if !self.enabled || message.is_empty() {
            return;
        }
        if let Err(err) = self.try_append(message) {
            warn!(path = %self.path.display(), %err, "debug log append failed");
        }
    }

    fn try_append(&self, message: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{} {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        )
    }
}
