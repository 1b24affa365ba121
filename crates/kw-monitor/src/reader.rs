use kw_core::summary::Summary;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const READ_ATTEMPTS: u32 = 3;
const RETRY_PAUSE: Duration = Duration::from_millis(120);

#[derive(Debug, Error)]
pub enum SummaryReadError {
    #[error("summary missing: {path}")]
    Missing { path: PathBuf },
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("summary unparsable after {attempts} attempt(s): {path}: {source}")]
    Parse {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads the summary document, retrying only when the failure looks like
/// a write race with the capture process.
///
/// The capture side persists with tmp-and-rename, but a reader on a
/// different filesystem view can still see a torn document, so a parse
/// failure on non-empty content is retried with a short pause. A missing
/// file, an io failure, or an empty file surfaces immediately.
#[derive(Debug, Clone)]
pub struct SummaryReader {
    attempts: u32,
    pause: Duration,
}

impl Default for SummaryReader {
    fn default() -> Self {
        Self {
            attempts: READ_ATTEMPTS,
            pause: RETRY_PAUSE,
        }
    }
}

impl SummaryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&self, path: &Path) -> Result<Summary, SummaryReadError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let contents = match tokio::fs::read_to_string(path).await {
                Ok(contents) => contents,
                Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                    return Err(SummaryReadError::Missing {
                        path: path.to_path_buf(),
                    });
                }
                Err(source) => {
                    return Err(SummaryReadError::Io {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            };

            match serde_json::from_str::<Summary>(&contents) {
                Ok(summary) => return Ok(summary),
                Err(source) => {
                    let transient = !contents.trim().is_empty();
                    if transient && attempt < self.attempts {
                        debug!(
                            path = %path.display(),
                            attempt,
                            "summary parse failed, retrying after write race"
                        );
                        tokio::time::sleep(self.pause).await;
                        continue;
                    }
                    return Err(SummaryReadError::Parse {
                        path: path.to_path_buf(),
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }
}
