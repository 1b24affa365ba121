use kw_core::feed::ProgressSnapshot;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes the progress snapshot for downstream consumers. Writes are
/// atomic (temp file in the same directory, then rename) so readers
/// never observe a torn document. Failures are the caller's to log; the
/// in-memory state stays authoritative either way.
#[derive(Debug, Clone)]
pub struct ProgressPersister {
    path: PathBuf,
}

impl ProgressPersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn persist(&self, snapshot: &ProgressSnapshot) -> Result<(), PersistError> {
        let io = |source: std::io::Error| PersistError::Io {
            path: self.path.clone(),
            source,
        };

        let payload = serde_json::to_string_pretty(snapshot)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io)?;
        }

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "progress.json".to_string());
        let temp = self.path.with_file_name(format!("{file_name}.tmp"));

        fs::write(&temp, payload).map_err(io)?;
        fs::rename(&temp, &self.path).map_err(io)?;
        Ok(())
    }
}
