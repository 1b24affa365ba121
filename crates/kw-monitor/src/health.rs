use kw_core::feed::HealthStatus;
use std::fs;
use std::path::PathBuf;

/// Reads the capture process's health document each refresh cycle. A
/// missing or unparsable file is the normal "logger not running" case
/// and reads as the offline default.
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    path: PathBuf,
}

impl HealthMonitor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn status(&self) -> HealthStatus {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return HealthStatus::offline();
        };
        serde_json::from_str(&contents).unwrap_or_else(|_| HealthStatus::offline())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_offline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let monitor = HealthMonitor::new(dir.path().join("health.json"));
        assert_eq!(monitor.status(), HealthStatus::offline());
    }

    #[test]
    fn garbage_file_reads_as_offline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("health.json");
        fs::write(&path, "][").expect("write");
        assert_eq!(HealthMonitor::new(path).status(), HealthStatus::offline());
    }

    #[test]
    fn valid_document_is_passed_through() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("health.json");
        fs::write(
            &path,
            r#"{"status": "listening", "message": "Keyboard listener active.", "timestamp": 1700000000}"#,
        )
        .expect("write");

        let status = HealthMonitor::new(path).status();
        assert_eq!(status.status, "listening");
        assert_eq!(status.message, "Keyboard listener active.");
        assert_eq!(status.timestamp, Some(1_700_000_000));
    }
}
