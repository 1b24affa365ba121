use kw_core::feed::NarrativeFeed;
use kw_core::Mode;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Single-flight coordinator around the external narrative generator.
///
/// Requests arriving while a generation is in flight are dropped, not
/// queued. The worker reloads the feed document when the subprocess
/// exits, success or failure, so the cached narrative always reflects
/// the generator's last write. Subprocess failures are logged and never
/// surfaced to the caller.
#[derive(Clone)]
pub struct InsightRefresher {
    generator: PathBuf,
    root: PathBuf,
    feed_path: PathBuf,
    in_flight: Arc<AtomicBool>,
    latest: Arc<RwLock<Option<NarrativeFeed>>>,
}

impl InsightRefresher {
    pub fn new(
        generator: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
        feed_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generator: generator.into(),
            root: root.into(),
            feed_path: feed_path.into(),
            in_flight: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(RwLock::new(None)),
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn latest(&self) -> Option<NarrativeFeed> {
        self.latest.read().await.clone()
    }

    /// Fire-and-forget refresh. Returns false when a run was already in
    /// flight and this request was dropped.
    pub fn request_refresh(&self, mode: Mode) -> bool {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("insight refresh already in flight, dropping request");
            return false;
        }

        let refresher = self.clone();
        tokio::spawn(async move {
            refresher.run_generator(mode).await;
            refresher.reload_feed().await;
            refresher.in_flight.store(false, Ordering::SeqCst);
        });
        true
    }

    async fn run_generator(&self, mode: Mode) {
        let status = Command::new(&self.generator)
            .arg("--mode")
            .arg(mode.as_str())
            .arg("--root")
            .arg(&self.root)
            .arg("--once")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => {
                info!(mode = %mode, "insight generator finished");
            }
            Ok(status) => {
                warn!(mode = %mode, %status, "insight generator exited with failure");
            }
            Err(err) => {
                warn!(
                    mode = %mode,
                    generator = %self.generator.display(),
                    %err,
                    "failed to spawn insight generator"
                );
            }
        }
    }

    /// Reloads the feed document the generator writes. Absence is not an
    /// error; the cache keeps its previous narrative.
    pub async fn reload_feed(&self) {
        let Ok(contents) = tokio::fs::read_to_string(&self.feed_path).await else {
            return;
        };
        match serde_json::from_str::<NarrativeFeed>(&contents) {
            Ok(feed) => {
                *self.latest.write().await = Some(feed);
            }
            Err(err) => warn!(path = %self.feed_path.display(), %err, "narrative feed unparsable"),
        }
    }
}
