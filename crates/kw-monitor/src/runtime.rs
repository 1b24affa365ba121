use crate::config::MonitorConfig;
use crate::debug_log::DebugSink;
use crate::health::HealthMonitor;
use crate::insight::InsightRefresher;
use crate::persist::ProgressPersister;
use crate::reader::SummaryReader;
use kw_core::feed::{HealthStatus, ProgressSnapshot};
use kw_core::metrics::{compute_metrics, ComputedMetrics};
use kw_core::milestones::{MilestoneNotifier, NotificationEvent, NotifierConfig};
use kw_core::pulse::RingPulseTracker;
use kw_core::rings::{RingDefinition, RingValue, RING_SPEED};
use kw_core::sample::SampleTransform;
use kw_core::summary::Summary;
use kw_core::Mode;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// In-process requests the run loop services alongside its own timer and
/// file-watch triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    /// Run a refresh cycle now.
    Refresh,
    /// Switch between live and sample data, re-arm the watch, refresh.
    ToggleMode,
    /// Ask the insight refresher for a new narrative (panel opened).
    RefreshInsight,
}

/// State published after every refresh cycle. The presentation layer
/// receives it through a watch channel; nothing observes monitor fields
/// directly.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub snapshot: ProgressSnapshot,
    pub rings: Vec<RingValue>,
    /// Ring keys whose displayed integer value just increased.
    pub pulses: Vec<String>,
    pub events: Vec<NotificationEvent>,
    pub health: HealthStatus,
    /// Last read error, replaced by `None` on the next good cycle.
    pub status_text: Option<String>,
}

struct WatchSignal {
    rearm: bool,
}

struct SummaryWatch {
    _watcher: RecommendedWatcher,
}

impl SummaryWatch {
    /// Watches the summary file's directory (non-recursive) and forwards
    /// events touching the file. tmp-and-rename writes, deletions, and
    /// recreations all show up as directory entries, and a remove or
    /// rename asks the run loop to re-arm against the current mode's
    /// path.
    fn arm(path: &Path, tx: mpsc::Sender<WatchSignal>) -> Result<Self, notify::Error> {
        let target = path.to_path_buf();
        let watch_root = target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| target.clone());
        let file_name = target.file_name().map(|name| name.to_os_string());

        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<Event>| match result {
                Ok(event) => {
                    let relevant = event.paths.is_empty()
                        || event.paths.iter().any(|changed| {
                            changed == &target || changed.file_name() == file_name.as_deref()
                        });
                    if !relevant {
                        return;
                    }
                    let rearm = matches!(
                        event.kind,
                        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_))
                    );
                    let _ = tx.blocking_send(WatchSignal { rearm });
                }
                Err(err) => warn!(%err, "summary watch error"),
            })?;

        let _ = fs::create_dir_all(&watch_root);
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

        Ok(Self { _watcher: watcher })
    }
}

/// The live metrics monitor. A 1-second timer and the summary file watch
/// both funnel into `refresh_cycle`; the cycle is idempotent for
/// unchanged file content, and a guard drops duplicate triggers while a
/// cycle is in progress instead of racing them.
pub struct MetricsMonitor {
    config: MonitorConfig,
    mode: Mode,
    reader: SummaryReader,
    rings: Vec<RingDefinition>,
    pulses: RingPulseTracker,
    notifier: MilestoneNotifier,
    notifier_config: NotifierConfig,
    health: HealthMonitor,
    persister: ProgressPersister,
    debug: DebugSink,
    insight: InsightRefresher,
    cycle_guard: Arc<AtomicBool>,
    state_tx: watch::Sender<MonitorState>,
    watch: Option<SummaryWatch>,
}

impl MetricsMonitor {
    pub fn new(config: MonitorConfig) -> (Self, watch::Receiver<MonitorState>) {
        let (state_tx, state_rx) = watch::channel(MonitorState::default());

        let notifier_config = NotifierConfig {
            streaks_enabled: config.streaks_enabled,
            streak_delta: config.streak_delta,
            milestone_interval: config.milestone_interval,
        };
        let health = HealthMonitor::new(config.paths.health.clone());
        let persister = ProgressPersister::new(config.paths.progress.clone());
        let debug = DebugSink::new(config.paths.debug_log.clone(), config.verbose);
        let insight = InsightRefresher::new(
            config.generator.clone(),
            config.root.clone(),
            config.paths.feed.clone(),
        );

        let monitor = Self {
            mode: config.mode,
            rings: config.rings.clone(),
            reader: SummaryReader::new(),
            pulses: RingPulseTracker::new(),
            notifier: MilestoneNotifier::new(),
            notifier_config,
            health,
            persister,
            debug,
            insight,
            cycle_guard: Arc::new(AtomicBool::new(false)),
            state_tx,
            watch: None,
            config,
        };
        (monitor, state_rx)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn insight(&self) -> &InsightRefresher {
        &self.insight
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state_tx.subscribe()
    }

    pub fn request_insight_refresh(&self) -> bool {
        self.insight.request_refresh(self.mode)
    }

    /// Flips the data source and immediately refreshes. Callers driving
    /// the run loop should use `MonitorCommand::ToggleMode` instead so
    /// the file watch is re-armed as well.
    pub async fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.toggled());
        self.refresh_cycle().await;
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        info!(mode = %self.mode, "mode switched");
        self.debug.append(&format!("mode switched to {}", self.mode));
    }

    /// One recompute pass: read, transform, compute, notify, persist,
    /// publish. Both triggers land here; a duplicate trigger while a
    /// cycle runs is suppressed, not queued.
    pub async fn refresh_cycle(&mut self) {
        if self
            .cycle_guard
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("refresh cycle already in progress, dropping duplicate trigger");
            return;
        }
        self.run_cycle().await;
        self.cycle_guard.store(false, Ordering::SeqCst);
    }

    async fn run_cycle(&mut self) {
        let summary_path = self.config.paths.summary_for(self.mode).to_path_buf();
        let health = self.health.status();

        let summary = match self.reader.load(&summary_path).await {
            Ok(summary) => summary,
            Err(err) => {
                let message = err.to_string();
                warn!(%message, "refresh cycle read failed");
                self.debug.append(&format!("summary read failed: {message}"));
                self.state_tx.send_modify(|state| {
                    state.status_text = Some(message);
                    state.health = health;
                    state.pulses.clear();
                    state.events.clear();
                });
                return;
            }
        };

        let summary = self.apply_mode_transform(summary);
        let metrics = compute_metrics(&summary, self.config.handshake_threshold_ms);
        let ring_values = self.ring_values(&metrics, &summary);

        let pulses: Vec<String> = ring_values
            .iter()
            .filter(|value| self.pulses.should_pulse(&value.key, value.progress))
            .map(|value| value.key.clone())
            .collect();

        let enabled: Vec<&RingDefinition> =
            self.rings.iter().filter(|ring| ring.enabled).collect();
        let readings: Vec<(&RingDefinition, &RingValue)> = enabled
            .iter()
            .copied()
            .zip(ring_values.iter())
            .collect();
        let speed_progress = ring_values
            .iter()
            .find(|value| value.key == RING_SPEED)
            .map(|value| value.progress)
            .unwrap_or(metrics.speed_score);

        let events = self.notifier.evaluate(
            &readings,
            speed_progress,
            metrics.total_events,
            &self.notifier_config,
        );
        for event in &events {
            info!(title = event.title(), body = %event.body(), "notification");
            self.debug
                .append(&format!("{}: {}", event.title(), event.body()));
        }

        let snapshot = ProgressSnapshot::from_rings(self.mode, &ring_values);
        if let Err(err) = self.persister.persist(&snapshot) {
            warn!(%err, "progress snapshot write failed");
            self.debug
                .append(&format!("progress snapshot write failed: {err}"));
        }

        let _ = self.state_tx.send_replace(MonitorState {
            snapshot,
            rings: ring_values,
            pulses,
            events,
            health,
            status_text: None,
        });
    }

    fn apply_mode_transform(&self, mut summary: Summary) -> Summary {
        if self.mode == Mode::Sample {
            SampleTransform::new(
                self.config.sample_total_ratio,
                self.config.sample_avg_interval,
            )
            .apply(&mut summary);
        }
        summary
    }

    fn ring_values(&self, metrics: &ComputedMetrics, summary: &Summary) -> Vec<RingValue> {
        use kw_core::rings::{RING_ACCURACY, RING_BALANCE, RING_KEYSTROKES};
        self.rings
            .iter()
            .filter(|ring| ring.enabled)
            .map(|ring| {
                let progress = match ring.key.as_str() {
                    RING_KEYSTROKES => metrics.total_events as f64,
                    RING_SPEED => metrics.speed_score,
                    RING_BALANCE => metrics.handshake_score,
                    RING_ACCURACY => summary.word_accuracy.score,
                    _ => 0.0,
                };
                RingValue::new(&ring.key, progress, ring.target)
            })
            .collect()
    }

    fn arm_watch(&mut self, tx: &mpsc::Sender<WatchSignal>) {
        let path = self.config.paths.summary_for(self.mode);
        match SummaryWatch::arm(path, tx.clone()) {
            Ok(watch) => self.watch = Some(watch),
            Err(err) => {
                // The timer tick keeps the monitor current until the
                // next re-arm attempt.
                warn!(path = %path.display(), %err, "summary watch unavailable");
                self.watch = None;
            }
        }
    }

    /// Drives the monitor until the command channel closes. A 1-second
    /// tick and the file watch both trigger refresh cycles; a slower
    /// interval keeps the narrative insight current.
    pub async fn run(mut self, mut commands: mpsc::Receiver<MonitorCommand>) {
        let (watch_tx, mut watch_rx) = mpsc::channel::<WatchSignal>(16);
        self.arm_watch(&watch_tx);

        let mut tick = tokio::time::interval(self.config.tick);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut insight_tick = tokio::time::interval(self.config.insight_interval);
        insight_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Surface whatever the generator wrote on a previous run before
        // the first regeneration completes.
        self.insight.reload_feed().await;
        self.refresh_cycle().await;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    self.refresh_cycle().await;
                }
                signal = watch_rx.recv() => {
                    let Some(signal) = signal else { break };
                    if signal.rearm {
                        self.arm_watch(&watch_tx);
                    }
                    self.refresh_cycle().await;
                }
                _ = insight_tick.tick() => {
                    self.insight.request_refresh(self.mode);
                }
                command = commands.recv() => {
                    match command {
                        Some(MonitorCommand::Refresh) => self.refresh_cycle().await,
                        Some(MonitorCommand::ToggleMode) => {
                            self.set_mode(self.mode.toggled());
                            self.arm_watch(&watch_tx);
                            self.refresh_cycle().await;
                        }
                        Some(MonitorCommand::RefreshInsight) => {
                            self.insight.request_refresh(self.mode);
                        }
                        None => break,
                    }
                }
            }
        }

        info!("monitor run loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn armed_watch_reports_summary_writes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let summary_path = dir.path().join("data/summary.json");

        let (tx, mut rx) = mpsc::channel(16);
        let _watch = SummaryWatch::arm(&summary_path, tx).expect("arm");
        std::fs::write(&summary_path, "{}").expect("write");

        let signal = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("watch event before timeout")
            .expect("channel open");
        assert!(!signal.rearm);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn removing_the_summary_requests_a_rearm() {
        let dir = tempfile::tempdir().expect("tempdir");
        let summary_path = dir.path().join("summary.json");
        std::fs::write(&summary_path, "{}").expect("write");

        let (tx, mut rx) = mpsc::channel(16);
        let _watch = SummaryWatch::arm(&summary_path, tx).expect("arm");
        std::fs::remove_file(&summary_path).expect("remove");

        let mut saw_rearm = false;
        while let Ok(Some(signal)) =
            tokio::time::timeout(Duration::from_secs(5), rx.recv()).await
        {
            if signal.rearm {
                saw_rearm = true;
                break;
            }
        }
        assert!(saw_rearm);
    }
}
