use kw_core::rings::{self, RingDefinition};
use kw_core::Mode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Environment fallback for the dashboard root when `--root` is absent.
pub const ROOT_ENV: &str = "KEYBOARD_WRAPPED_ROOT";

const APP_CONFIG_RELATIVE: &str = "config/app.json";

const DEFAULT_SUMMARY_PATH: &str = "data/summary.json";
const DEFAULT_SAMPLE_SUMMARY_PATH: &str = "data/sample_summary.json";
const DEFAULT_PROGRESS_PATH: &str = "data/widget_progress.json";
const DEFAULT_HEALTH_PATH: &str = "data/widget_health.json";
const DEFAULT_FEED_PATH: &str = "data/widget_gpt_feed.json";
const DEFAULT_DEBUG_LOG_PATH: &str = "data/widget_debug.log";
const DEFAULT_INSIGHT_COMMAND: &str = "scripts/widget_gpt.py";

const DEFAULT_SAMPLE_TOTAL_RATIO: f64 = 0.05;
const DEFAULT_SAMPLE_AVG_INTERVAL: f64 = 210.0;
const DEFAULT_HANDSHAKE_THRESHOLD_MS: f64 = 250.0;
const DEFAULT_INSIGHT_INTERVAL_SECS: u64 = 300;
const DEFAULT_STREAK_DELTA: f64 = 5.0;
const DEFAULT_MILESTONE_INTERVAL: u64 = 100;

/// Every file the monitor touches, resolved against the root once at
/// startup.
#[derive(Debug, Clone)]
pub struct WidgetPaths {
    pub live_summary: PathBuf,
    pub sample_summary: PathBuf,
    pub progress: PathBuf,
    pub health: PathBuf,
    pub feed: PathBuf,
    pub debug_log: PathBuf,
}

impl WidgetPaths {
    pub fn summary_for(&self, mode: Mode) -> &Path {
        match mode {
            Mode::Live => &self.live_summary,
            Mode::Sample => &self.sample_summary,
        }
    }
}

/// Explicit configuration value constructed at startup and passed by
/// reference into each component. There is no lazily-loaded singleton.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub root: PathBuf,
    pub mode: Mode,
    pub verbose: bool,
    pub tick: Duration,
    pub insight_interval: Duration,
    pub generator: PathBuf,
    pub rings: Vec<RingDefinition>,
    pub sample_total_ratio: f64,
    pub sample_avg_interval: f64,
    pub handshake_threshold_ms: f64,
    pub streaks_enabled: bool,
    pub streak_delta: f64,
    pub milestone_interval: u64,
    pub paths: WidgetPaths,
}

impl MonitorConfig {
    /// Reads the optional `config/app.json` under `root` and fills the
    /// gaps with defaults. A missing or unreadable file is not an error;
    /// the monitor runs on defaults.
    pub fn load(root: PathBuf, mode: Mode, verbose: bool, tick_ms: u64) -> Self {
        let file = read_app_config(&root);
        let widget = file.widget;
        let notifications = file.notifications;

        let relative = |configured: Option<String>, fallback: &str| -> PathBuf {
            root.join(configured.as_deref().unwrap_or(fallback))
        };

        let paths = WidgetPaths {
            live_summary: relative(widget.summary_path, DEFAULT_SUMMARY_PATH),
            sample_summary: relative(widget.sample_summary_path, DEFAULT_SAMPLE_SUMMARY_PATH),
            progress: relative(widget.progress_path, DEFAULT_PROGRESS_PATH),
            health: relative(widget.health_path, DEFAULT_HEALTH_PATH),
            feed: relative(widget.gpt_feed_path, DEFAULT_FEED_PATH),
            debug_log: relative(widget.debug_log_path, DEFAULT_DEBUG_LOG_PATH),
        };

        let generator = root.join(
            widget
                .insight_command
                .as_deref()
                .unwrap_or(DEFAULT_INSIGHT_COMMAND),
        );

        let mut ring_definitions = widget.rings.unwrap_or_else(rings::default_rings);
        rings::resolve_accent_collisions(&mut ring_definitions);

        Self {
            root,
            mode,
            verbose,
            tick: Duration::from_millis(tick_ms.max(1)),
            insight_interval: Duration::from_secs(
                widget
                    .insight_interval_secs
                    .unwrap_or(DEFAULT_INSIGHT_INTERVAL_SECS)
                    .max(1),
            ),
            generator,
            rings: ring_definitions,
            sample_total_ratio: widget
                .sample_total_ratio
                .unwrap_or(DEFAULT_SAMPLE_TOTAL_RATIO),
            sample_avg_interval: widget
                .sample_avg_interval
                .unwrap_or(DEFAULT_SAMPLE_AVG_INTERVAL),
            handshake_threshold_ms: widget
                .handshake_threshold_ms
                .unwrap_or(DEFAULT_HANDSHAKE_THRESHOLD_MS),
            streaks_enabled: notifications.streaks_enabled.unwrap_or(true),
            streak_delta: notifications.streak_delta.unwrap_or(DEFAULT_STREAK_DELTA),
            milestone_interval: notifications
                .milestone_interval
                .unwrap_or(DEFAULT_MILESTONE_INTERVAL),
            paths,
        }
    }
}

/// Root resolution order: explicit flag, then the environment, then the
/// working directory.
pub fn resolve_root(cli_root: Option<PathBuf>) -> PathBuf {
    if let Some(root) = cli_root {
        return root;
    }
    if let Ok(env_root) = std::env::var(ROOT_ENV) {
        let trimmed = env_root.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[derive(Debug, Default, Deserialize)]
struct AppConfigFile {
    #[serde(default)]
    widget: WidgetSection,
    #[serde(default)]
    notifications: NotificationSection,
}

#[derive(Debug, Default, Deserialize)]
struct WidgetSection {
    #[serde(default)]
    summary_path: Option<String>,
    #[serde(default)]
    sample_summary_path: Option<String>,
    #[serde(default)]
    progress_path: Option<String>,
    #[serde(default)]
    health_path: Option<String>,
    #[serde(default)]
    gpt_feed_path: Option<String>,
    #[serde(default)]
    debug_log_path: Option<String>,
    #[serde(default)]
    insight_command: Option<String>,
    #[serde(default)]
    insight_interval_secs: Option<u64>,
    #[serde(default)]
    sample_total_ratio: Option<f64>,
    #[serde(default)]
    sample_avg_interval: Option<f64>,
    #[serde(default)]
    handshake_threshold_ms: Option<f64>,
    #[serde(default)]
    rings: Option<Vec<RingDefinition>>,
}

#[derive(Debug, Default, Deserialize)]
struct NotificationSection {
    #[serde(default)]
    streaks_enabled: Option<bool>,
    #[serde(default)]
    streak_delta: Option<f64>,
    #[serde(default)]
    milestone_interval: Option<u64>,
}

fn read_app_config(root: &Path) -> AppConfigFile {
    let path = root.join(APP_CONFIG_RELATIVE);
    let Ok(contents) = fs::read_to_string(&path) else {
        return AppConfigFile::default();
    };
    match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(path = %path.display(), %err, "ignoring unreadable app config");
            AppConfigFile::default()
        }
    }
}
