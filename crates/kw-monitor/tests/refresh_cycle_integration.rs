use kw_core::milestones::NotificationEvent;
use kw_core::Mode;
use kw_monitor::config::MonitorConfig;
use kw_monitor::runtime::MetricsMonitor;
use std::fs;
use std::path::Path;

fn write_summary(path: &Path, total_events: u64) {
    let payload = serde_json::json!({
        "total_events": total_events,
        "letters": 200,
        "typing_profile": {"avg_interval": 125.0},
        "speed_points": {"earned": 40},
        "word_accuracy": {"score": 66.0, "correct": 66, "incorrect": 34},
        "key_pairs": {"q": {"p": 12}}
    });
    fs::create_dir_all(path.parent().expect("parent")).expect("data dir");
    fs::write(path, payload.to_string()).expect("write summary");
}

fn monitor_for(root: &Path, mode: Mode) -> (MetricsMonitor, tokio::sync::watch::Receiver<kw_monitor::runtime::MonitorState>) {
    let config = MonitorConfig::load(root.to_path_buf(), mode, false, 1000);
    MetricsMonitor::new(config)
}

#[tokio::test]
async fn cycle_computes_rings_and_persists_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_summary(&dir.path().join("data/summary.json"), 250);

    let (mut monitor, state_rx) = monitor_for(dir.path(), Mode::Live);
    monitor.refresh_cycle().await;

    let state = state_rx.borrow().clone();
    assert!(state.status_text.is_none());
    assert_eq!(state.snapshot.key_progress, 250.0);
    assert_eq!(state.snapshot.key_target, 5000.0);
    assert_eq!(state.snapshot.speed_progress, 40.0);
    // 12 distant q->p transitions, full speed credit at 125ms.
    assert_eq!(state.snapshot.handshake_progress, 12.0);
    assert_eq!(state.snapshot.word_accuracy_score, 66.0);
    // No health document written: logger reads as offline.
    assert_eq!(state.health.status, "Logger offline");

    // All four rings moved from zero, so all four pulse.
    assert_eq!(state.pulses.len(), 4);
    assert!(state
        .events
        .contains(&NotificationEvent::KeystrokeMilestone { milestone: 200 }));
    assert!(state
        .events
        .iter()
        .any(|event| matches!(event, NotificationEvent::SpeedStreak { .. })));

    let written: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("data/widget_progress.json")).expect("snapshot file"),
    )
    .expect("snapshot json");
    assert_eq!(written["keyProgress"], 250.0);
    assert_eq!(written["mode"], "live");
    assert!(written["timestamp"].as_i64().unwrap_or_default() > 0);
}

#[tokio::test]
async fn unchanged_summary_produces_a_quiet_second_cycle() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_summary(&dir.path().join("data/summary.json"), 250);

    let (mut monitor, state_rx) = monitor_for(dir.path(), Mode::Live);
    monitor.refresh_cycle().await;
    monitor.refresh_cycle().await;

    let state = state_rx.borrow().clone();
    assert_eq!(state.snapshot.key_progress, 250.0);
    assert!(state.pulses.is_empty());
    assert!(state.events.is_empty());
}

#[tokio::test]
async fn sample_mode_scales_counters_before_computing() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_summary(&dir.path().join("data/sample_summary.json"), 1000);

    let (mut monitor, state_rx) = monitor_for(dir.path(), Mode::Sample);
    monitor.refresh_cycle().await;

    let state = state_rx.borrow().clone();
    // Default demo ratio is 0.05.
    assert_eq!(state.snapshot.key_progress, 50.0);

    let written: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("data/widget_progress.json")).expect("snapshot file"),
    )
    .expect("snapshot json");
    assert_eq!(written["mode"], "sample");
}

#[tokio::test]
async fn read_failure_publishes_status_and_recovers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let summary_path = dir.path().join("data/summary.json");

    let (mut monitor, state_rx) = monitor_for(dir.path(), Mode::Live);
    monitor.refresh_cycle().await;

    {
        let state = state_rx.borrow();
        let status = state.status_text.as_deref().expect("read error surfaced");
        assert!(status.contains("summary missing"));
        assert!(state.pulses.is_empty());
    }
    assert!(!dir.path().join("data/widget_progress.json").exists());

    write_summary(&summary_path, 120);
    monitor.refresh_cycle().await;

    let state = state_rx.borrow().clone();
    assert!(state.status_text.is_none());
    assert_eq!(state.snapshot.key_progress, 120.0);
}

#[tokio::test]
async fn toggling_mode_switches_the_summary_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_summary(&dir.path().join("data/summary.json"), 300);
    write_summary(&dir.path().join("data/sample_summary.json"), 1000);

    let (mut monitor, state_rx) = monitor_for(dir.path(), Mode::Live);
    monitor.refresh_cycle().await;
    assert_eq!(state_rx.borrow().snapshot.key_progress, 300.0);

    let mode = monitor.toggle_mode().await;
    assert_eq!(mode, Mode::Sample);
    assert_eq!(state_rx.borrow().snapshot.key_progress, 50.0);
    assert_eq!(state_rx.borrow().snapshot.mode, Mode::Sample);
}
