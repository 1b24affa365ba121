use anyhow::Result;
use clap::Parser;
use kw_core::Mode;
use kw_monitor::config::{self, MonitorConfig};
use kw_monitor::runtime::{MetricsMonitor, MonitorCommand};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Live metrics monitor for the keyboard activity dashboard.
///
/// Watches the capture process's summary document, recomputes ring
/// progress and notifications, and persists a snapshot for the
/// presentation layer.
#[derive(Debug, Parser)]
#[command(name = "kw-monitor", version, about)]
struct Args {
    /// Dashboard root directory. Falls back to $KEYBOARD_WRAPPED_ROOT,
    /// then the working directory.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Data source: "live" reads captured activity, "sample" reads the
    /// bundled demo summary.
    #[arg(long, default_value = "live", value_parser = parse_mode)]
    mode: Mode,

    /// Refresh tick in milliseconds.
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,

    /// Also append diagnostics to the widget debug log.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_mode(value: &str) -> Result<Mode, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let root = config::resolve_root(args.root);
    let config = MonitorConfig::load(root, args.mode, args.verbose, args.tick_ms);
    info!(
        root = %config.root.display(),
        mode = %config.mode,
        "starting metrics monitor"
    );

    let (monitor, _state_rx) = MetricsMonitor::new(config);
    let (command_tx, command_rx) = mpsc::channel::<MonitorCommand>(8);
    let run = tokio::spawn(monitor.run(command_rx));

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    drop(command_tx);
    run.await?;

    Ok(())
}
