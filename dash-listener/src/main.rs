mod config;
mod logging;

use anyhow::Context;
use clap::Parser;
use config::{Config, Overrides};
use dash_afpacket::AfPacketSource;
use dash_runtime::capture::CaptureLoop;
use logging::{LogFormat, LogLevel};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Listen for Wi-Fi push buttons and run an action every time one is pressed.
#[derive(Debug, Parser)]
#[command(name = "dash-listener", version)]
struct Cli {
    /// YAML file listing the devices to listen for
    #[arg(short, long, env = "DASH_LISTENER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Network interface to capture on (overrides the config file)
    #[arg(short, long, value_name = "IFACE")]
    interface: Option<String>,

    /// Extra device that announces its presses, e.g. "Kitchen=AC:63:BE:B2:A2:05"
    #[arg(short = 'd', long = "device", value_name = "NAME=ADDRESS")]
    devices: Vec<String>,

    /// Retry a read that has seen no frame for this long (overrides the config file)
    #[arg(long, value_name = "MILLIS")]
    read_timeout_ms: Option<u64>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format, cli.log_level);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let settings = config.merge(Overrides {
        interface: cli.interface,
        read_timeout_ms: cli.read_timeout_ms,
        devices: cli.devices,
    })?;

    let source = AfPacketSource::open(&settings.interface)
        .with_context(|| format!("failed to open a capture socket on {}", settings.interface))?;

    let mut capture = CaptureLoop::new(source, settings.registry);
    if let Some(timeout) = settings.read_timeout {
        capture = capture.read_timeout(timeout);
    }

    let cancel = capture.cancel_token();
    let capture_task = tokio::spawn(capture.run());
    tokio::spawn(stop_on_signal(cancel));

    let report = capture_task
        .await
        .context("capture task panicked")?
        .context("capture stopped")?;

    for device in report.registry.iter() {
        info!(
            device = device.name(),
            address = %device.address(),
            presses = device.trigger_count(),
            "final count"
        );
    }
    Ok(())
}

/// Cancels the capture loop on Ctrl-C or SIGTERM.
async fn stop_on_signal(cancel: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = ctrl_c.await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }

    info!("shutdown requested");
    cancel.cancel();
}
