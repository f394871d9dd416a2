//! Handlink Daemon - Main entry point
//!
//! Runs the hand tracking listener and both controller pose publishers
//! against a standalone host until interrupted.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use handlink_daemon::config;
use handlink_daemon::{Driver, StaticHost};

#[derive(Parser, Debug)]
#[command(name = "handlink")]
#[command(about = "Hand tracking bridge feeding virtual VR controllers")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "handlink.toml")]
    config: PathBuf,

    /// Listener port (overrides the configuration file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write a default configuration file to --config and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Handlink v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        config::save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Wrote default configuration");
        return Ok(());
    }

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    // Override port if specified
    if let Some(port) = args.port {
        config.listener.port = port;
    }

    info!(
        port = config.listener.port,
        interval_ms = config.publisher.interval_ms,
        "Configuration loaded"
    );

    let host = Arc::new(StaticHost::new(config.reference.to_reference_frame()));
    let mut driver = Driver::new(&config, host.clone());
    driver.start(config.listener.port).await;

    let status_secs = config.daemon.status_interval_secs;
    let mut status = tokio::time::interval(Duration::from_secs(status_secs.max(1)));
    status.tick().await;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to wait for Ctrl-C");
                }
                break;
            }
            _ = status.tick(), if status_secs > 0 => {
                let stats = driver.listener_stats();
                info!(
                    connections = stats.connections,
                    lines_applied = stats.lines_applied,
                    lines_ignored = stats.lines_ignored,
                    partial_groups = stats.partial_groups,
                    malformed_groups = stats.malformed_groups,
                    poses = host.poses_submitted(),
                    "Status"
                );
            }
        }
    }

    info!("Shutting down");
    driver.shutdown().await;

    Ok(())
}
