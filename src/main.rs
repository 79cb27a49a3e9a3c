//! Axis bridge daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 AXIS BRIDGE                  │
//!                    │                                              │
//!   Full node        │  ┌──────────┐   ┌──────────────┐            │
//!   (ws / ipc) ◀─────┼──│  bridge  │──▶│  sfc reads   │──▶ records │
//!        │           │  │  client  │   └──────────────┘            │
//!        │ newHeads  │  └──────────┘                                │
//!        ▼           │  ┌──────────────────┐   ┌────────────┐      │
//!   ─────────────────┼─▶│ observer manager │──▶│ dispatcher │──▶ feed
//!                    │  │ (retry, shutdown)│   └────────────┘      │
//!                    │  └──────────────────┘                        │
//!                    │  config · observability · lifecycle          │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use axis_bridge::bridge::Bridge;
use axis_bridge::config::loader::load_config;
use axis_bridge::config::BridgeConfig;
use axis_bridge::lifecycle::signals::wait_for_signal;
use axis_bridge::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "axis-bridge")]
#[command(about = "Full node bridge with a resilient block header feed", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    logging::init(&config.observability);
    tracing::info!("axis-bridge v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (bridge, feed) = Bridge::connect(&config).await?;

    match bridge.sfc().sfc_version().await {
        Ok(version) => tracing::info!(sfc_version = format!("{version:#08x}"), "SFC contract ready"),
        Err(e) => tracing::warn!(error = %e, "SFC contract not reachable"),
    }

    // Stand-in consumer until a query layer takes the feed.
    let consumer = feed.map(|mut feed| {
        let mut shutdown = bridge.shutdown_signal();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.recv() => break,
                    header = feed.recv() => match header {
                        Some(header) => tracing::info!(
                            number = header.number,
                            hash = %header.hash,
                            "New block header"
                        ),
                        None => break,
                    },
                }
            }
        })
    });

    wait_for_signal().await?;

    if !bridge.close().await {
        tracing::warn!("Forcing exit with background tasks still running");
    }
    if let Some(consumer) = consumer {
        if let Err(e) = consumer.await {
            tracing::error!(error = %e, "Header consumer task failed");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
