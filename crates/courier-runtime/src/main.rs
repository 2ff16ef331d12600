//! # Courier Runtime
//!
//! Console entry point for one transporter session.
//!
//! ## Startup Sequence
//!
//! 1. Install logging from `PR_LOG`, then load the other `PR_*` variables
//! 2. Build the subsystem container (validates configuration)
//! 3. Start the display handler
//! 4. Credit the access unlock
//! 5. Start the timeout sweeper, if configured
//! 6. Read commands from stdin until `quit`, EOF or Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use pr_01_shipment_lifecycle::{CancelCause, ShipmentLifecycleApi};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use courier_runtime::container::LoggingConfig;
use courier_runtime::{CourierContainer, Flow, RuntimeConfig, Session};

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("invalid PR_LOG filter {:?}", config.filter))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install JSON logger: {e}"))?;
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
    }
    Ok(())
}

/// Roll back gates left open past the configured timeout.
fn spawn_timeout_sweeper(
    container: &CourierContainer,
    mut shutdown: watch::Receiver<bool>,
) -> Option<tokio::task::JoinHandle<()>> {
    let timeout_ms = container.config.lifecycle.pending_timeout_ms?;
    let lifecycle = Arc::clone(&container.lifecycle);
    let period = Duration::from_millis((timeout_ms / 4).clamp(50, 1_000));

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(report) = lifecycle.cleanup_timeouts().await {
                        println!("{} timed out; status {}", report.milestone, report.restored);
                    }
                }
                _ = shutdown.changed() => {
                    info!("Timeout sweeper stopping");
                    return;
                }
            }
        }
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::load_with(|key| std::env::var(key).ok(), init_logging)?;

    let container = CourierContainer::new(config).context("invalid configuration")?;
    info!(
        shipment = %container.config.shipment,
        status = %container.lifecycle.status(),
        "Courier session starting"
    );

    let (display_tx, mut display_rx) = mpsc::unbounded_channel();
    container.spawn_display(display_tx);
    tokio::spawn(async move {
        while let Some(line) = display_rx.recv().await {
            println!("{line}");
        }
    });

    if let Err(e) = container.unlock_access().await {
        error!(error = %e, "Access unlock award failed");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper = spawn_timeout_sweeper(&container, shutdown_rx);

    let session = Session::new(
        container.lifecycle.clone(),
        container.earnings.clone(),
        container.picker.clone(),
    );

    println!("Shipment {}. Type 'help' for commands.", container.config.shipment);
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = input.next_line() => line.context("failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received");
                None
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match session.handle_line(&line).await {
            Ok(Flow::Continue(lines)) => {
                for line in lines {
                    println!("{line}");
                }
            }
            Ok(Flow::Quit) => break,
            Err(e) => println!("{e}"),
        }
    }

    // Leaving the shipment screen abandons any open gate
    if let Err(e) = container
        .lifecycle
        .cancel_pending(CancelCause::NavigatedAway)
        .await
    {
        warn!(error = %e, "Failed to roll back open gate on exit");
    }

    if let Err(e) = shutdown_tx.send(true) {
        warn!(error = %e, "Failed to send shutdown signal");
    }
    if let Some(sweeper) = sweeper {
        let _ = sweeper.await;
    }

    info!("Session ended");
    Ok(())
}
