//! # hwbridged — hardware bridge daemon
//!
//! Composition root that wires all adapters together and runs the bridge.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Connect to the message bus
//! - Select the output driver and open the sensors
//! - Start the bridge and stop it on SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no bridge logic belongs here.

mod config;
mod wiring;

use tracing_subscriber::EnvFilter;

use hwbridge_adapter_dbus::DbusTransport;
use hwbridge_app::bridge::Bridge;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_tracing(&config.logging.filter);

    let transport = DbusTransport::connect(config.bus.kind).await?;
    let outputs = wiring::outputs(&config.outputs);
    let sensors = wiring::sensors(&config.sensors);

    tracing::info!(
        bus = %config.bus.kind,
        service = %config.bus.target.service_name,
        outputs = ?config.outputs.driver,
        "hwbridged starting"
    );

    let bridge = Bridge::start(transport, outputs, sensors, config.bridge_settings()).await;

    shutdown_signal().await;
    bridge.shutdown().await;

    Ok(())
}

fn init_tracing(filter: &str) {
    let (filter, invalid) = match EnvFilter::try_new(filter) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new("info"), Some(err)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(err) = invalid {
        tracing::warn!(%err, "invalid log filter, falling back to info");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "unable to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
