//! Reference host for the bootstrap library.
//!
//! ```text
//!   config file + env ──▶ Registrar ──announce──▶ directory service
//!                    │
//!                    └──▶ BoundedListener ──▶ DrainSequencer ──▶ /health + routes
//!
//!   SIGINT/SIGTERM ──▶ LifecycleSignal ──▶ heartbeat stops
//!                                      ──▶ health NOT_SERVING
//!                                      ──▶ drain (forced after grace)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use mesh_bootstrap::config;
use mesh_bootstrap::lifecycle::{trigger_on_os_signal, DrainSequencer, LifecycleSignal};
use mesh_bootstrap::net::BoundedListener;
use mesh_bootstrap::observability::{logging, metrics};
use mesh_bootstrap::registrar::Registrar;
use mesh_bootstrap::server::new_server;

#[derive(Parser)]
#[command(name = "mesh-bootstrap")]
#[command(about = "Directory heartbeat and graceful drain host", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment variables override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener bind address, overriding config and environment.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(logging::DEFAULT_FILTER);

    tracing::info!("mesh-bootstrap v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    tracing::info!(
        service = %config.registrar.service_name,
        directory = %config.registrar.directory_addr,
        bind_address = %config.server.bind_address,
        drain_grace = ?config.server.drain_grace,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = BoundedListener::bind(&config.server).await?;
    let registrar = Arc::new(Registrar::from_config(&config.registrar)?);
    let (router, health) = new_server();

    let signal = LifecycleSignal::new();
    trigger_on_os_signal(signal.clone());

    let heartbeat = {
        let registrar = registrar.clone();
        let observer = signal.observe();
        tokio::spawn(async move { registrar.run(observer).await })
    };

    {
        let observer = signal.observe();
        tokio::spawn(async move {
            observer.stopping().await;
            health.shutdown();
        });
    }

    let outcome = DrainSequencer::new(config.server.drain_grace)
        .run(listener, router, signal.observe())
        .await;

    match heartbeat.await {
        Ok(report) => tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "Heartbeat finished"
        ),
        Err(e) => tracing::error!(error = %e, "Heartbeat task failed"),
    }
    registrar.close();

    tracing::info!(outcome = outcome.as_str(), "Shutdown complete");
    Ok(())
}
