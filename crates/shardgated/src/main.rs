//! shardgated — the shardgate daemon.
//!
//! Single binary that assembles the fleet registry:
//! - Durable store (sqlx/SQLite)
//! - In-process routing table
//! - Registry with startup bulk load
//! - Reconciliation loop
//! - Admin REST API
//!
//! # Usage
//!
//! ```text
//! shardgated run --config /etc/shardgate/gate.toml
//! shardgated run --bind 0.0.0.0:8090 --database-url sqlite:///var/lib/shardgate/gate.db
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use shardgate_api::ApiState;
use shardgate_core::GateConfig;
use shardgate_proxy::Router;
use shardgate_registry::{Reconciler, ReconcilerConfig, Registry, RegistryConfig};
use shardgate_store::Store;

#[derive(Parser)]
#[command(name = "shardgated", about = "Shardgate fleet-registry daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the daemon.
    Run {
        /// Path to gate.toml; defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the API listen address.
        #[arg(long)]
        bind: Option<String>,

        /// Override the database URL.
        #[arg(long)]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shardgate=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            bind,
            database_url,
        } => {
            let mut config = match config {
                Some(path) => GateConfig::from_file(&path)?,
                None => GateConfig::default(),
            };
            if let Some(bind) = bind {
                config.api.bind = bind;
            }
            if let Some(url) = database_url {
                config.database.url = url;
            }
            run(config).await
        }
    }
}

async fn run(config: GateConfig) -> anyhow::Result<()> {
    info!("shardgate daemon starting");

    // Durable store — the only fatal failure path.
    let store = Store::connect(&config.database.url, config.database.pool_size).await?;
    info!(url = %config.database.url, "store connected");

    // Routing table + registry.
    let router = Arc::new(Router::new());
    let registry = Arc::new(Registry::new(
        store,
        router,
        RegistryConfig {
            probe_timeout: config.registry.probe_timeout(),
        },
    ));

    // Mirror every persisted endpoint into memory and routing.
    let loaded = registry.bulk_load().await?;
    info!(loaded, "registry loaded from store");

    // Reconciliation loop.
    let reconciler = Arc::new(Reconciler::new(
        registry.clone(),
        ReconcilerConfig {
            refresh_timeout: config.registry.refresh_timeout(),
            retention: config.registry.retention(),
            probe_concurrency: config.registry.probe_concurrency,
        },
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reconcile_interval = config.registry.reconcile_interval();
    let loop_reconciler = reconciler.clone();
    let reconciler_handle = tokio::spawn(async move {
        loop_reconciler.run(reconcile_interval, shutdown_rx).await;
    });
    info!(
        interval_secs = reconcile_interval.as_secs(),
        retention_hours = config.registry.retention_hours,
        "reconciler started"
    );

    // Admin API.
    let api_state = ApiState {
        registry,
        reconciler,
        max_servers_per_owner: config.registry.max_servers_per_owner,
    };
    let router = shardgate_api::build_router(api_state);

    info!(bind = %config.api.bind, "API server starting");
    let listener = tokio::net::TcpListener::bind(&config.api.bind).await?;

    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    let _ = reconciler_handle.await;
    info!("shardgate daemon stopped");
    Ok(())
}
