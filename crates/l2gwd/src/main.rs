//! l2gwd - L2 gateway control-plane daemon
//!
//! Serves the gateway and connection REST API, and accepts hardware-state
//! change batches and port events from the southbound side.
//!
//! Usage:
//!   l2gwd [--config l2gwd.toml] [--bind 0.0.0.0:9697] [--db l2gw.db]
//!
//! Without `--db` or `[store] path` the store is in-memory.

mod agent;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use l2gw_api::{create_router, AppState};
use l2gw_core::DefaultMappingValidator;
use l2gw_db::{HardwareStore, L2GatewayDb, Store};
use l2gw_ovsdb::{subscribe, MacTableSync, OvsdbData, PortEventBus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::agent::LoggingMacAgent;
use crate::config::{Config, LogFormat};

#[derive(Parser, Debug)]
#[command(name = "l2gwd")]
#[command(author, version, about = "L2 gateway control-plane daemon")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "L2GWD_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides `[server] bind`
    #[arg(short, long, env = "L2GWD_BIND")]
    bind: Option<String>,

    /// SQLite database file, overrides `[store] path`
    #[arg(long, env = "L2GWD_DB")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(db) = args.db {
        config.store.path = Some(db);
    }

    init_logging(config.log.format);

    tracing::info!("Starting l2gwd (L2 gateway control plane)");
    if let Some(ref path) = args.config {
        tracing::info!("Loaded config from: {}", path.display());
    }

    let store = match config.store.path {
        Some(ref path) => Arc::new(Store::open(path)?),
        None => {
            tracing::warn!("No store path configured, state will not survive a restart");
            Arc::new(Store::open_in_memory()?)
        }
    };

    let validator = Arc::new(DefaultMappingValidator::new(config.mapping.rule));
    let service = Arc::new(L2GatewayDb::with_validator(store.clone(), validator));
    let ovsdb = Arc::new(OvsdbData::new(store.clone()));
    tracing::info!(rule = ?config.mapping.rule, "Gateway service ready");

    // Port events drive MAC table maintenance on the source devices
    let port_events = Arc::new(PortEventBus::new());
    let mac_sync = Arc::new(MacTableSync::new(
        HardwareStore::new(store),
        Arc::new(LoggingMacAgent),
    ));
    subscribe(&port_events, mac_sync);

    let app = create_router(AppState::new(service, ovsdb, port_events));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("l2gwd stopped");
    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "l2gwd=info,l2gw_api=info,l2gw_db=info,l2gw_ovsdb=debug".into()
    });

    let (text, json) = match format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
