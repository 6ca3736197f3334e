//! muse-daemon: the Muse revenue-ledger daemon.
//!
//! Single OS process running a Tokio async runtime. Clients (dashboard
//! UI, indexers) talk to the daemon via JSON-RPC over a Unix socket.

mod commands;
mod config;
mod events;
mod rpc;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info};

use muse_ledger::Ledger;
use muse_mirror::{DistributionMode, Mirror};

use crate::config::DaemonConfig;
use crate::events::EventBus;
use crate::rpc::RpcServer;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// The authoritative ledger.
    pub ledger: tokio::sync::Mutex<Ledger>,
    /// The client mirror (mode + simulation history).
    pub mirror: tokio::sync::Mutex<Mirror>,
    /// Configuration.
    pub config: DaemonConfig,
    /// Event bus for pushing events to subscribers.
    pub event_bus: EventBus,
    /// Shutdown signal sender.
    pub shutdown_tx: broadcast::Sender<()>,
    /// Unix timestamp of process start.
    pub started_at: u64,
}

impl DaemonState {
    /// Assemble daemon state around an opened database connection.
    pub fn new(conn: rusqlite::Connection, config: DaemonConfig) -> anyhow::Result<Self> {
        let ledger = Ledger::new(conn, config.ledger.owner_account.clone());

        // The persisted mode wins over the config default.
        let mode = match ledger.setting("distribution_mode")? {
            Some(saved) => saved.parse::<DistributionMode>()?,
            None => config.distribution.default_mode.parse::<DistributionMode>()?,
        };

        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

        Ok(Self {
            ledger: tokio::sync::Mutex::new(ledger),
            mirror: tokio::sync::Mutex::new(Mirror::new(mode)),
            config,
            event_bus: EventBus::new(1000),
            shutdown_tx,
            started_at: muse_types::unix_now(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("muse=info".parse()?),
        )
        .init();

    info!("Muse daemon starting");

    // 1. Load config
    let config = DaemonConfig::load()?;
    let data_dir = config.data_dir();

    // Ensure data directory exists
    std::fs::create_dir_all(&data_dir)?;

    // 2. Open database
    let db_path = data_dir.join("muse.db");
    let conn = muse_db::open(&db_path)?;

    // 3. Build daemon state
    let state = Arc::new(DaemonState::new(conn, config)?);
    let shutdown_tx = state.shutdown_tx.clone();

    // 4. Start IPC server
    let socket_path = data_dir.join("daemon.sock");
    let rpc_server = RpcServer::new(state.clone(), socket_path.clone());

    info!("Starting JSON-RPC server on {:?}", socket_path);

    // 5. Emit DaemonStarted event
    state.event_bus.emit(events::Event::now(
        "DaemonStarted",
        serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        }),
    ));

    // 6. Run the RPC server until shutdown
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutdown signal received");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    // Graceful shutdown
    info!("Daemon shutting down gracefully");

    // Clean up socket file
    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped");
    Ok(())
}
