//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the signing credential and build the ledger client
//! - Initialize subsystems in dependency order
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, before the listener binds
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, MinterConfig};
use crate::http::{AppState, HttpServer};
use crate::ledger::{Ledger, RpcClient, SolanaLedger, Wallet};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::minting::{MintOrchestrator, TokenRegistry};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Build the application state around a ledger implementation.
pub fn build_state(config: &MinterConfig, ledger: Arc<dyn Ledger>) -> AppState {
    let registry = Arc::new(TokenRegistry::new());
    let orchestrator = Arc::new(MintOrchestrator::new(
        ledger.clone(),
        registry,
        config.minting.clone(),
    ));
    AppState::new(orchestrator, ledger)
}

/// Build the Solana-backed ledger from config and the service wallet.
pub fn build_ledger(config: &MinterConfig, wallet: Wallet) -> Result<Arc<dyn Ledger>, ConfigError> {
    let client = RpcClient::new(config.ledger.clone()).map_err(ConfigError::LedgerClient)?;
    Ok(Arc::new(SolanaLedger::new(client, Arc::new(wallet))))
}

/// Start the service and block until shutdown completes.
pub async fn run(config: MinterConfig) -> Result<(), StartupError> {
    let wallet = Wallet::from_env().map_err(ConfigError::Credential)?;
    tracing::info!(authority = %wallet.pubkey(), "Service wallet loaded");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let ledger = build_ledger(&config, wallet)?;
    if !ledger.is_healthy().await {
        tracing::warn!(rpc_url = %config.ledger.rpc_url, "Ledger RPC not healthy at startup");
    }

    let state = build_state(&config, ledger);

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
    let server = HttpServer::new(config, state);
    let serve = server.run(listener, shutdown.wait());
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => return result.map_err(StartupError::from),
        _ = shutdown.wait() => {}
    }

    match tokio::time::timeout(grace, serve).await {
        Ok(result) => result.map_err(StartupError::from),
        Err(_) => {
            tracing::warn!(grace_secs = grace.as_secs(), "Shutdown grace period elapsed, exiting");
            Ok(())
        }
    }
}
