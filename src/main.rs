//! Flutterbye Minter
//!
//! HTTP service that mints a message token on Solana and distributes it in
//! one call.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /tokens
//!     ─────────────▶ ┌──────────┐   ┌──────────────┐   ┌──────────────┐   ┌────────────┐
//!                    │   http   │──▶│   minting    │──▶│    ledger    │──▶│ Solana RPC │
//!                    │ handlers │   │ orchestrator │   │ SolanaLedger │   │  cluster   │
//!     ◀───────────── └──────────┘   └──────┬───────┘   └──────────────┘   └────────────┘
//!       receipt                            │
//!                                          ▼
//!                                   ┌──────────────┐
//!                                   │   registry   │ ◀── GET /tokens/{id}/metadata
//!                                   └──────────────┘
//!
//!     Cross-cutting: config · observability · security (rate limit) · lifecycle
//! ```

use clap::Parser;
use std::path::PathBuf;

use flutterbye_minter::config::{load_config, load_default};
use flutterbye_minter::lifecycle;
use flutterbye_minter::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "flutterbye-minter", version)]
#[command(about = "Mint and distribute Flutterbye message tokens", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path),
        None => load_default(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    init_logging(&config.observability);

    tracing::info!("flutterbye-minter v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rpc_url = %config.ledger.rpc_url,
        commitment = config.ledger.commitment.as_str(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if let Err(e) = lifecycle::run(config).await {
        tracing::error!(error = %e, "Startup failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
