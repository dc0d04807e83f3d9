//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key, RPC URL)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (JSON-RPC with failover and timeouts)
//!     → spl_token.rs / transaction.rs (instructions, wire format)
//!     → solana.rs (Ledger implementation: build, sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod address;
pub mod backend;
pub mod client;
pub mod solana;
pub mod spl_token;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use address::Pubkey;
pub use backend::{HoldingAccount, Ledger, NewAsset, TransactionBatch};
pub use client::RpcClient;
pub use solana::SolanaLedger;
pub use types::{Commitment, ConfirmationStatus, LedgerConfig, LedgerError, LedgerResult, Signature};
pub use wallet::{Keypair, Wallet};
