//! Ledger-specific types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Re-export LedgerConfig from config module to avoid duplication
pub use crate::config::schema::LedgerConfig;

/// Lamports per SOL, for display conversions.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC {method} failed ({code}): {message}")]
    Node {
        method: String,
        code: i64,
        message: String,
    },

    /// Transaction was not confirmed within the configured deadline.
    #[error("Transaction {signature} not confirmed after {timeout_secs} seconds")]
    ConfirmationTimeout { signature: String, timeout_secs: u64 },

    /// Transaction landed but failed on-chain.
    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed { signature: String, reason: String },

    /// Invalid signing key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Address decoding failed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Instruction or transaction could not be assembled.
    #[error("Transaction build error: {0}")]
    Build(String),

    /// Serialized transaction exceeds the packet size limit.
    #[error("Transaction too large: {size} bytes exceeds {limit} byte limit")]
    TransactionTooLarge { size: usize, limit: usize },

    /// Node response did not have the expected shape.
    #[error("Unexpected RPC response for {method}: {detail}")]
    UnexpectedResponse { method: String, detail: String },
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Commitment level used for queries and confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }

    /// Whether a status reported by the node satisfies this commitment.
    pub fn is_satisfied_by(&self, reported: Commitment) -> bool {
        reported.rank() >= self.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            Commitment::Processed => 0,
            Commitment::Confirmed => 1,
            Commitment::Finalized => 2,
        }
    }
}

impl FromStr for Commitment {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(LedgerError::Rpc(format!("unknown commitment '{}'", other))),
        }
    }
}

/// A 64-byte Ed25519 transaction signature, displayed in base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

impl FromStr for Signature {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| LedgerError::Rpc(format!("invalid signature encoding: {e}")))?;
        let arr: [u8; 64] = bytes.try_into().map_err(|v: Vec<u8>| {
            LedgerError::Rpc(format!("expected 64 signature bytes, got {}", v.len()))
        })?;
        Ok(Signature(arr))
    }
}

impl Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Transaction confirmation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Not yet seen by the queried node.
    Pending,
    /// Seen, but below the required commitment.
    Processing { reached: Commitment },
    /// Landed with at least the required commitment.
    Confirmed { slot: u64 },
    /// Landed and failed.
    Failed(String),
}

/// A token account of a given mint holding a positive balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolder {
    /// The token (holding) account address.
    pub address: String,
    /// The wallet that owns the holding account.
    pub owner: String,
    /// Balance in whole units.
    pub balance: u64,
}
