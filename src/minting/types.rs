//! Mint request, receipt and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::schema::MintingConfig;
use crate::ledger::address::Pubkey;
use crate::ledger::types::{LedgerError, Signature};

/// Request-level validation failures. Raised before any ledger call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("message is {actual} characters, maximum is {max}")]
    MessageTooLong { max: usize, actual: usize },

    #[error("message must not contain '<' or '>'")]
    MessageMarkup,

    #[error("total supply {supply} is outside 1..={max}")]
    SupplyOutOfRange { supply: u64, max: u64 },

    #[error("{count} recipients given, maximum is {max}")]
    TooManyRecipients { count: usize, max: usize },

    #[error("invalid minter address '{0}'")]
    InvalidMinter(String),

    #[error("total supply {total_supply} is less than {recipients} distinct recipients")]
    InsufficientSupply { total_supply: u64, recipients: u64 },

    #[error("no valid recipients and no surplus to mint")]
    NothingToMint,
}

/// Errors of a mint attempt.
#[derive(Debug, Error)]
pub enum MintError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The ledger rejected, failed or timed out. `confirmed_batches` counts
    /// transactions that did land; their effects are not rolled back.
    #[error("ledger submission failed: {source}")]
    LedgerSubmission {
        token_type_id: Option<Pubkey>,
        confirmed_batches: usize,
        #[source]
        source: LedgerError,
    },
}

/// A validated token message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenMessage(String);

impl TokenMessage {
    /// Trim and validate against `max_chars`.
    pub fn parse(raw: &str, max_chars: usize) -> Result<Self, ValidationError> {
        let message = raw.trim();
        if message.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        let actual = message.chars().count();
        if actual > max_chars {
            return Err(ValidationError::MessageTooLong {
                max: max_chars,
                actual,
            });
        }
        if message.contains(['<', '>']) {
            return Err(ValidationError::MessageMarkup);
        }
        Ok(Self(message.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A mint request that passed request-shape validation.
///
/// Recipient addresses stay raw: unparsable ones are dropped when the
/// distribution plan is built.
#[derive(Debug, Clone)]
pub struct MintRequest {
    pub message: TokenMessage,
    pub total_supply: u64,
    pub recipient_addresses: Vec<String>,
    pub minter: Pubkey,
}

impl MintRequest {
    pub fn new(
        message: &str,
        total_supply: u64,
        recipient_addresses: Vec<String>,
        minter: &str,
        limits: &MintingConfig,
    ) -> Result<Self, ValidationError> {
        let message = TokenMessage::parse(message, limits.max_message_chars)?;

        if total_supply == 0 || total_supply > limits.max_total_supply {
            return Err(ValidationError::SupplyOutOfRange {
                supply: total_supply,
                max: limits.max_total_supply,
            });
        }

        if recipient_addresses.len() > limits.max_recipients {
            return Err(ValidationError::TooManyRecipients {
                count: recipient_addresses.len(),
                max: limits.max_recipients,
            });
        }

        let minter = minter
            .trim()
            .parse::<Pubkey>()
            .map_err(|_| ValidationError::InvalidMinter(minter.to_string()))?;

        Ok(Self {
            message,
            total_supply,
            recipient_addresses,
            minter,
        })
    }
}

/// Outcome of a successful mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub token_type_id: Pubkey,
    /// Signature of the creating (first) transaction.
    pub transaction_id: Signature,
    /// Every transaction, in submission order.
    pub transaction_ids: Vec<Signature>,
    pub distributed_count: u64,
    pub surplus_count: u64,
    pub dropped_count: usize,
    pub metadata_uri: String,
}

/// What this process remembers about a token it minted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub id: Pubkey,
    pub name: String,
    pub symbol: String,
    pub message: String,
    pub decimals: u8,
    pub total_supply: u64,
    pub distributed_count: u64,
    pub surplus_count: u64,
    pub minter: Pubkey,
    pub authority: Pubkey,
    pub transaction_ids: Vec<Signature>,
    pub metadata_uri: String,
    /// Unix timestamp, seconds.
    pub created_at: u64,
}

/// Metadata URI of a token served by this process.
pub fn metadata_uri(base_url: &str, id: &Pubkey) -> String {
    format!("{}/tokens/{}/metadata", base_url.trim_end_matches('/'), id)
}
