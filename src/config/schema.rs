//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the minter.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::ledger::types::Commitment;

/// Root configuration for the minting service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MinterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Solana RPC and confirmation settings.
    pub ledger: LedgerConfig,

    /// Token parameters and request limits.
    pub minting: MintingConfig,

    /// Rate limiting of mint requests.
    pub rate_limit: RateLimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Timeout for read endpoints in seconds. `POST /tokens` is exempt;
    /// each of its batches is bounded by `ledger.confirmation_timeout_secs`.
    pub request_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 120,
            shutdown_grace_secs: 30,
        }
    }
}

/// Ledger (Solana RPC) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Commitment required before a transaction counts as confirmed.
    pub commitment: Commitment,

    /// Skip the node's preflight simulation on submit.
    pub skip_preflight: bool,

    /// Deadline for a single transaction to reach `commitment`, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Signature status polling interval in milliseconds.
    pub confirmation_poll_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            commitment: Commitment::Confirmed,
            skip_preflight: false,
            confirmation_timeout_secs: 60,
            confirmation_poll_ms: 500,
        }
    }
}

/// Token parameters and request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MintingConfig {
    /// Display name of every minted token type.
    pub token_name: String,

    /// Ticker symbol of every minted token type.
    pub token_symbol: String,

    /// Public base URL of this service; metadata URIs are built from it.
    pub metadata_base_url: String,

    /// Image referenced by token metadata.
    pub image_url: String,

    /// External URL referenced by token metadata.
    pub external_url: String,

    /// Maximum message length in characters.
    pub max_message_chars: usize,

    /// Maximum total supply per token type.
    pub max_total_supply: u64,

    /// Maximum number of candidate recipients per request.
    pub max_recipients: usize,

    /// Instruction cap per submitted transaction.
    pub max_instructions_per_transaction: usize,
}

impl Default for MintingConfig {
    fn default() -> Self {
        Self {
            token_name: "FLBY-MSG".to_string(),
            token_symbol: "FLBY-MSG".to_string(),
            metadata_base_url: "http://localhost:8080".to_string(),
            image_url: "https://flutterbye.app/assets/token-icon.png".to_string(),
            external_url: "https://flutterbye.app".to_string(),
            max_message_chars: 27,
            max_total_supply: 1_000_000,
            max_recipients: 500,
            max_instructions_per_transaction: 12,
        }
    }
}

/// Rate limiting configuration for mint requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Sustained mint requests allowed per client IP per hour.
    pub mints_per_hour: u32,

    /// Burst capacity.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mints_per_hour: 100,
            burst_size: 100,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
        }
    }
}
