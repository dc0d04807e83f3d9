//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Validate addresses and URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MinterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::MinterConfig;

/// Smallest instruction cap that still fits the creation pair plus one
/// open/credit pair in the first transaction.
const MIN_INSTRUCTIONS_PER_TRANSACTION: usize = 4;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &MinterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    check_url(&mut errors, "ledger.rpc_url", &config.ledger.rpc_url);
    for url in &config.ledger.failover_urls {
        check_url(&mut errors, "ledger.failover_urls", url);
    }
    if config.ledger.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("ledger.rpc_timeout_secs", "must be > 0"));
    }
    if config.ledger.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "ledger.confirmation_timeout_secs",
            "must be > 0",
        ));
    }
    if config.ledger.confirmation_poll_ms == 0 {
        errors.push(ValidationError::new("ledger.confirmation_poll_ms", "must be > 0"));
    }

    let minting = &config.minting;
    if minting.token_name.trim().is_empty() {
        errors.push(ValidationError::new("minting.token_name", "must not be empty"));
    }
    if minting.token_symbol.trim().is_empty() {
        errors.push(ValidationError::new("minting.token_symbol", "must not be empty"));
    }
    check_url(&mut errors, "minting.metadata_base_url", &minting.metadata_base_url);
    if minting.max_message_chars == 0 {
        errors.push(ValidationError::new("minting.max_message_chars", "must be > 0"));
    }
    if minting.max_total_supply == 0 {
        errors.push(ValidationError::new("minting.max_total_supply", "must be > 0"));
    }
    if minting.max_instructions_per_transaction < MIN_INSTRUCTIONS_PER_TRANSACTION {
        errors.push(ValidationError::new(
            "minting.max_instructions_per_transaction",
            format!("must be >= {}", MIN_INSTRUCTIONS_PER_TRANSACTION),
        ));
    }

    if config.rate_limit.enabled {
        if config.rate_limit.mints_per_hour == 0 {
            errors.push(ValidationError::new("rate_limit.mints_per_hour", "must be > 0"));
        }
        if config.rate_limit.burst_size == 0 {
            errors.push(ValidationError::new("rate_limit.burst_size", "must be > 0"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("'{}': {}", value, e))),
    }
}
