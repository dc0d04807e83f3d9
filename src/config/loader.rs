//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::MinterConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::ledger::types::LedgerError;

/// Environment variable overriding `ledger.rpc_url`.
pub const RPC_URL_ENV_VAR: &str = "SOLANA_RPC_URL";

/// Startup-time configuration errors. Any of these aborts the process
/// before the listener is bound.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// Missing or malformed signing credential.
    #[error("Signing credential error: {0}")]
    Credential(#[source] LedgerError),

    #[error("Ledger client error: {0}")]
    LedgerClient(#[source] LedgerError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MinterConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: MinterConfig = toml::from_str(&content)?;
    finish(config, |key| std::env::var(key).ok())
}

/// Build a configuration from defaults when no file is given.
pub fn load_default() -> Result<MinterConfig, ConfigError> {
    finish(MinterConfig::default(), |key| std::env::var(key).ok())
}

/// Apply environment overrides, then validate.
fn finish<F>(mut config: MinterConfig, env: F) -> Result<MinterConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay values supplied through the environment.
pub fn apply_env_overrides<F>(config: &mut MinterConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(RPC_URL_ENV_VAR).filter(|v| !v.trim().is_empty()) {
        tracing::debug!(rpc_url = %url, "RPC URL overridden from environment");
        config.ledger.rpc_url = url;
    }
}
