//! Signing credentials.
//!
//! # Security
//! - The service key is loaded ONLY from an environment variable
//! - Keys are never logged or serialized
//! - Decoded key material is zeroized once the signing key is built

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroize;

use crate::ledger::address::Pubkey;
use crate::ledger::types::{LedgerError, LedgerResult};

/// Environment variable name for the service signing key.
pub const PRIVATE_KEY_ENV_VAR: &str = "SOLANA_PRIVATE_KEY";

/// An Ed25519 keypair. The secret half is zeroized on drop.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Build from the 64-byte `seed || public key` layout used by Solana
    /// keypair files. Fails if the public half does not match the seed.
    pub fn from_keypair_bytes(bytes: &[u8; 64]) -> LedgerResult<Self> {
        let signing_key = SigningKey::from_keypair_bytes(bytes)
            .map_err(|e| LedgerError::Wallet(format!("Keypair bytes are inconsistent: {}", e)))?;
        Ok(Self { signing_key })
    }

    /// The public key (ledger address) of this keypair.
    pub fn pubkey(&self) -> Pubkey {
        Pubkey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a serialized transaction message.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

/// The service wallet: pays fees and holds mint authority over every token
/// it creates. Loaded once at startup and shared read-only.
#[derive(Clone)]
pub struct Wallet {
    keypair: Keypair,
}

impl Wallet {
    /// Create a wallet from an encoded secret key.
    ///
    /// Accepts base58 of either the 64-byte keypair or the 32-byte seed, or
    /// the JSON byte-array format written by `solana-keygen`.
    ///
    /// # Security
    /// The key is parsed and stored securely. It is never logged.
    pub fn from_secret(encoded: &str) -> LedgerResult<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(LedgerError::Wallet("Secret key is empty".to_string()));
        }

        let mut bytes = if encoded.starts_with('[') {
            serde_json::from_str::<Vec<u8>>(encoded)
                .map_err(|e| LedgerError::Wallet(format!("Invalid key byte array: {}", e)))?
        } else {
            bs58::decode(encoded)
                .into_vec()
                .map_err(|e| LedgerError::Wallet(format!("Invalid base58 secret key: {}", e)))?
        };

        let keypair = match bytes.len() {
            64 => {
                let mut arr = [0u8; 64];
                arr.copy_from_slice(&bytes);
                let result = Keypair::from_keypair_bytes(&arr);
                arr.zeroize();
                result
            }
            32 => {
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                let keypair = Keypair::from_seed(&arr);
                arr.zeroize();
                Ok(keypair)
            }
            n => Err(LedgerError::Wallet(format!(
                "Secret key must decode to 32 or 64 bytes, got {}",
                n
            ))),
        };
        bytes.zeroize();
        let keypair = keypair?;

        tracing::info!(address = %keypair.pubkey(), "Wallet initialized");

        Ok(Self { keypair })
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `SOLANA_PRIVATE_KEY` from environment.
    pub fn from_env() -> LedgerResult<Self> {
        let secret = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            LedgerError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_secret(&secret)
    }

    /// Wrap an existing keypair.
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Get the wallet's address.
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Borrow the underlying keypair for transaction signing.
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.pubkey())
            .finish_non_exhaustive()
    }
}
