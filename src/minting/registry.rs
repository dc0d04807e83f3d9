//! In-process record of tokens minted by this service.

use dashmap::DashMap;

use crate::ledger::address::Pubkey;
use crate::minting::types::TokenRecord;

/// Tokens minted since startup, keyed by token type id. Not persisted.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    inner: DashMap<Pubkey, TokenRecord>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: TokenRecord) {
        tracing::debug!(token = %record.id, "Token recorded");
        self.inner.insert(record.id, record);
    }

    pub fn get(&self, id: &Pubkey) -> Option<TokenRecord> {
        self.inner.get(id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
