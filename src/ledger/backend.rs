//! The outbound ledger interface used by the minting flow.
//!
//! Building operations (`create_fungible_asset`, `ensure_holding_account`,
//! `credit_holding_account`) produces instructions without touching the
//! network, except where the ledger must be asked for a value such as the
//! rent-exempt balance. `submit_transaction` and `await_confirmation` are
//! the network suspension points.

use async_trait::async_trait;

use crate::ledger::address::Pubkey;
use crate::ledger::transaction::Instruction;
use crate::ledger::types::{ConfirmationStatus, LedgerResult, Signature, TokenHolder};
use crate::ledger::wallet::Keypair;

/// A newly registered fungible asset.
#[derive(Debug)]
pub struct NewAsset {
    /// Asset identifier (the mint address).
    pub id: Pubkey,
    /// Key of the asset account; must co-sign the creating transaction.
    pub signer: Keypair,
    /// Instructions that create and initialize the asset, in order.
    pub instructions: Vec<Instruction>,
}

/// A holding account for one owner and one asset.
#[derive(Debug, Clone)]
pub struct HoldingAccount {
    pub owner: Pubkey,
    pub address: Pubkey,
    /// Opens the account; a no-op on-chain if it is already open.
    pub open: Instruction,
}

/// Instructions submitted together as one atomic transaction.
#[derive(Debug, Default)]
pub struct TransactionBatch {
    pub instructions: Vec<Instruction>,
    /// Signers besides the service wallet.
    pub co_signers: Vec<Keypair>,
}

impl TransactionBatch {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Ledger operations needed to mint and distribute a token.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Address of the service wallet: fee payer and mint authority.
    fn authority(&self) -> Pubkey;

    /// Register a new fungible asset with `decimals` precision.
    async fn create_fungible_asset(&self, decimals: u8) -> LedgerResult<NewAsset>;

    /// Resolve the holding account of `owner` for `asset`.
    fn ensure_holding_account(&self, asset: &Pubkey, owner: &Pubkey)
        -> LedgerResult<HoldingAccount>;

    /// Credit `amount` units of `asset` to `account`.
    fn credit_holding_account(
        &self,
        asset: &Pubkey,
        account: &HoldingAccount,
        amount: u64,
    ) -> LedgerResult<Instruction>;

    /// Sign and submit one batch. Returns the transaction signature.
    async fn submit_transaction(&self, batch: &TransactionBatch) -> LedgerResult<Signature>;

    /// Wait until the transaction reaches the configured commitment or fails.
    async fn await_confirmation(&self, signature: &Signature) -> LedgerResult<ConfirmationStatus>;

    /// Native balance of `owner` in lamports.
    async fn balance(&self, owner: &Pubkey) -> LedgerResult<u64>;

    /// Units of `asset` held by `owner`.
    async fn token_balance(&self, owner: &Pubkey, asset: &Pubkey) -> LedgerResult<u64>;

    /// Holders of `asset` with a positive balance.
    async fn token_holders(&self, asset: &Pubkey) -> LedgerResult<Vec<TokenHolder>>;

    /// Whether the ledger endpoint is reachable.
    async fn is_healthy(&self) -> bool;
}
