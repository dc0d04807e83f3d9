//! Solana implementation of the ledger interface.
//!
//! # Responsibilities
//! - Build SPL Token instructions for the service wallet
//! - Compile, sign and broadcast transactions
//! - Poll signature status until the configured commitment

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::ledger::address::Pubkey;
use crate::ledger::backend::{HoldingAccount, Ledger, NewAsset, TransactionBatch};
use crate::ledger::client::RpcClient;
use crate::ledger::spl_token;
use crate::ledger::transaction::{Instruction, Message, SignedTransaction};
use crate::ledger::types::{
    ConfirmationStatus, LedgerError, LedgerResult, Signature, TokenHolder,
};
use crate::ledger::wallet::{Keypair, Wallet};

/// Ledger backed by a Solana RPC endpoint and the service wallet.
#[derive(Debug, Clone)]
pub struct SolanaLedger {
    client: RpcClient,
    wallet: Arc<Wallet>,
}

impl SolanaLedger {
    pub fn new(client: RpcClient, wallet: Arc<Wallet>) -> Self {
        Self { client, wallet }
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }
}

#[async_trait]
impl Ledger for SolanaLedger {
    fn authority(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    async fn create_fungible_asset(&self, decimals: u8) -> LedgerResult<NewAsset> {
        let lamports = self
            .client
            .get_minimum_balance_for_rent_exemption(spl_token::MINT_SIZE)
            .await?;

        let mint = Keypair::generate();
        let mint_id = mint.pubkey();
        let authority = self.authority();

        let instructions = vec![
            spl_token::create_account(
                &authority,
                &mint_id,
                lamports,
                spl_token::MINT_SIZE,
                &spl_token::TOKEN_PROGRAM_ID,
            ),
            spl_token::initialize_mint2(&mint_id, decimals, &authority, Some(&authority)),
        ];

        tracing::debug!(mint = %mint_id, lamports, decimals, "Mint account prepared");

        Ok(NewAsset {
            id: mint_id,
            signer: mint,
            instructions,
        })
    }

    fn ensure_holding_account(
        &self,
        asset: &Pubkey,
        owner: &Pubkey,
    ) -> LedgerResult<HoldingAccount> {
        let (address, open) =
            spl_token::create_associated_token_account_idempotent(&self.authority(), owner, asset)?;
        Ok(HoldingAccount {
            owner: *owner,
            address,
            open,
        })
    }

    fn credit_holding_account(
        &self,
        asset: &Pubkey,
        account: &HoldingAccount,
        amount: u64,
    ) -> LedgerResult<Instruction> {
        spl_token::mint_to(asset, &account.address, &self.authority(), amount)
    }

    async fn submit_transaction(&self, batch: &TransactionBatch) -> LedgerResult<Signature> {
        if batch.is_empty() {
            return Err(LedgerError::Build("refusing to submit an empty transaction".into()));
        }

        let blockhash = self.client.get_latest_blockhash().await?;
        let message = Message::compile(&batch.instructions, &self.authority(), &blockhash)?;

        let mut signers: Vec<&Keypair> = vec![self.wallet.keypair()];
        signers.extend(batch.co_signers.iter());
        let tx = SignedTransaction::sign(message, &signers)?;
        let wire = tx.to_wire()?;

        let signature = self.client.send_transaction(&wire).await?;
        if signature != tx.id() {
            tracing::warn!(
                expected = %tx.id(),
                reported = %signature,
                "Node reported a different transaction signature"
            );
        }

        tracing::info!(
            signature = %signature,
            instructions = batch.len(),
            bytes = wire.len(),
            "Transaction submitted"
        );

        Ok(signature)
    }

    async fn await_confirmation(&self, signature: &Signature) -> LedgerResult<ConfirmationStatus> {
        let config = self.client.config();
        let required = config.commitment;
        let timeout_secs = config.confirmation_timeout_secs;
        let poll_interval = Duration::from_millis(config.confirmation_poll_ms.max(1));

        let result = timeout(Duration::from_secs(timeout_secs), async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                let status = match self.client.get_signature_status(signature).await? {
                    Some(s) => s,
                    None => {
                        tracing::debug!(signature = %signature, "Transaction pending");
                        continue;
                    }
                };

                if let Some(err) = status.err {
                    return Ok(ConfirmationStatus::Failed(err.to_string()));
                }

                match status.confirmation_status {
                    Some(reached) if required.is_satisfied_by(reached) => {
                        return Ok(ConfirmationStatus::Confirmed { slot: status.slot });
                    }
                    reached => {
                        tracing::debug!(
                            signature = %signature,
                            reached = ?reached,
                            required = required.as_str(),
                            "Waiting for commitment"
                        );
                    }
                }
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(LedgerError::ConfirmationTimeout {
                signature: signature.to_string(),
                timeout_secs,
            }),
        }
    }

    async fn balance(&self, owner: &Pubkey) -> LedgerResult<u64> {
        self.client.get_balance(owner).await
    }

    async fn token_balance(&self, owner: &Pubkey, asset: &Pubkey) -> LedgerResult<u64> {
        self.client.get_token_balance(owner, asset).await
    }

    async fn token_holders(&self, asset: &Pubkey) -> LedgerResult<Vec<TokenHolder>> {
        self.client.get_token_holders(asset).await
    }

    async fn is_healthy(&self) -> bool {
        self.client.is_healthy().await
    }
}
