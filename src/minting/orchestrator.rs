//! Token minting orchestration.
//!
//! # Data Flow
//! ```text
//! MintRequest
//!     → DistributionPlan (dedupe, drop invalid, surplus)      [validated]
//!     → creation + open/credit instruction groups             [built]
//!     → batches, submitted one at a time                      [submitted]
//!     → each batch awaited before the next                    [confirmed]
//!     → MintReceipt + registry record
//! ```
//!
//! A validation failure ends in `rejected` without touching the ledger.
//! Any ledger failure ends in `failed`; batches already confirmed stay
//! on-chain and are reported through `MintError::LedgerSubmission`.

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::config::schema::MintingConfig;
use crate::ledger::address::Pubkey;
use crate::ledger::backend::{Ledger, TransactionBatch};
use crate::ledger::transaction::Instruction;
use crate::ledger::types::{ConfirmationStatus, LedgerError, LedgerResult, Signature};
use crate::minting::plan::{pack_batches, DistributionPlan};
use crate::minting::registry::TokenRegistry;
use crate::minting::types::{metadata_uri, MintError, MintReceipt, MintRequest, TokenRecord};
use crate::observability::metrics;

/// Token precision. Message tokens are whole units only.
pub const TOKEN_DECIMALS: u8 = 0;

/// Units credited to each named recipient.
const UNITS_PER_RECIPIENT: u64 = 1;

/// Mints a token type and distributes it in one call.
pub struct MintOrchestrator {
    ledger: Arc<dyn Ledger>,
    registry: Arc<TokenRegistry>,
    settings: MintingConfig,
}

impl MintOrchestrator {
    pub fn new(ledger: Arc<dyn Ledger>, registry: Arc<TokenRegistry>, settings: MintingConfig) -> Self {
        Self {
            ledger,
            registry,
            settings,
        }
    }

    pub fn settings(&self) -> &MintingConfig {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<TokenRegistry> {
        &self.registry
    }

    pub async fn mint_and_distribute(&self, request: MintRequest) -> Result<MintReceipt, MintError> {
        let start = Instant::now();

        let plan = match DistributionPlan::build(
            &request.recipient_addresses,
            &request.minter,
            request.total_supply,
        ) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::info!(minter = %request.minter, error = %e, state = "rejected", "Mint rejected");
                metrics::record_mint("rejected", start);
                return Err(e.into());
            }
        };

        tracing::info!(
            minter = %request.minter,
            total_supply = request.total_supply,
            recipients = plan.recipients.len(),
            surplus = plan.surplus,
            dropped = plan.dropped,
            state = "validated",
            "Distribution planned"
        );

        match self.execute(&request, &plan).await {
            Ok(receipt) => {
                metrics::record_mint("confirmed", start);
                Ok(receipt)
            }
            Err(e) => {
                if let MintError::LedgerSubmission {
                    token_type_id,
                    confirmed_batches,
                    source,
                } = &e
                {
                    tracing::error!(
                        token = ?token_type_id.map(|id| id.to_string()),
                        confirmed_batches,
                        error = %source,
                        state = "failed",
                        "Mint failed"
                    );
                }
                metrics::record_mint("failed", start);
                Err(e)
            }
        }
    }

    async fn execute(&self, request: &MintRequest, plan: &DistributionPlan) -> Result<MintReceipt, MintError> {
        let asset = self
            .ledger
            .create_fungible_asset(TOKEN_DECIMALS)
            .await
            .map_err(|source| MintError::LedgerSubmission {
                token_type_id: None,
                confirmed_batches: 0,
                source,
            })?;
        let token_id = asset.id;

        let fail = |confirmed_batches: usize| {
            move |source: LedgerError| MintError::LedgerSubmission {
                token_type_id: Some(token_id),
                confirmed_batches,
                source,
            }
        };

        let mut groups = vec![asset.instructions];
        groups.extend(
            self.distribution_groups(&token_id, plan, &request.minter)
                .map_err(fail(0))?,
        );
        let batches = pack_batches(groups, self.settings.max_instructions_per_transaction);

        tracing::info!(
            token = %token_id,
            batches = batches.len(),
            state = "built",
            "Mint transactions built"
        );

        let mut mint_signer = Some(asset.signer);
        let mut signatures: Vec<Signature> = Vec::with_capacity(batches.len());

        for (index, instructions) in batches.into_iter().enumerate() {
            let batch = TransactionBatch {
                instructions,
                co_signers: mint_signer.take().into_iter().collect(),
            };

            let signature = self
                .ledger
                .submit_transaction(&batch)
                .await
                .map_err(fail(signatures.len()))?;

            tracing::info!(
                token = %token_id,
                batch = index,
                signature = %signature,
                state = "submitted",
                "Batch submitted"
            );

            self.confirm(&signature).await.map_err(fail(signatures.len()))?;

            tracing::info!(
                token = %token_id,
                batch = index,
                signature = %signature,
                state = "confirmed",
                "Batch confirmed"
            );
            signatures.push(signature);
        }

        let Some(&first) = signatures.first() else {
            return Err(fail(0)(LedgerError::Build("no transactions produced".into())));
        };

        let uri = metadata_uri(&self.settings.metadata_base_url, &token_id);
        let receipt = MintReceipt {
            token_type_id: token_id,
            transaction_id: first,
            transaction_ids: signatures.clone(),
            distributed_count: plan.distributed_count(),
            surplus_count: plan.surplus,
            dropped_count: plan.dropped,
            metadata_uri: uri.clone(),
        };

        self.registry.insert(TokenRecord {
            id: token_id,
            name: self.settings.token_name.clone(),
            symbol: self.settings.token_symbol.clone(),
            message: request.message.to_string(),
            decimals: TOKEN_DECIMALS,
            total_supply: request.total_supply,
            distributed_count: receipt.distributed_count,
            surplus_count: receipt.surplus_count,
            minter: request.minter,
            authority: self.ledger.authority(),
            transaction_ids: signatures,
            metadata_uri: uri,
            created_at: unix_now(),
        });

        tracing::info!(
            token = %token_id,
            distributed = receipt.distributed_count,
            surplus = receipt.surplus_count,
            transactions = receipt.transaction_ids.len(),
            "Token minted and distributed"
        );

        Ok(receipt)
    }

    /// One open/credit pair per recipient, then one for the minter's surplus.
    fn distribution_groups(
        &self,
        token_id: &Pubkey,
        plan: &DistributionPlan,
        minter: &Pubkey,
    ) -> LedgerResult<Vec<Vec<Instruction>>> {
        let credits = plan
            .recipients
            .iter()
            .map(|r| (r, UNITS_PER_RECIPIENT))
            .chain((plan.surplus > 0).then_some((minter, plan.surplus)));

        let mut groups = Vec::with_capacity(plan.recipients.len() + 1);
        for (owner, amount) in credits {
            let account = self.ledger.ensure_holding_account(token_id, owner)?;
            let credit = self.ledger.credit_holding_account(token_id, &account, amount)?;
            groups.push(vec![account.open, credit]);
        }
        Ok(groups)
    }

    async fn confirm(&self, signature: &Signature) -> LedgerResult<()> {
        match self.ledger.await_confirmation(signature).await? {
            ConfirmationStatus::Confirmed { .. } => Ok(()),
            ConfirmationStatus::Failed(reason) => Err(LedgerError::TransactionFailed {
                signature: signature.to_string(),
                reason,
            }),
            other => Err(LedgerError::UnexpectedResponse {
                method: "getSignatureStatuses".to_string(),
                detail: format!("confirmation ended in {:?}", other),
            }),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
