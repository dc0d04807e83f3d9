//! Distribution planning and transaction batching.

use std::collections::HashSet;

use crate::ledger::address::Pubkey;
use crate::ledger::transaction::Instruction;
use crate::minting::types::ValidationError;

/// Who receives what for one mint: one unit per recipient, the surplus to
/// the minter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionPlan {
    /// Distinct valid recipients, first-seen order, minter excluded.
    pub recipients: Vec<Pubkey>,
    pub surplus: u64,
    /// Candidates dropped because they did not parse as addresses.
    pub dropped: usize,
}

impl DistributionPlan {
    pub fn build(
        candidates: &[String],
        minter: &Pubkey,
        total_supply: u64,
    ) -> Result<Self, ValidationError> {
        let mut seen = HashSet::new();
        let mut recipients = Vec::new();
        let mut dropped = 0;

        for candidate in candidates {
            let Ok(address) = candidate.trim().parse::<Pubkey>() else {
                dropped += 1;
                continue;
            };
            if address == *minter || !seen.insert(address) {
                continue;
            }
            recipients.push(address);
        }

        let distributed = recipients.len() as u64;
        let surplus = total_supply.checked_sub(distributed).ok_or(
            ValidationError::InsufficientSupply {
                total_supply,
                recipients: distributed,
            },
        )?;

        if distributed == 0 && surplus == 0 {
            return Err(ValidationError::NothingToMint);
        }

        Ok(Self {
            recipients,
            surplus,
            dropped,
        })
    }

    pub fn distributed_count(&self) -> u64 {
        self.recipients.len() as u64
    }
}

/// Pack instruction groups into transactions of at most `max_per_transaction`
/// instructions. Groups are never split and keep their order. A group larger
/// than the cap travels alone.
pub fn pack_batches(groups: Vec<Vec<Instruction>>, max_per_transaction: usize) -> Vec<Vec<Instruction>> {
    let mut batches: Vec<Vec<Instruction>> = Vec::new();
    let mut current: Vec<Instruction> = Vec::new();

    for group in groups {
        if !current.is_empty() && current.len() + group.len() > max_per_transaction {
            batches.push(std::mem::take(&mut current));
        }
        current.extend(group);
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
