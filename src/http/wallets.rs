//! Wallet endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::ledger::address::Pubkey;
use crate::ledger::types::LAMPORTS_PER_SOL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressValidation {
    pub address: String,
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBalance {
    pub address: String,
    pub lamports: u64,
    pub sol: f64,
}

pub async fn validate_wallet(Path(address): Path<String>) -> Json<AddressValidation> {
    let valid = Pubkey::is_valid(&address);
    Json(AddressValidation { address, valid })
}

pub async fn wallet_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<WalletBalance>, ApiError> {
    let owner: Pubkey = address.parse()?;
    let lamports = state.ledger.balance(&owner).await?;
    Ok(Json(WalletBalance {
        address: owner.to_string(),
        lamports,
        sol: lamports as f64 / LAMPORTS_PER_SOL as f64,
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalance {
    pub address: String,
    pub mint: String,
    pub balance: u64,
}

/// Units of one token held by a wallet. Zero when it has no account for it.
pub async fn wallet_token_balance(
    State(state): State<AppState>,
    Path((address, mint)): Path<(String, String)>,
) -> Result<Json<TokenBalance>, ApiError> {
    let owner: Pubkey = address.parse()?;
    let mint: Pubkey = mint.parse()?;
    let balance = state.ledger.token_balance(&owner, &mint).await?;
    Ok(Json(TokenBalance {
        address: owner.to_string(),
        mint: mint.to_string(),
        balance,
    }))
}
