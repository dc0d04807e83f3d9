//! Token endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::ledger::address::Pubkey;
use crate::ledger::types::TokenHolder;
use crate::minting::metadata::TokenMetadata;
use crate::minting::types::{MintReceipt, MintRequest, TokenRecord};

/// Body of `POST /tokens`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTokenBody {
    pub message: String,
    pub total_supply: u64,
    #[serde(default)]
    pub recipient_addresses: Vec<String>,
    pub minter_address: String,
}

pub async fn create_token(
    State(state): State<AppState>,
    payload: Result<Json<CreateTokenBody>, JsonRejection>,
) -> Result<(StatusCode, Json<MintReceipt>), ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let request = MintRequest::new(
        &body.message,
        body.total_supply,
        body.recipient_addresses,
        &body.minter_address,
        state.orchestrator.settings(),
    )?;

    // Detached so a dropped connection cannot stop distribution between batches.
    let orchestrator = state.orchestrator.clone();
    let receipt = tokio::spawn(async move { orchestrator.mint_and_distribute(request).await })
        .await
        .map_err(|e| ApiError::Internal(format!("mint task failed: {}", e)))??;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn get_token(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TokenRecord>, ApiError> {
    lookup(&state, &id).map(Json)
}

pub async fn get_token_metadata(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = lookup(&state, &id)?;
    Ok(Json(TokenMetadata::for_record(
        &record,
        state.orchestrator.settings(),
    )))
}

pub async fn get_token_holders(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TokenHolder>>, ApiError> {
    let mint: Pubkey = id.parse()?;
    let holders = state.ledger.token_holders(&mint).await?;
    Ok(Json(holders))
}

fn lookup(state: &AppState, id: &str) -> Result<TokenRecord, ApiError> {
    let not_found = || ApiError::NotFound(format!("Token {} not found", id));
    let id: Pubkey = id.parse().map_err(|_| not_found())?;
    state.orchestrator.registry().get(&id).ok_or_else(not_found)
}
