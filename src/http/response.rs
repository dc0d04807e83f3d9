//! Error responses.
//!
//! # Responsibilities
//! - Map domain errors to HTTP status codes
//! - Render every error as `{ "error": "..." }`
//!
//! # Design Decisions
//! - Ledger failures map to 502 Bad Gateway with the node's message
//! - A failed mint also names the token it created and how many batches
//!   were confirmed, since those stay on-chain
//! - Request timeouts (408) come from the timeout layer and are rewritten
//!   into the same JSON shape by [`render_timeout`]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::address::Pubkey;
use crate::ledger::types::LedgerError;
use crate::minting::types::{MintError, ValidationError};

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    /// Token created before a mint failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type_id: Option<String>,
    /// Batches confirmed on-chain before a mint failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_batches: Option<usize>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            token_type_id: None,
            confirmed_batches: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Request timed out")]
    Timeout,

    #[error("{0}")]
    Ledger(String),

    #[error("{message}")]
    MintFailed {
        message: String,
        token_type_id: Option<Pubkey>,
        confirmed_batches: usize,
    },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Ledger(_) | ApiError::MintFailed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MintError> for ApiError {
    fn from(err: MintError) -> Self {
        let message = err.to_string();
        match err {
            MintError::Validation(e) => ApiError::Validation(e),
            MintError::LedgerSubmission {
                token_type_id,
                confirmed_batches,
                ..
            } => ApiError::MintFailed {
                message,
                token_type_id,
                confirmed_batches,
            },
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidAddress(msg) => ApiError::BadRequest(format!("Invalid address: {}", msg)),
            other => ApiError::Ledger(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self, "Request failed");
        }
        let mut body = ErrorBody::new(self.to_string());
        if let ApiError::MintFailed {
            token_type_id,
            confirmed_batches,
            ..
        } = self
        {
            body.token_type_id = token_type_id.map(|id| id.to_string());
            body.confirmed_batches = Some(confirmed_batches);
        }
        (status, Json(body)).into_response()
    }
}

/// Give the timeout layer's bare 408 the standard error body.
pub async fn render_timeout(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        ApiError::Timeout.into_response()
    } else {
        response
    }
}
