//! Typed HTTP client for the Flutterbye minter API.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    pub message: String,
    pub total_supply: u64,
    pub recipient_addresses: Vec<String>,
    pub minter_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub token_type_id: String,
    pub transaction_id: String,
    pub transaction_ids: Vec<String>,
    pub distributed_count: u64,
    pub surplus_count: u64,
    pub dropped_count: usize,
    pub metadata_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub message: String,
    pub decimals: u8,
    pub total_supply: u64,
    pub distributed_count: u64,
    pub surplus_count: u64,
    pub minter: String,
    pub authority: String,
    pub transaction_ids: Vec<String>,
    pub metadata_uri: String,
    pub created_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenHolder {
    pub address: String,
    pub owner: String,
    pub balance: u64,
}

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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalance {
    pub address: String,
    pub mint: String,
    pub balance: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub ledger: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(default)]
    token_type_id: Option<String>,
    #[serde(default)]
    confirmed_batches: Option<usize>,
}

/// Errors returned by [`MinterClient`].
#[derive(Debug)]
pub enum SdkError {
    /// Transport or decoding failure.
    Http(reqwest::Error),
    /// The minter answered with a non-success status. A failed mint also
    /// names the token it created and how many batches were confirmed.
    Api {
        status: StatusCode,
        message: String,
        token_type_id: Option<String>,
        confirmed_batches: Option<usize>,
    },
}

impl std::fmt::Display for SdkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SdkError::Http(e) => write!(f, "HTTP error: {}", e),
            SdkError::Api { status, message, .. } => {
                write!(f, "Minter returned error status {}: {}", status, message)
            }
        }
    }
}

impl std::error::Error for SdkError {}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        SdkError::Http(e)
    }
}

impl SdkError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SdkError::Api { status, .. } => Some(*status),
            SdkError::Http(e) => e.status(),
        }
    }

    /// Token left behind by a mint that failed after creating it.
    pub fn token_type_id(&self) -> Option<&str> {
        match self {
            SdkError::Api { token_type_id, .. } => token_type_id.as_deref(),
            SdkError::Http(_) => None,
        }
    }
}

pub struct MinterClient {
    client: Client,
    base_url: String,
}

impl MinterClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Mint a token and distribute it.
    pub async fn create_token(&self, req: &CreateTokenRequest) -> Result<MintReceipt, SdkError> {
        let resp = self
            .client
            .post(format!("{}/tokens", self.base_url))
            .json(req)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn token(&self, id: &str) -> Result<TokenRecord, SdkError> {
        self.get(&format!("/tokens/{}", id)).await
    }

    pub async fn token_metadata(&self, id: &str) -> Result<serde_json::Value, SdkError> {
        self.get(&format!("/tokens/{}/metadata", id)).await
    }

    pub async fn token_holders(&self, id: &str) -> Result<Vec<TokenHolder>, SdkError> {
        self.get(&format!("/tokens/{}/holders", id)).await
    }

    pub async fn validate_wallet(&self, address: &str) -> Result<AddressValidation, SdkError> {
        self.get(&format!("/wallets/{}/validate", address)).await
    }

    pub async fn wallet_balance(&self, address: &str) -> Result<WalletBalance, SdkError> {
        self.get(&format!("/wallets/{}/balance", address)).await
    }

    /// Units of `mint` held by the wallet at `address`.
    pub async fn token_balance(&self, address: &str, mint: &str) -> Result<TokenBalance, SdkError> {
        self.get(&format!("/wallets/{}/tokens/{}", address, mint)).await
    }

    /// Service health. A degraded service (503) still returns its status body.
    pub async fn health(&self) -> Result<HealthStatus, SdkError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        if resp.status() == StatusCode::SERVICE_UNAVAILABLE {
            return Ok(resp.json().await?);
        }
        decode(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SdkError> {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, SdkError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await?;
    let err = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => SdkError::Api {
            status,
            message: body.error,
            token_type_id: body.token_type_id,
            confirmed_batches: body.confirmed_batches,
        },
        Err(_) => SdkError::Api {
            status,
            message: text,
            token_type_id: None,
            confirmed_batches: None,
        },
    };
    Err(err)
}
