//! Ledger JSON-RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Speak JSON-RPC 2.0 to the primary endpoint, then the failovers
//! - Enforce a per-call timeout
//! - Decode the handful of methods minting needs
//! - Provide health check for ledger connectivity

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::ledger::address::Pubkey;
use crate::ledger::spl_token::{TOKEN_ACCOUNT_SIZE, TOKEN_PROGRAM_ID};
use crate::ledger::types::{
    Commitment, LedgerConfig, LedgerError, LedgerResult, Signature, TokenHolder,
};
use crate::observability::metrics;

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
}

/// Status of a submitted signature as reported by `getSignatureStatuses`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    pub confirmations: Option<u64>,
    pub err: Option<Value>,
    pub confirmation_status: Option<Commitment>,
}

#[derive(Debug, Deserialize)]
struct KeyedAccount {
    pubkey: String,
    account: ParsedAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedAccount {
    data: ParsedData,
}

#[derive(Debug, Deserialize)]
struct ParsedData {
    parsed: ParsedTokenAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedTokenAccount {
    info: TokenAccountInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAccountInfo {
    owner: String,
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
struct TokenAmount {
    amount: String,
}

/// Ledger RPC client with failover support.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    /// Primary endpoint first, then failovers.
    endpoints: Vec<url::Url>,
    config: LedgerConfig,
    timeout_duration: Duration,
    request_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Create a new RPC client.
    ///
    /// The primary URL must parse; unparsable failover URLs are skipped with
    /// a warning.
    pub fn new(config: LedgerConfig) -> LedgerResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);

        let primary: url::Url = config.rpc_url.parse().map_err(|e| {
            LedgerError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let mut endpoints = vec![primary];

        for url_str in &config.failover_urls {
            match url_str.parse() {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| LedgerError::Rpc(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = endpoints.len() - 1,
            commitment = config.commitment.as_str(),
            "Ledger RPC client initialized"
        );

        Ok(Self {
            http,
            endpoints,
            config,
            timeout_duration,
            request_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Issue one JSON-RPC call, trying each endpoint in turn.
    ///
    /// Transport failures and timeouts move on to the next endpoint. A
    /// JSON-RPC error object is an answer from the node and is returned
    /// without failover.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> LedgerResult<T> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            let fut = async {
                self.http
                    .post(endpoint.clone())
                    .json(&body)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<RpcResponse<T>>()
                    .await
            };

            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(response)) => {
                    if let Some(err) = response.error {
                        metrics::record_rpc_call(method, "node_error");
                        return Err(LedgerError::Node {
                            method: method.to_string(),
                            code: err.code,
                            message: err.message,
                        });
                    }
                    return match response.result {
                        Some(result) => {
                            metrics::record_rpc_call(method, "ok");
                            Ok(result)
                        }
                        None => {
                            metrics::record_rpc_call(method, "malformed");
                            Err(LedgerError::UnexpectedResponse {
                                method: method.to_string(),
                                detail: "neither result nor error present".to_string(),
                            })
                        }
                    };
                }
                Ok(Err(e)) => {
                    metrics::record_rpc_call(method, "transport_error");
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next endpoint");
                }
                Err(_) => {
                    metrics::record_rpc_call(method, "timeout");
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next endpoint");
                }
            }
        }

        Err(LedgerError::Rpc(format!("All RPC endpoints failed for {}", method)))
    }

    fn commitment_config(&self) -> Value {
        json!({ "commitment": self.config.commitment.as_str() })
    }

    /// Latest blockhash at the configured commitment.
    pub async fn get_latest_blockhash(&self) -> LedgerResult<[u8; 32]> {
        let result: WithContext<BlockhashValue> = self
            .call("getLatestBlockhash", json!([self.commitment_config()]))
            .await?;

        let bytes = bs58::decode(&result.value.blockhash)
            .into_vec()
            .map_err(|e| LedgerError::UnexpectedResponse {
                method: "getLatestBlockhash".to_string(),
                detail: format!("blockhash is not base58: {}", e),
            })?;

        bytes.try_into().map_err(|v: Vec<u8>| LedgerError::UnexpectedResponse {
            method: "getLatestBlockhash".to_string(),
            detail: format!("blockhash has {} bytes", v.len()),
        })
    }

    /// Lamports required for an account of `data_len` bytes to be rent exempt.
    pub async fn get_minimum_balance_for_rent_exemption(&self, data_len: u64) -> LedgerResult<u64> {
        self.call("getMinimumBalanceForRentExemption", json!([data_len]))
            .await
    }

    /// Submit a signed wire-format transaction. Returns the signature the
    /// node reports.
    pub async fn send_transaction(&self, wire: &[u8]) -> LedgerResult<Signature> {
        let encoded = bs58::encode(wire).into_string();
        let signature: String = self
            .call(
                "sendTransaction",
                json!([
                    encoded,
                    {
                        "encoding": "base58",
                        "skipPreflight": self.config.skip_preflight,
                        "preflightCommitment": self.config.commitment.as_str(),
                    }
                ]),
            )
            .await?;

        signature.parse()
    }

    /// Current status of one signature, or `None` if the node has not seen it.
    pub async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> LedgerResult<Option<SignatureStatus>> {
        let result: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature.to_string()], { "searchTransactionHistory": false }]),
            )
            .await?;

        Ok(result.value.into_iter().next().flatten())
    }

    /// Native balance in lamports.
    pub async fn get_balance(&self, address: &Pubkey) -> LedgerResult<u64> {
        let result: WithContext<u64> = self
            .call(
                "getBalance",
                json!([address.to_string(), self.commitment_config()]),
            )
            .await?;
        Ok(result.value)
    }

    /// Token accounts of `mint` with a positive balance.
    pub async fn get_token_holders(&self, mint: &Pubkey) -> LedgerResult<Vec<TokenHolder>> {
        let accounts: Vec<KeyedAccount> = self
            .call(
                "getProgramAccounts",
                json!([
                    TOKEN_PROGRAM_ID.to_string(),
                    {
                        "encoding": "jsonParsed",
                        "commitment": self.config.commitment.as_str(),
                        "filters": [
                            { "dataSize": TOKEN_ACCOUNT_SIZE },
                            { "memcmp": { "offset": 0, "bytes": mint.to_string() } }
                        ]
                    }
                ]),
            )
            .await?;

        let mut holders = Vec::with_capacity(accounts.len());
        for keyed in accounts {
            let info = keyed.account.data.parsed.info;
            let balance = parse_amount("getProgramAccounts", &info.token_amount)?;
            if balance > 0 {
                holders.push(TokenHolder {
                    address: keyed.pubkey,
                    owner: info.owner,
                    balance,
                });
            }
        }

        Ok(holders)
    }

    /// Units of `mint` held by `owner` across all of its token accounts.
    /// An owner with no account for the mint holds zero.
    pub async fn get_token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> LedgerResult<u64> {
        let result: WithContext<Vec<KeyedAccount>> = self
            .call(
                "getTokenAccountsByOwner",
                json!([
                    owner.to_string(),
                    { "mint": mint.to_string() },
                    { "encoding": "jsonParsed", "commitment": self.config.commitment.as_str() }
                ]),
            )
            .await?;

        result.value.iter().try_fold(0u64, |total, keyed| {
            let amount = parse_amount(
                "getTokenAccountsByOwner",
                &keyed.account.data.parsed.info.token_amount,
            )?;
            total
                .checked_add(amount)
                .ok_or_else(|| LedgerError::UnexpectedResponse {
                    method: "getTokenAccountsByOwner".to_string(),
                    detail: "token balance overflows u64".to_string(),
                })
        })
    }

    /// Check if the ledger node is reachable and healthy.
    pub async fn is_healthy(&self) -> bool {
        let healthy = matches!(
            self.call::<String>("getHealth", json!([])).await.as_deref(),
            Ok("ok")
        );
        metrics::record_ledger_health(healthy);
        healthy
    }

    /// Get the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }
}

fn parse_amount(method: &str, amount: &TokenAmount) -> LedgerResult<u64> {
    amount
        .amount
        .parse()
        .map_err(|_| LedgerError::UnexpectedResponse {
            method: method.to_string(),
            detail: format!("token amount '{}' is not an integer", amount.amount),
        })
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("endpoints", &self.endpoints.len())
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
