//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{routing::post, Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use flutterbye_minter::config::MinterConfig;
use flutterbye_minter::http::HttpServer;
use flutterbye_minter::ledger::backend::{HoldingAccount, Ledger, NewAsset, TransactionBatch};
use flutterbye_minter::ledger::spl_token;
use flutterbye_minter::ledger::transaction::Instruction;
use flutterbye_minter::ledger::types::{
    ConfirmationStatus, LedgerError, LedgerResult, Signature, TokenHolder,
};
use flutterbye_minter::ledger::{Keypair, Pubkey};
use flutterbye_minter::lifecycle::{build_state, Shutdown};

/// Deterministic wallet address for tests.
pub fn wallet(n: u8) -> Pubkey {
    Pubkey([n; 32])
}

pub fn address(n: u8) -> String {
    wallet(n).to_string()
}

/// One submitted batch as seen by the mock.
#[derive(Debug, Clone)]
pub struct SubmittedBatch {
    pub instructions: Vec<Instruction>,
    pub co_signers: Vec<Pubkey>,
}

#[derive(Debug, Default)]
pub struct Calls {
    pub assets_created: Vec<Pubkey>,
    pub accounts_opened: Vec<Pubkey>,
    /// (owner, amount) per credit.
    pub credits: Vec<(Pubkey, u64)>,
    pub submitted: Vec<SubmittedBatch>,
    pub confirmations: usize,
}

impl Calls {
    pub fn ledger_invocations(&self) -> usize {
        self.assets_created.len()
            + self.accounts_opened.len()
            + self.credits.len()
            + self.submitted.len()
            + self.confirmations
    }
}

/// Recording ledger. Builds real SPL instructions but never touches a network.
pub struct MockLedger {
    authority: Keypair,
    calls: Mutex<Calls>,
    next_signature: AtomicU8,
    fail_submission_at: Option<usize>,
    fail_confirmation_at: Option<usize>,
    healthy: bool,
    holders: Vec<TokenHolder>,
    delay: Option<Duration>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            authority: Keypair::from_seed(&[42; 32]),
            calls: Mutex::new(Calls::default()),
            next_signature: AtomicU8::new(1),
            fail_submission_at: None,
            fail_confirmation_at: None,
            healthy: true,
            holders: Vec::new(),
            delay: None,
        }
    }

    /// Reject the `index`-th submission (0-based) with a node error.
    pub fn failing_submission(mut self, index: usize) -> Self {
        self.fail_submission_at = Some(index);
        self
    }

    /// Report the `index`-th confirmation (0-based) as failed on-chain.
    pub fn failing_confirmation(mut self, index: usize) -> Self {
        self.fail_confirmation_at = Some(index);
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn with_holders(mut self, holders: Vec<TokenHolder>) -> Self {
        self.holders = holders;
        self
    }

    /// Stall every confirmation and balance query by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn stall(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Ledger for MockLedger {
    fn authority(&self) -> Pubkey {
        self.authority.pubkey()
    }

    async fn create_fungible_asset(&self, decimals: u8) -> LedgerResult<NewAsset> {
        let mint = Keypair::generate();
        let id = mint.pubkey();
        let authority = self.authority();
        self.calls().assets_created.push(id);
        Ok(NewAsset {
            id,
            signer: mint,
            instructions: vec![
                spl_token::create_account(
                    &authority,
                    &id,
                    1_461_600,
                    spl_token::MINT_SIZE,
                    &spl_token::TOKEN_PROGRAM_ID,
                ),
                spl_token::initialize_mint2(&id, decimals, &authority, Some(&authority)),
            ],
        })
    }

    fn ensure_holding_account(&self, asset: &Pubkey, owner: &Pubkey) -> LedgerResult<HoldingAccount> {
        self.calls().accounts_opened.push(*owner);
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
        self.calls().credits.push((account.owner, amount));
        spl_token::mint_to(asset, &account.address, &self.authority(), amount)
    }

    async fn submit_transaction(&self, batch: &TransactionBatch) -> LedgerResult<Signature> {
        let mut calls = self.calls();
        let index = calls.submitted.len();
        calls.submitted.push(SubmittedBatch {
            instructions: batch.instructions.clone(),
            co_signers: batch.co_signers.iter().map(Keypair::pubkey).collect(),
        });
        if self.fail_submission_at == Some(index) {
            return Err(LedgerError::Node {
                method: "sendTransaction".to_string(),
                code: -32002,
                message: "Transaction simulation failed: insufficient funds".to_string(),
            });
        }
        let n = self.next_signature.fetch_add(1, Ordering::SeqCst);
        Ok(Signature([n; 64]))
    }

    async fn await_confirmation(&self, _signature: &Signature) -> LedgerResult<ConfirmationStatus> {
        self.stall().await;
        let mut calls = self.calls();
        let index = calls.confirmations;
        calls.confirmations += 1;
        if self.fail_confirmation_at == Some(index) {
            return Ok(ConfirmationStatus::Failed("InstructionError".to_string()));
        }
        Ok(ConfirmationStatus::Confirmed { slot: 100 + index as u64 })
    }

    async fn balance(&self, _owner: &Pubkey) -> LedgerResult<u64> {
        self.stall().await;
        Ok(1_500_000_000)
    }

    async fn token_balance(&self, owner: &Pubkey, _asset: &Pubkey) -> LedgerResult<u64> {
        let calls = self.calls();
        Ok(calls
            .credits
            .iter()
            .filter(|(credited, _)| credited == owner)
            .map(|(_, amount)| amount)
            .sum())
    }

    async fn token_holders(&self, _asset: &Pubkey) -> LedgerResult<Vec<TokenHolder>> {
        Ok(self.holders.clone())
    }

    async fn is_healthy(&self) -> bool {
        self.healthy
    }
}

/// Config suitable for in-process servers.
pub fn test_config() -> MinterConfig {
    let mut config = MinterConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.observability.metrics_enabled = false;
    config.rate_limit.enabled = false;
    config
}

/// Spawn the HTTP API on an ephemeral port. Returns its base URL.
pub async fn spawn_server(config: MinterConfig, ledger: Arc<dyn Ledger>) -> (String, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = build_state(&config, ledger);
    let server = HttpServer::new(config, state);
    let shutdown = Shutdown::new();
    let wait = shutdown.wait();

    tokio::spawn(async move {
        server.run(listener, wait).await.unwrap();
    });

    (format!("http://{}", addr), shutdown)
}

/// Start a programmable JSON-RPC node. `f` maps (method, params) to either a
/// result or an error object.
pub async fn start_mock_rpc<F>(f: F) -> SocketAddr
where
    F: Fn(&str, &Value) -> Result<Value, Value> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    let app = Router::new().route(
        "/",
        post(move |Json(req): Json<Value>| {
            let f = f.clone();
            async move {
                let method = req["method"].as_str().unwrap_or_default().to_string();
                let body = match f(&method, &req["params"]) {
                    Ok(result) => serde_json::json!({ "jsonrpc": "2.0", "id": req["id"], "result": result }),
                    Err(error) => serde_json::json!({ "jsonrpc": "2.0", "id": req["id"], "error": error }),
                };
                Json(body)
            }
        }),
    );

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Signature a node would report for a base58 wire transaction: its first
/// signature.
pub fn wire_signature(encoded: &str) -> String {
    let wire = bs58::decode(encoded).into_vec().unwrap();
    // Signature count is a compact-u16; batches here carry fewer than 128.
    assert!(wire[0] > 0 && wire[0] < 0x80);
    bs58::encode(&wire[1..65]).into_string()
}
