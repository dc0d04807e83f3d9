//! SolanaLedger against a programmable JSON-RPC node.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use flutterbye_minter::config::{LedgerConfig, MintingConfig};
use flutterbye_minter::ledger::types::LedgerError;
use flutterbye_minter::ledger::{Keypair, Ledger, Pubkey, RpcClient, SolanaLedger, Wallet};
use flutterbye_minter::minting::{MintError, MintOrchestrator, MintRequest, TokenRegistry};

mod common;
use common::{address, start_mock_rpc, wire_signature};

fn blockhash() -> String {
    bs58::encode([7u8; 32]).into_string()
}

fn confirmed(status: &str) -> Value {
    json!({
        "context": { "slot": 50 },
        "value": [{ "slot": 49, "confirmations": null, "err": null, "confirmationStatus": status }]
    })
}

/// A node that accepts and confirms everything, recording each method call.
fn happy_node(
    log: Arc<Mutex<Vec<(String, Value)>>>,
) -> impl Fn(&str, &Value) -> Result<Value, Value> + Send + Sync + 'static {
    move |method, params| {
        log.lock().unwrap().push((method.to_string(), params.clone()));
        match method {
            "getHealth" => Ok(json!("ok")),
            "getMinimumBalanceForRentExemption" => Ok(json!(1_461_600)),
            "getLatestBlockhash" => Ok(json!({
                "context": { "slot": 50 },
                "value": { "blockhash": blockhash(), "lastValidBlockHeight": 150 }
            })),
            "sendTransaction" => Ok(json!(wire_signature(params[0].as_str().unwrap()))),
            "getSignatureStatuses" => Ok(confirmed("finalized")),
            "getBalance" => Ok(json!({ "context": { "slot": 50 }, "value": 2_000_000_000u64 })),
            _ => Err(json!({ "code": -32601, "message": "Method not found" })),
        }
    }
}

fn ledger_config(url: String) -> LedgerConfig {
    LedgerConfig {
        rpc_url: url,
        rpc_timeout_secs: 2,
        confirmation_timeout_secs: 2,
        confirmation_poll_ms: 20,
        ..LedgerConfig::default()
    }
}

fn solana_ledger(config: LedgerConfig) -> Arc<SolanaLedger> {
    let client = RpcClient::new(config).unwrap();
    let wallet = Wallet::from_keypair(Keypair::from_seed(&[9; 32]));
    Arc::new(SolanaLedger::new(client, Arc::new(wallet)))
}

fn gm_request() -> MintRequest {
    MintRequest::new(
        "gm",
        10,
        vec![address(1), address(2), address(3)],
        &address(100),
        &MintingConfig::default(),
    )
    .unwrap()
}

fn count(log: &Mutex<Vec<(String, Value)>>, method: &str) -> usize {
    log.lock().unwrap().iter().filter(|(m, _)| m == method).count()
}

#[tokio::test]
async fn test_mint_through_rpc() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let addr = start_mock_rpc(happy_node(log.clone())).await;
    let ledger = solana_ledger(ledger_config(format!("http://{}", addr)));

    let orchestrator =
        MintOrchestrator::new(ledger, Arc::new(TokenRegistry::new()), MintingConfig::default());
    let receipt = orchestrator.mint_and_distribute(gm_request()).await.unwrap();

    assert_eq!(receipt.distributed_count, 3);
    assert_eq!(receipt.surplus_count, 7);
    assert_eq!(count(&log, "sendTransaction"), 1);

    let calls = log.lock().unwrap();
    let (_, rent_params) = calls
        .iter()
        .find(|(m, _)| m == "getMinimumBalanceForRentExemption")
        .unwrap();
    assert_eq!(rent_params[0], 82);

    let (_, send_params) = calls.iter().find(|(m, _)| m == "sendTransaction").unwrap();
    assert_eq!(send_params[1]["encoding"], "base58");
    assert_eq!(
        receipt.transaction_id.to_string(),
        wire_signature(send_params[0].as_str().unwrap())
    );
}

#[tokio::test]
async fn test_failover_to_second_endpoint() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let addr = start_mock_rpc(happy_node(log.clone())).await;

    let mut config = ledger_config("http://127.0.0.1:1".to_string());
    config.failover_urls = vec![format!("http://{}", addr)];
    let ledger = solana_ledger(config);

    assert!(ledger.is_healthy().await);
    assert_eq!(ledger.balance(&Pubkey([1; 32])).await.unwrap(), 2_000_000_000);
    assert_eq!(count(&log, "getHealth"), 1);
}

#[tokio::test]
async fn test_node_rejection_is_surfaced() {
    let addr = start_mock_rpc(|method, params| match method {
        "sendTransaction" => Err(json!({ "code": -32002, "message": "Blockhash not found" })),
        other => happy_node(Arc::new(Mutex::new(Vec::new())))(other, params),
    })
    .await;
    let ledger = solana_ledger(ledger_config(format!("http://{}", addr)));

    let orchestrator =
        MintOrchestrator::new(ledger, Arc::new(TokenRegistry::new()), MintingConfig::default());
    let err = orchestrator.mint_and_distribute(gm_request()).await.unwrap_err();

    match err {
        MintError::LedgerSubmission {
            token_type_id,
            confirmed_batches,
            source: LedgerError::Node { code, message, .. },
        } => {
            assert!(token_type_id.is_some());
            assert_eq!(confirmed_batches, 0);
            assert_eq!(code, -32002);
            assert_eq!(message, "Blockhash not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_onchain_failure_is_reported() {
    let addr = start_mock_rpc(|method, params| match method {
        "getSignatureStatuses" => Ok(json!({
            "context": { "slot": 50 },
            "value": [{
                "slot": 49,
                "confirmations": 0,
                "err": { "InstructionError": [3, { "Custom": 1 }] },
                "confirmationStatus": "confirmed"
            }]
        })),
        other => happy_node(Arc::new(Mutex::new(Vec::new())))(other, params),
    })
    .await;
    let ledger = solana_ledger(ledger_config(format!("http://{}", addr)));

    let orchestrator =
        MintOrchestrator::new(ledger, Arc::new(TokenRegistry::new()), MintingConfig::default());
    let err = orchestrator.mint_and_distribute(gm_request()).await.unwrap_err();

    assert!(matches!(
        err,
        MintError::LedgerSubmission {
            source: LedgerError::TransactionFailed { .. },
            ..
        }
    ));
    assert!(err.to_string().contains("InstructionError"));
}

#[tokio::test]
async fn test_confirmation_timeout() {
    let addr = start_mock_rpc(|method, params| match method {
        "getSignatureStatuses" => Ok(json!({ "context": { "slot": 50 }, "value": [null] })),
        other => happy_node(Arc::new(Mutex::new(Vec::new())))(other, params),
    })
    .await;
    let mut config = ledger_config(format!("http://{}", addr));
    config.confirmation_timeout_secs = 1;
    let ledger = solana_ledger(config);

    let orchestrator =
        MintOrchestrator::new(ledger, Arc::new(TokenRegistry::new()), MintingConfig::default());
    let err = orchestrator.mint_and_distribute(gm_request()).await.unwrap_err();

    assert!(matches!(
        err,
        MintError::LedgerSubmission {
            source: LedgerError::ConfirmationTimeout { timeout_secs: 1, .. },
            ..
        }
    ));
}

#[tokio::test]
async fn test_processed_status_waits_for_commitment() {
    let polls = Arc::new(Mutex::new(0u32));
    let seen = polls.clone();
    let addr = start_mock_rpc(move |method, params| match method {
        "getSignatureStatuses" => {
            let mut n = seen.lock().unwrap();
            *n += 1;
            Ok(confirmed(if *n < 3 { "processed" } else { "confirmed" }))
        }
        other => happy_node(Arc::new(Mutex::new(Vec::new())))(other, params),
    })
    .await;
    let ledger = solana_ledger(ledger_config(format!("http://{}", addr)));

    let orchestrator =
        MintOrchestrator::new(ledger, Arc::new(TokenRegistry::new()), MintingConfig::default());
    orchestrator.mint_and_distribute(gm_request()).await.unwrap();

    assert_eq!(*polls.lock().unwrap(), 3);
}

#[tokio::test]
async fn test_token_holders_skip_empty_accounts() {
    let mint = Pubkey([5; 32]);
    let addr = start_mock_rpc(move |method, params| {
        assert_eq!(method, "getProgramAccounts");
        assert_eq!(params[1]["filters"][0]["dataSize"], 165);
        assert_eq!(params[1]["filters"][1]["memcmp"]["offset"], 0);
        assert_eq!(params[1]["filters"][1]["memcmp"]["bytes"], mint.to_string());

        let account = |pubkey: String, owner: String, amount: &str| {
            json!({
                "pubkey": pubkey,
                "account": {
                    "data": {
                        "parsed": {
                            "info": {
                                "owner": owner,
                                "tokenAmount": { "amount": amount, "decimals": 0 }
                            },
                            "type": "account"
                        },
                        "program": "spl-token"
                    }
                }
            })
        };
        Ok(json!([
            account(address(11), address(1), "1"),
            account(address(12), address(2), "0"),
            account(address(13), address(100), "7"),
        ]))
    })
    .await;
    let ledger = solana_ledger(ledger_config(format!("http://{}", addr)));

    let holders = ledger.token_holders(&mint).await.unwrap();
    assert_eq!(holders.len(), 2);
    assert_eq!(holders[0].owner, address(1));
    assert_eq!(holders[1].balance, 7);
}

#[tokio::test]
async fn test_token_balance_sums_owner_accounts() {
    let mint = Pubkey([5; 32]);
    let owner = Pubkey([1; 32]);
    let addr = start_mock_rpc(move |method, params| {
        assert_eq!(method, "getTokenAccountsByOwner");
        assert_eq!(params[0], owner.to_string());
        assert_eq!(params[1]["mint"], mint.to_string());
        assert_eq!(params[2]["encoding"], "jsonParsed");

        let account = |pubkey: String, amount: &str| {
            json!({
                "pubkey": pubkey,
                "account": {
                    "data": {
                        "parsed": {
                            "info": {
                                "owner": owner.to_string(),
                                "tokenAmount": { "amount": amount, "decimals": 0 }
                            },
                            "type": "account"
                        },
                        "program": "spl-token"
                    }
                }
            })
        };
        Ok(json!({
            "context": { "slot": 50 },
            "value": [account(address(11), "3"), account(address(12), "4")]
        }))
    })
    .await;
    let ledger = solana_ledger(ledger_config(format!("http://{}", addr)));

    assert_eq!(ledger.token_balance(&owner, &mint).await.unwrap(), 7);
}

#[tokio::test]
async fn test_token_balance_without_accounts_is_zero() {
    let addr = start_mock_rpc(|_, _| Ok(json!({ "context": { "slot": 50 }, "value": [] }))).await;
    let ledger = solana_ledger(ledger_config(format!("http://{}", addr)));

    assert_eq!(
        ledger.token_balance(&Pubkey([1; 32]), &Pubkey([5; 32])).await.unwrap(),
        0
    );
}
