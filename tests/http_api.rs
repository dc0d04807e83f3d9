//! HTTP API tests through a spawned server and the SDK client.

use std::sync::Arc;
use std::time::Duration;

use flutterbye_minter::ledger::types::TokenHolder;
use flutterbye_sdk::{CreateTokenRequest, MinterClient};
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;
use common::{address, spawn_server, test_config, MockLedger};

fn gm_request() -> CreateTokenRequest {
    CreateTokenRequest {
        message: "gm".to_string(),
        total_supply: 10,
        recipient_addresses: vec![address(1), address(2), address(3)],
        minter_address: address(100),
    }
}

#[tokio::test]
async fn test_mint_then_lookup() {
    let ledger = Arc::new(MockLedger::new());
    let (url, shutdown) = spawn_server(test_config(), ledger.clone()).await;
    let client = MinterClient::new(&url);

    let receipt = client.create_token(&gm_request()).await.unwrap();
    assert_eq!(receipt.distributed_count, 3);
    assert_eq!(receipt.surplus_count, 7);
    assert_eq!(receipt.transaction_ids, vec![receipt.transaction_id.clone()]);

    let record = client.token(&receipt.token_type_id).await.unwrap();
    assert_eq!(record.message, "gm");
    assert_eq!(record.total_supply, 10);

    let metadata = client.token_metadata(&receipt.token_type_id).await.unwrap();
    assert_eq!(metadata["name"], "FLBY-MSG");
    assert_eq!(metadata["description"], "Flutterbye Message Token: \"gm\"");
    assert_eq!(metadata["attributes"][0]["value"], "gm");

    shutdown.trigger();
}

#[tokio::test]
async fn test_create_returns_201_with_request_id() {
    let (url, shutdown) = spawn_server(test_config(), Arc::new(MockLedger::new())).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/tokens", url))
        .header("x-request-id", "req-42")
        .json(&gm_request())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(resp.headers()["x-request-id"], "req-42");

    let body: Value = resp.json().await.unwrap();
    assert!(body["tokenTypeId"].is_string());
    assert!(body["metadataUri"].as_str().unwrap().contains("/tokens/"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_generated_when_absent() {
    let (url, shutdown) = spawn_server(test_config(), Arc::new(MockLedger::new())).await;

    let resp = reqwest::get(format!("{}/wallets/{}/validate", url, address(1)))
        .await
        .unwrap();
    let id = resp.headers()["x-request-id"].to_str().unwrap().to_string();
    assert_eq!(id.len(), 36);

    shutdown.trigger();
}

#[tokio::test]
async fn test_validation_errors_are_400() {
    let ledger = Arc::new(MockLedger::new());
    let (url, shutdown) = spawn_server(test_config(), ledger.clone()).await;
    let client = MinterClient::new(&url);

    let cases = [
        CreateTokenRequest {
            total_supply: 2,
            ..gm_request()
        },
        CreateTokenRequest {
            message: "x".repeat(28),
            ..gm_request()
        },
        CreateTokenRequest {
            total_supply: 0,
            ..gm_request()
        },
        CreateTokenRequest {
            minter_address: "nope".to_string(),
            ..gm_request()
        },
    ];

    for case in cases {
        let err = client.create_token(&case).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST), "{err}");
    }
    assert_eq!(ledger.calls().ledger_invocations(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_body_is_400_json() {
    let (url, shutdown) = spawn_server(test_config(), Arc::new(MockLedger::new())).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/tokens", url))
        .json(&json!({ "message": "gm", "totalSupply": 1, "minterAddress": address(1), "extra": true }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    shutdown.trigger();
}

#[tokio::test]
async fn test_ledger_failure_is_502() {
    let ledger = Arc::new(MockLedger::new().failing_submission(0));
    let (url, shutdown) = spawn_server(test_config(), ledger).await;

    let err = MinterClient::new(&url)
        .create_token(&gm_request())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    assert!(err.to_string().contains("insufficient funds"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_partial_mint_failure_names_token() {
    let ledger = Arc::new(MockLedger::new().failing_submission(1));
    let mut config = test_config();
    config.minting.max_instructions_per_transaction = 4;
    let (url, shutdown) = spawn_server(config, ledger.clone()).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/tokens", url))
        .json(&gm_request())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body: Value = resp.json().await.unwrap();
    let created = ledger.calls().assets_created[0].to_string();
    assert_eq!(body["tokenTypeId"], created.as_str());
    assert_eq!(body["confirmedBatches"], 1);
    assert!(body["error"].as_str().unwrap().contains("insufficient funds"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_sdk_reports_partial_mint() {
    let ledger = Arc::new(MockLedger::new().failing_submission(1));
    let mut config = test_config();
    config.minting.max_instructions_per_transaction = 4;
    let (url, shutdown) = spawn_server(config, ledger.clone()).await;

    let err = MinterClient::new(&url)
        .create_token(&gm_request())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    let created = ledger.calls().assets_created[0].to_string();
    assert_eq!(err.token_type_id(), Some(created.as_str()));

    shutdown.trigger();
}

#[tokio::test]
async fn test_slow_mint_outlives_request_timeout() {
    let ledger = Arc::new(MockLedger::new().with_delay(Duration::from_millis(400)));
    let mut config = test_config();
    config.timeouts.request_secs = 1;
    config.minting.max_instructions_per_transaction = 4;
    let (url, shutdown) = spawn_server(config, ledger.clone()).await;
    let client = MinterClient::new(&url);

    // 2 creation + 6 pairs at 4 per transaction: 4 batches, about 1.6s.
    let request = CreateTokenRequest {
        recipient_addresses: (1..=5).map(address).collect(),
        ..gm_request()
    };
    let receipt = client.create_token(&request).await.unwrap();

    assert_eq!(receipt.transaction_ids.len(), 4);
    assert_eq!(ledger.calls().confirmations, 4);
    assert_eq!(client.token(&receipt.token_type_id).await.unwrap().total_supply, 10);

    shutdown.trigger();
}

#[tokio::test]
async fn test_disconnected_client_does_not_abort_mint() {
    let ledger = Arc::new(MockLedger::new().with_delay(Duration::from_millis(200)));
    let mut config = test_config();
    config.minting.max_instructions_per_transaction = 4;
    let (url, shutdown) = spawn_server(config, ledger.clone()).await;

    let request = CreateTokenRequest {
        recipient_addresses: (1..=5).map(address).collect(),
        ..gm_request()
    };
    let result = reqwest::Client::builder()
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap()
        .post(format!("{}/tokens", url))
        .json(&request)
        .send()
        .await;
    assert!(result.is_err());

    // Distribution carries on after the caller has gone.
    let token = ledger.calls().assets_created[0].to_string();
    let client = MinterClient::new(&url);
    let mut record = None;
    for _ in 0..50 {
        if let Ok(found) = client.token(&token).await {
            record = Some(found);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let record = record.expect("mint should complete after disconnect");
    assert_eq!(record.transaction_ids.len(), 4);
    assert_eq!(ledger.calls().confirmations, 4);

    shutdown.trigger();
}

#[tokio::test]
async fn test_read_timeout_is_408_json() {
    let ledger = Arc::new(MockLedger::new().with_delay(Duration::from_millis(1500)));
    let mut config = test_config();
    config.timeouts.request_secs = 1;
    let (url, shutdown) = spawn_server(config, ledger).await;

    let resp = reqwest::get(format!("{}/wallets/{}/balance", url, address(1)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(resp.headers().contains_key("x-request-id"));
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Request timed out");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_token_is_404() {
    let (url, shutdown) = spawn_server(test_config(), Arc::new(MockLedger::new())).await;
    let client = MinterClient::new(&url);

    let err = client.token(&address(7)).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    let err = client.token_metadata("garbage").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    shutdown.trigger();
}

#[tokio::test]
async fn test_rate_limit_is_429() {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.burst_size = 2;
    let (url, shutdown) = spawn_server(config, Arc::new(MockLedger::new())).await;
    let client = MinterClient::new(&url);

    client.create_token(&gm_request()).await.unwrap();
    client.create_token(&gm_request()).await.unwrap();
    let err = client.create_token(&gm_request()).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));

    // Read endpoints are not limited.
    assert!(client.validate_wallet(&address(1)).await.unwrap().valid);

    shutdown.trigger();
}

#[tokio::test]
async fn test_wallet_endpoints() {
    let (url, shutdown) = spawn_server(test_config(), Arc::new(MockLedger::new())).await;
    let client = MinterClient::new(&url);

    assert!(client.validate_wallet(&address(1)).await.unwrap().valid);
    assert!(!client.validate_wallet("0OIl").await.unwrap().valid);

    let balance = client.wallet_balance(&address(1)).await.unwrap();
    assert_eq!(balance.lamports, 1_500_000_000);
    assert!((balance.sol - 1.5).abs() < f64::EPSILON);

    let err = client.wallet_balance("0OIl").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

    shutdown.trigger();
}

#[tokio::test]
async fn test_token_balance_endpoint() {
    let ledger = Arc::new(MockLedger::new());
    let (url, shutdown) = spawn_server(test_config(), ledger.clone()).await;
    let client = MinterClient::new(&url);

    let receipt = client.create_token(&gm_request()).await.unwrap();

    let held = client
        .token_balance(&address(100), &receipt.token_type_id)
        .await
        .unwrap();
    assert_eq!(held.balance, 7);
    assert_eq!(held.mint, receipt.token_type_id);

    let none = client
        .token_balance(&address(9), &receipt.token_type_id)
        .await
        .unwrap();
    assert_eq!(none.balance, 0);

    let err = client.token_balance("0OIl", &receipt.token_type_id).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

    shutdown.trigger();
}

#[tokio::test]
async fn test_holders_endpoint() {
    let holders = vec![TokenHolder {
        address: address(11),
        owner: address(1),
        balance: 1,
    }];
    let ledger = Arc::new(MockLedger::new().with_holders(holders));
    let (url, shutdown) = spawn_server(test_config(), ledger).await;

    let listed = MinterClient::new(&url).token_holders(&address(5)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].owner, address(1));
    assert_eq!(listed[0].balance, 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_health_reflects_ledger() {
    let (url, shutdown) = spawn_server(test_config(), Arc::new(MockLedger::new())).await;
    let health = MinterClient::new(&url).health().await.unwrap();
    assert_eq!(health.status, "ok");
    shutdown.trigger();

    let (url, shutdown) =
        spawn_server(test_config(), Arc::new(MockLedger::new().unhealthy())).await;
    let resp = reqwest::get(format!("{}/health", url)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ledger"], "unreachable");
    shutdown.trigger();
}
