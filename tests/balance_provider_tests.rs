//! Balance providers against a local HTTP stub

#![cfg(feature = "http")]

use std::time::Duration;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use wallet_recovery_libs::{
    balance::{
        mocks::MockBalanceProvider, BalanceConfig, BalanceProvider, BalanceVerifier,
        HttpBalanceProvider, ProviderKind,
    },
    container::ContainerBuilder,
    errors::NetworkError,
    wallet::{BitcoinCoreWallet, RecoveryOptions},
    BalanceCheckStatus, RecoveredKey,
};

const ADDRESS: &str = "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH";

/// Serve `status` + `body` to every connection; returns the base URL
async fn spawn_stub(status: u16, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let body = body.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// Accept connections and never answer
async fn spawn_silent_stub() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

/// A port with nothing listening on it
async fn unused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn http(kind: ProviderKind, base_url: &str) -> HttpBalanceProvider {
    HttpBalanceProvider::new(kind, base_url, Duration::from_secs(5), "test-agent").unwrap()
}

fn key(address: &str) -> RecoveredKey {
    RecoveredKey::new(
        address.to_string(),
        String::new(),
        String::new(),
        String::new(),
        true,
        String::new(),
    )
}

#[tokio::test]
async fn test_blockstream_over_http() {
    let body = r#"{"chain_stats": {"funded_txo_sum": 5000, "spent_txo_sum": 1000, "tx_count": 3}}"#;
    let url = spawn_stub(200, body.to_string()).await;

    let balance = http(ProviderKind::Blockstream, &url).query(ADDRESS).await.unwrap();
    assert_eq!(balance.balance_satoshis, 4000);
    assert_eq!(balance.tx_count, 3);
}

#[tokio::test]
async fn test_blockchair_over_http() {
    let body = format!(
        r#"{{"data": {{"{ADDRESS}": {{"address": {{"balance": 77, "transaction_count": 1}}}}}}}}"#
    );
    let url = spawn_stub(200, body).await;

    let balance = http(ProviderKind::Blockchair, &url).query(ADDRESS).await.unwrap();
    assert_eq!(balance.balance_satoshis, 77);
}

#[tokio::test]
async fn test_error_status() {
    let url = spawn_stub(503, "{}".to_string()).await;
    let err = http(ProviderKind::Blockcypher, &url).query(ADDRESS).await.unwrap_err();
    assert_eq!(err, NetworkError::status("blockcypher", 503));
}

#[tokio::test]
async fn test_malformed_body() {
    let url = spawn_stub(200, "<html>rate limited</html>".to_string()).await;
    let err = http(ProviderKind::Blockstream, &url).query(ADDRESS).await.unwrap_err();
    assert!(matches!(err, NetworkError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_unreachable_endpoint() {
    let url = unused_endpoint().await;
    let err = http(ProviderKind::Blockstream, &url).query(ADDRESS).await.unwrap_err();
    assert!(matches!(err, NetworkError::Request { .. } | NetworkError::Timeout { .. }));
}

#[tokio::test]
async fn test_request_timeout() {
    let url = spawn_silent_stub().await;
    let provider = HttpBalanceProvider::new(
        ProviderKind::Blockstream,
        &url,
        Duration::from_millis(200),
        "test-agent",
    )
    .unwrap();
    let err = provider.query(ADDRESS).await.unwrap_err();
    assert_eq!(err, NetworkError::timeout("blockstream"));
}

#[tokio::test]
async fn test_fallback_order_from_config() {
    let broken = spawn_stub(500, String::new()).await;
    let junk = spawn_stub(200, "not json".to_string()).await;
    let good = spawn_stub(200, r#"{"balance": 123, "n_tx": 2}"#.to_string()).await;

    let config = BalanceConfig::default()
        .with_api_endpoint("blockstream", broken)
        .with_api_endpoint("blockchair", junk)
        .with_api_endpoint("blockcypher", good)
        .with_request_delay(Duration::ZERO);
    let verifier = BalanceVerifier::from_config(&config).unwrap();
    assert_eq!(
        verifier.provider_names(),
        vec!["blockstream", "blockchair", "blockcypher"]
    );

    let mut keys = vec![key(ADDRESS)];
    assert!(verifier.check_balances(&mut keys).await);
    assert_eq!(keys[0].balance_satoshis, 123);
    assert_eq!(keys[0].tx_count, 2);
    assert!(keys[0].has_balance);
}

#[tokio::test]
async fn test_all_providers_unreachable() {
    let mut config = BalanceConfig::default().with_request_delay(Duration::ZERO);
    for kind in ProviderKind::ALL {
        config.set_api_endpoint(kind.name(), unused_endpoint().await);
    }
    let verifier = BalanceVerifier::from_config(&config).unwrap();

    let mut keys = vec![key(ADDRESS), key("1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm")];
    assert!(!verifier.check_balances(&mut keys).await);
    assert!(keys.iter().all(|k| k.balance_satoshis == 0 && !k.has_balance));
}

#[tokio::test]
async fn test_recovery_survives_unreachable_providers() {
    let master_key = [0x44u8; 32];
    let mut secret = [0u8; 32];
    secret[31] = 1;
    let bytes = ContainerBuilder::new()
        .with_master_key("correct", [8; 8], 2, &master_key)
        .unwrap()
        .with_encrypted_key(&master_key, &secret)
        .unwrap()
        .build();

    let mut balance = BalanceConfig::default().with_request_delay(Duration::ZERO);
    for kind in ProviderKind::ALL {
        balance.set_api_endpoint(kind.name(), unused_endpoint().await);
    }
    let wallet = BitcoinCoreWallet::from_bytes(bytes)
        .with_options(RecoveryOptions::default().with_balance_config(balance));

    let result = wallet.recover_wallet("correct").await;
    assert!(result.success);
    assert_eq!(result.total_addresses, 2);
    assert_eq!(result.balance_check, BalanceCheckStatus::Unavailable);
}

#[tokio::test]
async fn test_mock_and_http_mixed() {
    let good = spawn_stub(
        200,
        r#"{"chain_stats": {"funded_txo_sum": 10, "spent_txo_sum": 0, "tx_count": 1}}"#.to_string(),
    )
    .await;
    let down = MockBalanceProvider::failing("down", NetworkError::timeout("down"));

    let verifier = BalanceVerifier::new(
        vec![
            Box::new(down.clone()) as Box<dyn BalanceProvider>,
            Box::new(http(ProviderKind::Blockstream, &good)),
        ],
        Duration::ZERO,
    );

    let mut keys = vec![key(ADDRESS)];
    assert!(verifier.check_balances(&mut keys).await);
    assert_eq!(keys[0].balance_satoshis, 10);
    assert_eq!(down.call_count(), 1);
}
