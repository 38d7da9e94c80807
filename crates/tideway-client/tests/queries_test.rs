//! Typed query integration tests.
//!
//! One scripted round trip per non-paginated query method, checking the
//! request shape on the wire and the typed result coming back.

use std::sync::Arc;

use serde_json::json;

use tideway_client::{CallError, Client, ConnectionConfig};
use tideway_harness::{RecordingSink, ScriptedNetwork, test_network};
use tideway_proto::AssetSpec;

const NODE: &str = "wss://node.example.net";

async fn connected_client(transport: &ScriptedNetwork) -> Client<ScriptedNetwork> {
    let client = Client::new(
        transport.clone(),
        test_network("main", 0, &[NODE]),
        ConnectionConfig::default(),
        Arc::new(RecordingSink::new()) as Arc<dyn tideway_client::EventSink>,
    );
    client.connect().await;
    client
}

#[tokio::test(start_paused = true)]
async fn account_info_reads_the_validated_ledger() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);
    node.respond_with(|request| {
        (request["command"] == "account_info").then(|| {
            json!({
                "status": "success",
                "result": {
                    "validated": true,
                    "account_data": {
                        "Account": "rAlice",
                        "Balance": "25000000",
                        "Sequence": 7,
                        "OwnerCount": 2,
                        "Flags": 0,
                        "Domain": "6578616D706C65",
                    },
                },
            })
        })
    });

    let client = connected_client(&transport).await;
    let info = client.account_info("rAlice").await.unwrap();

    assert!(info.validated);
    assert_eq!(info.account_data.account, "rAlice");
    assert_eq!(info.account_data.balance, "25000000");
    assert_eq!(info.account_data.sequence, 7);
    assert_eq!(info.account_data.owner_count, 2);
    assert_eq!(info.account_data.rest["Domain"], "6578616D706C65");

    let request = &node.requests_for("account_info")[0];
    assert_eq!(request["ledger_index"], "validated");
    assert_eq!(request["signer_lists"], true);
}

#[tokio::test(start_paused = true)]
async fn missing_account_surfaces_the_error_code() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);
    node.respond_with(|request| {
        (request["command"] == "account_info").then(|| {
            json!({
                "status": "error",
                "error": "actNotFound",
                "error_message": "Account not found.",
            })
        })
    });

    let client = connected_client(&transport).await;
    let result = client.account_info("rNobody").await;

    match result {
        Err(CallError::Api(error)) => {
            assert_eq!(error.code, "actNotFound");
            assert_eq!(error.message, "Account not found.");
        }
        other => panic!("expected an api error, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn gateway_balances_passes_hot_wallets() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);
    node.respond_with(|request| {
        (request["command"] == "gateway_balances").then(|| {
            json!({
                "status": "success",
                "result": {
                    "account": "rIssuer",
                    "obligations": { "USD": "1500.2" },
                },
            })
        })
    });

    let client = connected_client(&transport).await;
    let balances =
        client.gateway_balances("rIssuer", Some(vec!["rHot".to_owned()])).await.unwrap();

    assert_eq!(balances.account, "rIssuer");
    assert_eq!(balances.obligations.unwrap()["USD"], "1500.2");
    assert_eq!(node.requests_for("gateway_balances")[0]["hotwallet"], json!(["rHot"]));
}

#[tokio::test(start_paused = true)]
async fn fee_returns_drop_levels() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);
    node.respond_with(|request| {
        (request["command"] == "fee").then(|| {
            json!({
                "status": "success",
                "result": {
                    "drops": {
                        "base_fee": "10",
                        "median_fee": "5000",
                        "minimum_fee": "10",
                        "open_ledger_fee": "12",
                    },
                },
            })
        })
    });

    let client = connected_client(&transport).await;
    let fee = client.fee().await.unwrap();

    assert_eq!(fee.drops.base_fee, "10");
    assert_eq!(fee.drops.open_ledger_fee.as_deref(), Some("12"));
}

#[tokio::test(start_paused = true)]
async fn amm_info_sends_both_assets() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);
    node.respond_with(|request| {
        (request["command"] == "amm_info").then(|| {
            json!({
                "status": "success",
                "result": { "amm": { "trading_fee": 600 } },
            })
        })
    });

    let client = connected_client(&transport).await;
    let info = client
        .amm_info(
            AssetSpec { currency: "XRP".to_owned(), issuer: None },
            AssetSpec { currency: "USD".to_owned(), issuer: Some("rIssuer".to_owned()) },
        )
        .await
        .unwrap();

    assert_eq!(info.amm["trading_fee"], 600);

    let request = &node.requests_for("amm_info")[0];
    assert_eq!(request["asset"], json!({ "currency": "XRP" }));
    assert_eq!(request["asset2"], json!({ "currency": "USD", "issuer": "rIssuer" }));
}

#[tokio::test(start_paused = true)]
async fn account_streams_can_be_toggled() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);

    let client = connected_client(&transport).await;

    client.subscribe_accounts(vec!["rAlice".to_owned()]).await.unwrap();
    client.unsubscribe_accounts(vec!["rAlice".to_owned()]).await.unwrap();

    // The connect-time ledger subscription comes first.
    let subscribes = node.requests_for("subscribe");
    assert_eq!(subscribes.len(), 2);
    assert_eq!(subscribes[1]["accounts"], json!(["rAlice"]));
    assert_eq!(node.requests_for("unsubscribe")[0]["accounts"], json!(["rAlice"]));
}

#[tokio::test(start_paused = true)]
async fn tx_looks_up_decoded_records() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);
    node.respond_with(|request| {
        (request["command"] == "tx").then(|| {
            json!({
                "status": "success",
                "result": {
                    "validated": true,
                    "hash": "AB",
                    "meta": { "TransactionResult": "tesSUCCESS" },
                    "TransactionType": "Payment",
                },
            })
        })
    });

    let client = connected_client(&transport).await;
    let record = client.tx("AB").await.unwrap();

    assert!(record.validated);
    assert_eq!(record.rest["TransactionType"], "Payment");
    assert_eq!(node.requests_for("tx")[0]["binary"], false);
}
