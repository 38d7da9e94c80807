//! Submission and confirmation integration tests.
//!
//! Exercises the two-phase pipeline end to end against a scripted node:
//! - immediate engine verdict classification (only `tem` is final)
//! - transport and protocol failures mapped to uniform failed results
//! - confirmation tracking across ledger closes
//! - the inconclusive outcome when the confirmation window lapses

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use serde_json::json;
use tokio::time::sleep;

use tideway_client::{Client, ConnectionConfig};
use tideway_harness::{RecordingSink, ScriptedNetwork, SinkEvent, test_network};

const NODE: &str = "wss://node.example.net";
const BLOB: &str = "1200002280000000";
const HASH: &str = "C0FFEE00000000000000000000000000000000000000000000000000000000AA";

fn build_client(transport: &ScriptedNetwork) -> (Arc<Client<ScriptedNetwork>>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let client = Arc::new(Client::new(
        transport.clone(),
        test_network("main", 0, &[NODE]),
        ConnectionConfig::default(),
        Arc::clone(&sink) as Arc<dyn tideway_client::EventSink>,
    ));
    (client, sink)
}

#[tokio::test(start_paused = true)]
async fn accepted_submission_is_tentative_success() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);
    node.respond_with(|request| {
        (request["command"] == "submit").then(|| {
            json!({
                "status": "success",
                "result": {
                    "engine_result": "tesSUCCESS",
                    "engine_result_message": "Applied to the open ledger.",
                    "tx_json": { "hash": HASH },
                },
            })
        })
    });

    let (client, sink) = build_client(&transport);
    client.connect().await;

    let result = client.submit(BLOB, None, false).await;

    assert!(result.success);
    assert_eq!(result.engine_result, "tesSUCCESS");
    assert_eq!(result.hash.as_deref(), Some(HASH));
    assert_eq!(result.network.node, NODE);

    // The announcement fires before the wire call, with the bound node.
    assert_eq!(
        sink.count(|event| matches!(
            event,
            SinkEvent::SubmitTransaction { node, .. } if node == NODE
        )),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn retry_and_local_codes_stay_tentative() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);
    node.respond_with(|request| {
        (request["command"] == "submit").then(|| {
            json!({
                "status": "success",
                "result": {
                    "engine_result": "terQUEUED",
                    "engine_result_message": "Held until there is ledger space.",
                },
            })
        })
    });

    let (client, _sink) = build_client(&transport);
    client.connect().await;

    let result = client.submit(BLOB, Some(HASH), false).await;

    // Anything short of a malformed rejection may still apply later.
    assert!(result.success);
    assert_eq!(result.engine_result, "terQUEUED");
    assert_eq!(result.hash.as_deref(), Some(HASH));
}

#[tokio::test(start_paused = true)]
async fn malformed_submission_is_rejected_outright() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);
    node.respond_with(|request| {
        (request["command"] == "submit").then(|| {
            json!({
                "status": "success",
                "result": {
                    "engine_result": "temBAD_FEE",
                    "engine_result_message": "Invalid fee, negative or not XRP.",
                },
            })
        })
    });

    let (client, _sink) = build_client(&transport);
    client.connect().await;

    let result = client.submit(BLOB, Some(HASH), false).await;

    assert!(!result.success);
    assert_eq!(result.engine_result, "temBAD_FEE");
    assert_eq!(result.message, "Invalid fee, negative or not XRP.");
}

#[tokio::test(start_paused = true)]
async fn node_rejection_carries_the_error_code() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);
    node.respond_with(|request| {
        (request["command"] == "submit").then(|| {
            json!({
                "status": "error",
                "error": "invalidTransaction",
                "error_exception": "fails local checks",
            })
        })
    });

    let (client, _sink) = build_client(&transport);
    client.connect().await;

    let result = client.submit(BLOB, Some(HASH), false).await;

    assert!(!result.success);
    assert_eq!(result.engine_result, "invalidTransaction");
    assert_eq!(result.message, "fails local checks");
}

#[tokio::test(start_paused = true)]
async fn submitting_while_disconnected_reports_generic_failure() {
    let transport = ScriptedNetwork::new();
    transport.node(NODE);

    let (client, _sink) = build_client(&transport);

    let result = client.submit(BLOB, Some(HASH), false).await;

    assert!(!result.success);
    assert_eq!(result.engine_result, "telFAILED");
    assert_eq!(result.hash.as_deref(), Some(HASH));
}

#[tokio::test(start_paused = true)]
async fn verify_confirms_once_the_transaction_validates() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);

    let lookups = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&lookups);
    node.respond_with(move |request| {
        (request["command"] == "tx").then(|| {
            // Not validated until the fifth post-close lookup.
            if counter.fetch_add(1, Ordering::Relaxed) < 4 {
                json!({
                    "status": "success",
                    "result": { "validated": false, "hash": HASH },
                })
            } else {
                json!({
                    "status": "success",
                    "result": {
                        "validated": true,
                        "hash": HASH,
                        "meta": { "TransactionResult": "tesSUCCESS" },
                    },
                })
            }
        })
    });

    let (client, _sink) = build_client(&transport);
    client.connect().await;

    let verifier = Arc::clone(&client);
    let pending = tokio::spawn(async move { verifier.verify(HASH).await });

    for index in 1..=5 {
        sleep(Duration::from_secs(1)).await;
        node.push_ledger_close(index);
    }

    let result = pending.await.unwrap();
    assert!(result.success);
    let record = result.transaction.unwrap();
    assert!(record.validated);
    assert_eq!(record.result_code(), Some("tesSUCCESS"));
    assert_eq!(lookups.load(Ordering::Relaxed), 5);
}

#[tokio::test(start_paused = true)]
async fn verify_reports_a_failed_validated_outcome() {
    let transport = ScriptedNetwork::new();
    let node = transport.node(NODE);
    node.respond_with(|request| {
        (request["command"] == "tx").then(|| {
            json!({
                "status": "success",
                "result": {
                    "validated": true,
                    "hash": HASH,
                    "meta": { "TransactionResult": "tecPATH_DRY" },
                },
            })
        })
    });

    let (client, _sink) = build_client(&transport);
    client.connect().await;

    let verifier = Arc::clone(&client);
    let pending = tokio::spawn(async move { verifier.verify(HASH).await });

    sleep(Duration::from_secs(1)).await;
    node.push_ledger_close(1);

    let result = pending.await.unwrap();
    assert!(!result.success);
    assert_eq!(result.transaction.unwrap().result_code(), Some("tecPATH_DRY"));
}

#[tokio::test(start_paused = true)]
async fn verify_is_inconclusive_when_the_window_lapses() {
    let transport = ScriptedNetwork::new();
    transport.node(NODE);

    let (client, _sink) = build_client(&transport);
    client.connect().await;

    // No ledger ever closes; the window lapses with nothing to report.
    let result = client.verify(HASH).await;

    assert!(!result.success);
    assert!(result.transaction.is_none());
}
