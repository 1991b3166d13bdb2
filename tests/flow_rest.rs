//! Integration tests for the flow REST surface.
//!
//! Each test spins up an Axum server on a random port against the
//! simulated gateway and drives the wizards the way the SPA does.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use credit_flow::flow::routes::{AppState, flow_routes};
use credit_flow::gateway::{ContractGateway, SimulatedGateway};
use credit_flow::session::WalletSession;

/// Maximum time any test request is allowed to take.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const TEST_ACCOUNT: &str = "0x00000000000000000000000000000000000000aa";

/// Start a server on a random port, return its base URL.
async fn start_server() -> String {
    let gateway: Arc<dyn ContractGateway> = Arc::new(SimulatedGateway::new());
    let session = Arc::new(WalletSession::new());
    let app = flow_routes(AppState::new(gateway, session, None));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

async fn post_json(client: &reqwest::Client, url: &str, body: Value) -> (u16, Value) {
    let response = timeout(TEST_TIMEOUT, client.post(url).json(&body).send())
        .await
        .unwrap()
        .unwrap();
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get_json(client: &reqwest::Client, url: &str) -> (u16, Value) {
    let response = timeout(TEST_TIMEOUT, client.get(url).send())
        .await
        .unwrap()
        .unwrap();
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}

async fn connect_wallet(client: &reqwest::Client, base: &str) {
    let (status, body) = post_json(
        client,
        &format!("{base}/api/session/connect"),
        json!({ "account": TEST_ACCOUNT, "chain_id": 31337 }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["connected"], json!(true));
}

#[tokio::test]
async fn loan_flow_end_to_end() {
    let base = start_server().await;
    let client = reqwest::Client::new();
    connect_wallet(&client, &base).await;

    let (status, opened) = post_json(
        &client,
        &format!("{base}/api/flows"),
        json!({ "flow": "loan_application", "product": "premium" }),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(opened["current_step"], json!(1));
    assert_eq!(opened["total_steps"], json!(5));
    let id = opened["id"].as_str().unwrap().to_string();

    // Step 1 → 2, then fill in the loan details.
    let advance_url = format!("{base}/api/flows/{id}/advance");
    let (status, body) = post_json(&client, &advance_url, json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"]["current_step"], json!(2));

    let (_, body) = post_json(
        &client,
        &advance_url,
        json!({ "fields": { "loan_amount": "50000", "loan_purpose": "business" } }),
    )
    .await;
    assert_eq!(body["status"]["current_step"], json!(3));

    let (_, body) = post_json(
        &client,
        &advance_url,
        json!({ "fields": { "loan_term": "36", "collateral": "ethereum" } }),
    )
    .await;
    assert_eq!(body["status"]["current_step"], json!(4));
    assert_eq!(body["status"]["step"]["key"], json!("review"));
    assert_eq!(
        body["status"]["summary"]["estimated_monthly_payment"],
        json!("333")
    );

    // Commit: the call suspends on the write and lands on the terminal step.
    let (status, body) = post_json(&client, &advance_url, json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["progress"]["result"], json!("completed"));
    assert_eq!(body["status"]["current_step"], json!(5));
    let reference = body["status"]["outcome"]["reference"].as_str().unwrap();
    assert!(reference.starts_with("LN-"));

    // Advancing past the terminal step changes nothing.
    let (_, body) = post_json(&client, &advance_url, json!({})).await;
    assert_eq!(body["progress"]["result"], json!("no_op"));
    assert_eq!(body["status"]["current_step"], json!(5));

    // Close destroys the instance.
    let response = client
        .delete(format!("{base}/api/flows/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);
    let (status, _) = get_json(&client, &format!("{base}/api/flows/{id}")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn score_flow_commit_requires_connection() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let (status, opened) = post_json(
        &client,
        &format!("{base}/api/flows"),
        json!({ "flow": "score_generation" }),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(opened["total_steps"], json!(4));
    let id = opened["id"].as_str().unwrap().to_string();
    let advance_url = format!("{base}/api/flows/{id}/advance");

    let (_, body) = post_json(
        &client,
        &advance_url,
        json!({ "fields": { "full_name": "Ada Lovelace", "email": "ada@example.com" } }),
    )
    .await;
    assert_eq!(body["status"]["current_step"], json!(2));
    let (_, body) = post_json(
        &client,
        &advance_url,
        json!({ "fields": { "credit_score": "742", "risk_level": "1", "collateral_ratio": "85" } }),
    )
    .await;
    assert_eq!(body["status"]["current_step"], json!(3));

    // Commit without a wallet: rejected, no state change.
    let (status, body) = post_json(&client, &advance_url, json!({})).await;
    assert_eq!(status, 409);
    assert!(body["error"].as_str().unwrap().contains("connect"));
    let (_, body) = get_json(&client, &format!("{base}/api/flows/{id}")).await;
    assert_eq!(body["current_step"], json!(3));
    assert_eq!(body["processing"], json!(false));

    // Connect and retry.
    connect_wallet(&client, &base).await;
    let (status, body) = post_json(&client, &advance_url, json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"]["current_step"], json!(4));
    assert_eq!(body["status"]["outcome"]["kind"], json!("profile_created"));
    assert_eq!(body["status"]["outcome"]["credit_score"], json!(742));
}

#[tokio::test]
async fn profile_created_by_score_flow_is_readable() {
    let base = start_server().await;
    let client = reqwest::Client::new();
    connect_wallet(&client, &base).await;

    let (_, opened) = post_json(
        &client,
        &format!("{base}/api/flows"),
        json!({ "flow": "score_generation" }),
    )
    .await;
    let id = opened["id"].as_str().unwrap().to_string();
    let advance_url = format!("{base}/api/flows/{id}/advance");

    post_json(&client, &advance_url, json!({})).await;
    post_json(
        &client,
        &advance_url,
        json!({ "fields": { "credit_score": "695", "risk_level": "2", "collateral_ratio": "70" } }),
    )
    .await;
    let (_, body) = post_json(&client, &advance_url, json!({})).await;
    assert_eq!(body["progress"]["result"], json!("completed"));

    // The new profile (id 2; id 1 is seeded) and the seed resolve
    // independently, whichever finishes first.
    let (first, second) = futures_util::future::join(
        get_json(&client, &format!("{base}/api/profiles/1")),
        get_json(&client, &format!("{base}/api/profiles/2")),
    )
    .await;
    assert_eq!(first.0, 200);
    assert_eq!(first.1["credit_score"], json!(742));
    assert_eq!(second.0, 200);
    assert_eq!(second.1["credit_score"], json!(695));
}

#[tokio::test]
async fn reads_surface_failures_as_typed_errors() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, &format!("{base}/api/profiles/99")).await;
    assert_eq!(status, 404);
    assert!(body["error"].as_str().unwrap().contains("99"));

    let (status, _) = get_json(&client, &format!("{base}/api/loans/99")).await;
    assert_eq!(status, 404);

    let (status, body) = get_json(&client, &format!("{base}/api/loans/1")).await;
    assert_eq!(status, 200);
    assert_eq!(body["principal_amount"], json!(25000));
}

#[tokio::test]
async fn retreat_walks_back_and_stops_at_step_one() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let (_, opened) = post_json(
        &client,
        &format!("{base}/api/flows"),
        json!({ "flow": "loan_application", "product": "starter" }),
    )
    .await;
    let id = opened["id"].as_str().unwrap().to_string();

    post_json(
        &client,
        &format!("{base}/api/flows/{id}/advance"),
        json!({ "fields": { "loan_amount": "10000" } }),
    )
    .await;

    let retreat_url = format!("{base}/api/flows/{id}/retreat");
    let (_, body) = post_json(&client, &retreat_url, json!({})).await;
    assert_eq!(body["progress"]["result"], json!("moved"));
    assert_eq!(body["status"]["current_step"], json!(1));
    // Retreating keeps the form.
    assert_eq!(body["status"]["form"]["loan_amount"], json!("10000"));

    let (_, body) = post_json(&client, &retreat_url, json!({})).await;
    assert_eq!(body["progress"]["result"], json!("no_op"));
    assert_eq!(body["status"]["current_step"], json!(1));
}

#[tokio::test]
async fn open_flow_rejects_unknown_inputs() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let (status, _) = post_json(
        &client,
        &format!("{base}/api/flows"),
        json!({ "flow": "mortgage_wizard" }),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = post_json(
        &client,
        &format!("{base}/api/flows"),
        json!({ "flow": "loan_application", "product": "payday" }),
    )
    .await;
    assert_eq!(status, 400);

    let (status, products) = get_json(&client, &format!("{base}/api/products")).await;
    assert_eq!(status, 200);
    assert_eq!(products.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn connect_rejects_malformed_addresses() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    let (status, _) = post_json(
        &client,
        &format!("{base}/api/session/connect"),
        json!({ "account": "not-an-address" }),
    )
    .await;
    assert_eq!(status, 400);

    let (_, body) = get_json(&client, &format!("{base}/api/session")).await;
    assert_eq!(body["connected"], json!(false));
}
