mod helpers;

use helpers::{setup_disconnected_app, setup_test_app, setup_test_app_with};
use serde_json::{json, Value};
use wacheck_core::models::Product;
use wacheck_services::test_helpers::{FakeMessagingClient, FakeNumber};

fn prepared_client() -> FakeMessagingClient {
    let client = FakeMessagingClient::new();
    client.add_number(
        "962791234567",
        FakeNumber::registered("962791234567")
            .with_name("Lina")
            .with_picture("https://pps.example.net/lina.jpg"),
    );
    client.add_number(
        "966501234567",
        FakeNumber::business(
            "966501234567",
            vec![Product {
                name: Some("Espresso".to_string()),
                price: Some("2.50".to_string()),
                ..Default::default()
            }],
        ),
    );
    client.add_number("971501234567", FakeNumber::unregistered());
    client.add_number("971551234567", FakeNumber::failing("Evaluation failed"));
    client
}

#[tokio::test]
async fn test_check_registered_number() {
    let app = setup_test_app_with(prepared_client()).await;

    let response = app
        .server
        .post("/api/check-whatsapp")
        .json(&json!({ "number": "+962 79 123 4567" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["number"], "+962791234567");
    assert_eq!(body["data"]["hasWhatsApp"], true);
    assert_eq!(body["data"]["isBusiness"], false);
    assert_eq!(body["data"]["name"], "Lina");
    assert_eq!(body["data"]["profilePicture"], "https://pps.example.net/lina.jpg");
}

#[tokio::test]
async fn test_check_business_number() {
    let app = setup_test_app_with(prepared_client()).await;

    let response = app
        .server
        .post("/api/check-whatsapp")
        .json(&json!({ "number": "+966501234567" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["data"]["isBusiness"], true);
    assert_eq!(body["data"]["businessInfo"]["category"], "Cafe");
    assert_eq!(body["data"]["businessInfo"]["productCount"], 1);
}

#[tokio::test]
async fn test_check_unregistered_number() {
    let app = setup_test_app_with(prepared_client()).await;

    let response = app
        .server
        .post("/api/check-whatsapp")
        .json(&json!({ "number": "+971501234567" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["data"]["hasWhatsApp"], false);
    assert_eq!(body["data"]["outcome"], "not_found");
}

#[tokio::test]
async fn test_check_requires_number() {
    let app = setup_test_app().await;

    let response = app.server.post("/api/check-whatsapp").json(&json!({})).await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Phone number is required");
}

#[tokio::test]
async fn test_check_rejects_invalid_number() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/api/check-whatsapp")
        .json(&json!({ "number": "0791234567" }))
        .await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert_eq!(body["error"], "Phone number must start with +");
    assert!(app.client.calls().is_empty());
}

#[tokio::test]
async fn test_check_bridge_failure_is_server_error() {
    let app = setup_test_app_with(prepared_client()).await;

    let response = app
        .server
        .post("/api/check-whatsapp")
        .json(&json!({ "number": "+971551234567" }))
        .await;
    assert_eq!(response.status_code(), 500);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_check_when_not_connected() {
    let app = setup_disconnected_app().await;

    let response = app
        .server
        .post("/api/check-whatsapp")
        .json(&json!({ "number": "+962791234567" }))
        .await;
    assert_eq!(response.status_code(), 503);

    let body: Value = response.json();
    assert_eq!(body["code"], "SESSION_NOT_CONNECTED");
    assert_eq!(body["recoverable"], true);
}

#[tokio::test]
async fn test_bulk_check_mixed_outcomes() {
    let app = setup_test_app_with(prepared_client()).await;

    let response = app
        .server
        .post("/api/check-whatsapp-bulk")
        .json(&json!({
            "numbers": ["+962791234567", "12345", "+971501234567", "+971551234567"]
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    let data = body["data"].as_array().expect("data array");
    assert_eq!(data.len(), 4);

    assert_eq!(data[0]["outcome"], "found");
    assert_eq!(data[1]["outcome"], "invalid");
    assert_eq!(data[1]["number"], "12345");
    assert!(data[1]["error"].is_string());
    assert_eq!(data[2]["outcome"], "not_found");
    assert_eq!(data[3]["outcome"], "check_failed");

    // The invalid entry never reaches the session
    let status_calls = app
        .client
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("status:"))
        .count();
    assert_eq!(status_calls, 3);
}

#[tokio::test]
async fn test_bulk_check_requires_list() {
    let app = setup_test_app().await;

    let response = app
        .server
        .post("/api/check-whatsapp-bulk")
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert_eq!(body["error"], "Numbers list is required");
}

#[tokio::test]
async fn test_bulk_check_enforces_limit() {
    let app = setup_test_app().await;
    let numbers: Vec<String> = (0..6).map(|i| format!("+96279123456{}", i)).collect();

    let response = app
        .server
        .post("/api/check-whatsapp-bulk")
        .json(&json!({ "numbers": numbers }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert!(app.client.calls().is_empty());
}

#[tokio::test]
async fn test_image_proxy_echoes_url() {
    let app = setup_test_app().await;

    let response = app
        .server
        .get("/api/image-proxy")
        .add_query_param("url", "https://pps.example.net/lina.jpg")
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["imageUrl"], "https://pps.example.net/lina.jpg");

    let response = app.server.get("/api/image-proxy").await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "Image URL is required");
}
