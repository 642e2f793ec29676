//! Test helpers: build AppState and router on an in-memory messaging client.
//!
//! Run from workspace root: `cargo test -p wacheck-api`.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use wacheck_api::setup::routes;
use wacheck_api::state::AppState;
use wacheck_core::models::SessionStatus;
use wacheck_core::{Config, NumberValidator, TimingConfig};
use wacheck_services::test_helpers::{
    fast_session_timings, FakeClientFactory, FakeMessagingClient,
};
use wacheck_services::SessionManager;

/// Test application: server plus the fake client behind the session.
pub struct TestApp {
    pub server: TestServer,
    pub client: Arc<FakeMessagingClient>,
    pub state: Arc<AppState>,
}

pub fn create_test_config() -> Config {
    let mut config = Config::from_lookup(|key| match key {
        "BRIDGE_TOKEN" => Some("test-token".to_string()),
        "MAX_BULK_NUMBERS" => Some("5".to_string()),
        "MAX_UPLOAD_SIZE_MB" => Some("1".to_string()),
        "STATIC_DIR" => Some(concat!(env!("CARGO_MANIFEST_DIR"), "/../../static").to_string()),
        _ => None,
    })
    .expect("test config");
    config.timing = TimingConfig::immediate();
    config
}

async fn build_app(client: Arc<FakeMessagingClient>, connect: bool) -> TestApp {
    let config = create_test_config();
    let factory = Arc::new(FakeClientFactory::new(Arc::clone(&client)));
    let session = SessionManager::new(factory, fast_session_timings());

    if connect {
        session.start().await;
        assert!(
            session
                .wait_for_status(SessionStatus::Connected, Duration::from_secs(2))
                .await,
            "fake session did not connect"
        );
    }

    let state = Arc::new(AppState::new(
        config.clone(),
        session,
        NumberValidator::new(),
    ));
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        client,
        state,
    }
}

/// App whose session is connected to a fresh fake client.
pub async fn setup_test_app() -> TestApp {
    build_app(Arc::new(FakeMessagingClient::new()), true).await
}

/// App with a prepared fake client, connected.
pub async fn setup_test_app_with(client: FakeMessagingClient) -> TestApp {
    build_app(Arc::new(client), true).await
}

/// App whose session was never started.
pub async fn setup_disconnected_app() -> TestApp {
    build_app(Arc::new(FakeMessagingClient::new()), false).await
}
