//! Test helpers for service and API tests
//!
//! In-memory messaging client and factory plus shortcuts for a connected
//! session. Enabled for this crate's tests and, for other crates, behind the
//! `test-fixtures` feature.

pub mod fake_client;

pub use fake_client::{FakeClientFactory, FakeMessagingClient, FakeNumber};

use std::sync::Arc;
use std::time::Duration;

use wacheck_core::models::SessionStatus;

use crate::check::CheckTimings;
use crate::session::{SessionManager, SessionTimings};

pub fn fast_session_timings() -> SessionTimings {
    SessionTimings {
        status_poll: Duration::from_millis(10),
        init_retry: Duration::from_millis(20),
        restart_delay: Duration::from_millis(10),
    }
}

pub fn immediate_check_timings() -> CheckTimings {
    CheckTimings {
        check_delay: Duration::ZERO,
        confirmation_delay: Duration::ZERO,
    }
}

/// Start a session manager on the fake client and wait until it is connected
pub async fn connected_session(client: Arc<FakeMessagingClient>) -> Arc<SessionManager> {
    let factory = Arc::new(FakeClientFactory::new(client));
    let manager = SessionManager::new(factory, fast_session_timings());
    manager.start().await;
    assert!(
        manager
            .wait_for_status(SessionStatus::Connected, Duration::from_secs(2))
            .await,
        "fake session did not connect"
    );
    manager
}
